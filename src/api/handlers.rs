//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{CashflowRecord, ErrorResponse, LedgerQuery, LedgerRecord, ValuationResponse};

/// Returns the headline figures of the reference run.
///
/// `GET /valuation` → 200 + `ValuationResponse` JSON
pub async fn get_valuation(State(state): State<Arc<AppState>>) -> Json<ValuationResponse> {
    Json(ValuationResponse::new(&state.report, state.summary.as_ref()))
}

/// Returns discounted ledger records, optionally filtered by timing.
///
/// `GET /ledger` → 200 + `Vec<LedgerRecord>` JSON
/// `GET /ledger?from=0&to=8760` → records timed in that range (inclusive)
/// `GET /ledger?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_ledger(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LedgerQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(f64::NEG_INFINITY);
    let to = query.to.unwrap_or(f64::INFINITY);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<LedgerRecord> = state.report.ledger_between(from, to);
    Ok(Json(records))
}

/// Returns the support-scheme cashflow per payment period.
///
/// `GET /cashflows` → 200 + `Vec<CashflowRecord>` JSON
/// `GET /cashflows` without market data → 404 + `ErrorResponse`
pub async fn get_cashflows(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.report.cashflows {
        Some(series) => Ok(Json(
            series
                .points()
                .iter()
                .map(CashflowRecord::from)
                .collect::<Vec<_>>(),
        )),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no market prices were supplied for this run".into(),
            }),
        )),
    }
}
