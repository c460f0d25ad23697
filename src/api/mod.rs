//! REST API over the results of an appraisal.
//!
//! Provides three GET endpoints:
//! - `/valuation`: headline figures of the run and the Monte Carlo summary
//! - `/ledger`: discounted cost ledger with optional hour range filtering
//! - `/cashflows`: support-scheme cashflows per payment period

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::report::MonteCarloSummary;
use crate::runner::RunReport;

pub use types::{CashflowRecord, ErrorResponse, LedgerQuery, ValuationResponse};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the runs complete and wrapped in `Arc`; all data
/// is read-only.
pub struct AppState {
    /// Report of the reference run (run index 0).
    pub report: RunReport,
    /// Present when more than one run was made.
    pub summary: Option<MonteCarloSummary>,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/valuation", get(handlers::get_valuation))
        .route("/ledger", get(handlers::get_ledger))
        .route("/cashflows", get(handlers::get_cashflows))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr` or the
/// server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
