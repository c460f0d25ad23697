//! API response and query types.
//!
//! Ledger records reuse the CSV export column names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::finex::DiscountedCostRecord;
use crate::market::series::Point;
use crate::report::MonteCarloSummary;
use crate::runner::RunReport;
use crate::valuation::ValuationResult;

/// Headline figures of the reference run.
#[derive(Debug, Serialize)]
pub struct ValuationResponse {
    pub run_index: u64,
    pub seed: u64,
    pub events_fired: usize,
    pub total_cost: f64,
    pub discounted_cost: f64,
    pub cost_by_category: BTreeMap<String, f64>,
    pub cost_by_event: BTreeMap<String, f64>,
    /// Number of non-fatal cost diagnostics raised during the run.
    pub diagnostics: usize,
    /// `null` when no market prices were supplied.
    pub valuation: Option<ValuationResult>,
    pub monte_carlo: Option<MonteCarloSummary>,
}

impl ValuationResponse {
    pub fn new(report: &RunReport, summary: Option<&MonteCarloSummary>) -> Self {
        Self {
            run_index: report.run_index,
            seed: report.seed,
            events_fired: report.events_fired,
            total_cost: report.total_cost,
            discounted_cost: report.discounted_cost,
            cost_by_category: report.cost_by_category.clone(),
            cost_by_event: report.cost_by_event.clone(),
            diagnostics: report.diagnostics.len(),
            valuation: report.valuation.clone(),
            monte_carlo: summary.cloned(),
        }
    }
}

/// One cashflow payment.
#[derive(Debug, Serialize)]
pub struct CashflowRecord {
    /// Start of the payment period, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Cashflow per MW of capacity.
    pub cashflow: f64,
}

impl From<&Point> for CashflowRecord {
    fn from(p: &Point) -> Self {
        Self {
            timestamp: p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            cashflow: p.value,
        }
    }
}

/// Optional range query parameters for the ledger endpoint, in hours from
/// project start.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Earliest timing (inclusive).
    pub from: Option<f64>,
    /// Latest timing (inclusive).
    pub to: Option<f64>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Ledger rows are serialized flat, as in the CSV export.
pub type LedgerRecord = DiscountedCostRecord;
