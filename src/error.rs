//! Crate-level error type.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::market::MarketError;
use crate::valuation::ValuationError;

/// Fatal errors of an appraisal run.
///
/// Non-fatal cost problems are not errors; they are collected as
/// [`crate::capex::CostDiagnostic`] values on the ledger.
#[derive(Debug, Error)]
pub enum AppraisalError {
    #[error("invalid configuration:{}", list(.0))]
    Config(Vec<ConfigError>),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("price data row {row}: {message}")]
    PriceData { row: usize, message: String },
    #[error(transparent)]
    Market(#[from] MarketError),
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

impl From<ConfigError> for AppraisalError {
    fn from(e: ConfigError) -> Self {
        Self::Config(vec![e])
    }
}

fn list(errors: &[ConfigError]) -> String {
    errors.iter().map(|e| format!("\n  {e}")).collect()
}
