//! Energy market revenue under support schemes.

pub mod engine;
pub mod forecast;
pub mod scheme;
pub mod series;

use chrono::NaiveDateTime;
use thiserror::Error;

pub use engine::MarketCashflowEngine;
pub use scheme::{SchemeConfig, SupportScheme};
pub use series::{Frequency, TimeSeries};

/// Errors raised while building or reducing market series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    #[error("market price series is empty")]
    EmptySeries,
    #[error("timestamp {timestamp} at row {index} is not after its predecessor")]
    UnorderedTimestamps {
        index: usize,
        timestamp: NaiveDateTime,
    },
    #[error("no market prices in reference quarter Q{quarter} {year}")]
    NoReferenceData { year: i32, quarter: u32 },
    #[error("forecast window {start}..={end} is empty")]
    InvalidForecastWindow { start: i32, end: i32 },
}
