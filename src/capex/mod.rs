//! Capital expenditure: cost schedule, commodity prices and the cost ledger.

pub mod commodity;
pub mod ledger;
pub mod price;
pub mod schedule;

use serde::Serialize;
use thiserror::Error;

/// Non-fatal problem found while building or firing cost events.
///
/// The affected entry is skipped (or costed at zero) and the run goes on.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostDiagnostic {
    #[error("cost file \"{file}\" has no cost_categories")]
    MissingCostCategories { file: String },
    #[error("subcategory {key} has invalid trigger time {hours} h")]
    InvalidTrigger { key: String, hours: f64 },
    #[error("subcategory {key} declared more than once")]
    DuplicateEvent { key: String },
    #[error("event {key} fired but is not in the cost schedule")]
    UnknownEvent { key: String },
    #[error("commodity \"{commodity}\" not found for {item} in {event}, costed at 0")]
    UnknownCommodity {
        event: String,
        item: String,
        commodity: String,
    },
}
