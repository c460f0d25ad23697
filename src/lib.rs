//! Techno-economic appraisal of offshore wind farms.
//!
//! A discrete-event scheduler replays the project's cost events into a CAPEX
//! ledger with stochastic commodity prices; the ledger is discounted to
//! project start, support-scheme cashflows are derived from market prices,
//! and the project is valued by NPV and IRR.

#[cfg(feature = "api")]
pub mod api;
pub mod capex;
pub mod config;
pub mod error;
pub mod finex;
/// CSV import and export.
pub mod io;
pub mod market;
pub mod report;
pub mod runner;
/// Discrete-event scheduler, clock and event processes.
pub mod sim;
pub mod valuation;

pub use error::AppraisalError;
pub use runner::{Project, RunReport, run_monte_carlo};
