//! Financing: discounting of the cost ledger to present value.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capex::ledger::CostRecord;
use crate::sim::types::HOURS_PER_YEAR;

/// Unit in which a record's `timing` is expressed when used as the
/// discount exponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingBasis {
    /// Timing is in hours and converted to years (8760 h per year).
    #[default]
    Hours,
    /// Timing is already in years.
    Years,
}

/// One financing instrument, e.g. `{ name = "Debt", interest_rate = 6.5 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinancingInstrument {
    pub name: String,
    /// Annual rate in percent.
    #[serde(default)]
    pub interest_rate: f64,
}

/// `[financing]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancingConfig {
    /// Annual discount rate in percent. Takes precedence over the instruments.
    pub interest_rate_percent: Option<f64>,
    /// Unit of ledger timings.
    pub timing_basis: TimingBasis,
    pub instruments: Vec<FinancingInstrument>,
}

impl FinancingConfig {
    /// Discount rate as a decimal.
    ///
    /// Uses `interest_rate_percent` if set, otherwise the instrument named
    /// `Debt`. Falls back to 0 with a warning.
    pub fn discount_rate(&self) -> f64 {
        if let Some(percent) = self.interest_rate_percent {
            return percent / 100.0;
        }
        match self.instruments.iter().find(|i| i.name == "Debt") {
            Some(debt) => debt.interest_rate / 100.0,
            None => {
                warn!("no Debt interest rate in financing config, discounting at 0%");
                0.0
            }
        }
    }
}

/// A cost record with its present value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountedCostRecord {
    #[serde(flatten)]
    pub record: CostRecord,
    pub discounted_cost: f64,
}

/// Discounts costs at a constant annual rate.
///
/// # Examples
///
/// ```
/// use owf_appraisal::finex::{DiscountEngine, TimingBasis};
///
/// let engine = DiscountEngine::new(0.07, TimingBasis::Years);
/// assert!((engine.discount(1000.0, 1.0) - 934.579).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountEngine {
    rate: f64,
    basis: TimingBasis,
}

impl DiscountEngine {
    /// # Arguments
    ///
    /// * `rate` - Annual discount rate as a decimal (0.07 for 7%)
    /// * `basis` - Unit of the timings passed to [`DiscountEngine::discount`]
    pub fn new(rate: f64, basis: TimingBasis) -> Self {
        Self { rate, basis }
    }

    pub fn from_config(config: &FinancingConfig) -> Self {
        Self::new(config.discount_rate(), config.timing_basis)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn basis(&self) -> TimingBasis {
        self.basis
    }

    /// `cost / (1 + rate)^t` with `t` in years. A non-finite timing leaves
    /// the cost undiscounted.
    pub fn discount(&self, cost: f64, timing: f64) -> f64 {
        if !timing.is_finite() {
            return cost;
        }
        let years = match self.basis {
            TimingBasis::Hours => timing / HOURS_PER_YEAR,
            TimingBasis::Years => timing,
        };
        cost / (1.0 + self.rate).powf(years)
    }

    /// Discounted copy of every record; the input is left untouched.
    pub fn discount_records(&self, records: &[CostRecord]) -> Vec<DiscountedCostRecord> {
        records
            .iter()
            .map(|r| DiscountedCostRecord {
                discounted_cost: self.discount(r.cost, r.timing),
                record: r.clone(),
            })
            .collect()
    }

    /// Present value of all records.
    pub fn present_value(&self, records: &[CostRecord]) -> f64 {
        records.iter().map(|r| self.discount(r.cost, r.timing)).sum()
    }
}
