//! Project valuation: NPV and IRR from annual market cashflows.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const IRR_MAX_ITER: usize = 100;
const IRR_TOLERANCE: f64 = 1e-9;
/// Bracket searched when Newton's method does not converge.
const IRR_BRACKET: (f64, f64) = (-0.99, 10.0);

/// `[valuation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValuationInputs {
    /// Installed capacity (MW).
    pub capacity_mw: f64,
    /// Operating years discounted into the NPV.
    pub lifetime_years: usize,
    /// Annual discount rate as a decimal.
    pub discount_rate: f64,
    /// Up-front investment. When unset, the run's discounted CAPEX is used.
    pub capex_total: Option<f64>,
    /// Operating cost per year.
    pub opex_annual: f64,
    /// Share of annual cashflow actually earned (0.0–1.0).
    pub capacity_factor: f64,
}

impl Default for ValuationInputs {
    fn default() -> Self {
        Self {
            capacity_mw: 500.0,
            lifetime_years: 25,
            discount_rate: 0.07,
            capex_total: None,
            opex_annual: 0.0,
            capacity_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    #[error("valuation needs {required} years of revenue, only {available} available")]
    InsufficientRevenueYears { required: usize, available: usize },
}

/// Decision metrics computed from one frozen set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub npv: f64,
    /// `None` when no rate zeroes the NPV or the solver did not converge.
    pub irr: Option<f64>,
    pub capex_total: f64,
    pub opex_annual: f64,
    pub lifetime_years: usize,
    pub discount_rate: f64,
    /// Revenue of operating years `1..=lifetime_years`.
    pub revenues: Vec<f64>,
}

impl ValuationResult {
    /// Net cashflows `[-CAPEX, revenue_1 - OPEX, ...]`.
    pub fn cash_flows(&self) -> Vec<f64> {
        net_cash_flows(self.capex_total, self.opex_annual, &self.revenues)
    }
}

/// Values a project from its per-MW annual cashflows.
///
/// # Arguments
///
/// * `inputs` - Valuation parameters
/// * `annual_cashflows` - Cashflow per MW for consecutive operating years;
///   entries past the lifetime are ignored
/// * `capex_fallback` - Investment used when `inputs.capex_total` is unset
///
/// # Errors
///
/// Returns [`ValuationError::InsufficientRevenueYears`] when fewer than
/// `lifetime_years` cashflows are supplied. An IRR that cannot be found is
/// not an error; it is reported as `irr = None`.
pub fn evaluate(
    inputs: &ValuationInputs,
    annual_cashflows: &[f64],
    capex_fallback: f64,
) -> Result<ValuationResult, ValuationError> {
    let years = inputs.lifetime_years;
    if annual_cashflows.len() < years {
        return Err(ValuationError::InsufficientRevenueYears {
            required: years,
            available: annual_cashflows.len(),
        });
    }

    let revenues: Vec<f64> = annual_cashflows[..years]
        .iter()
        .map(|cf| cf * inputs.capacity_mw * inputs.capacity_factor)
        .collect();
    let capex_total = inputs.capex_total.unwrap_or(capex_fallback);
    let flows = net_cash_flows(capex_total, inputs.opex_annual, &revenues);
    let npv = npv_at(inputs.discount_rate, &flows);
    let irr = irr(&flows);
    if irr.is_none() {
        warn!("IRR did not converge, reported as none");
    }
    debug!(npv, ?irr, capex_total, years, "valuation computed");

    Ok(ValuationResult {
        npv,
        irr,
        capex_total,
        opex_annual: inputs.opex_annual,
        lifetime_years: years,
        discount_rate: inputs.discount_rate,
        revenues,
    })
}

fn net_cash_flows(capex: f64, opex: f64, revenues: &[f64]) -> Vec<f64> {
    std::iter::once(-capex)
        .chain(revenues.iter().map(|r| r - opex))
        .collect()
}

/// `Σ flows[t] / (1 + rate)^t`, with `flows[0]` undiscounted.
pub fn npv_at(rate: f64, flows: &[f64]) -> f64 {
    let mut discount = 1.0;
    let mut npv = 0.0;
    for (t, cf) in flows.iter().enumerate() {
        if t > 0 {
            discount *= 1.0 + rate;
        }
        npv += cf / discount;
    }
    npv
}

fn npv_derivative(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}

/// Internal rate of return of `flows`.
///
/// Newton's method from 10%, falling back to bisection over
/// `[-99%, 1000%]`. Returns `None` for non-finite flows, for all-zero flows
/// (every rate is a root), when no sign change exists in the bracket, or
/// when neither method converges.
pub fn irr(flows: &[f64]) -> Option<f64> {
    if flows.len() < 2 || flows.iter().any(|cf| !cf.is_finite()) {
        return None;
    }
    if flows.iter().all(|&cf| cf == 0.0) {
        return None;
    }
    let scale = flows.iter().fold(1.0_f64, |m, cf| m.max(cf.abs()));
    let tolerance = IRR_TOLERANCE * scale;

    let mut rate = 0.1;
    for _ in 0..IRR_MAX_ITER {
        let npv = npv_at(rate, flows);
        if npv.abs() < tolerance {
            return Some(rate);
        }
        let slope = npv_derivative(rate, flows);
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        rate -= npv / slope;
        if !rate.is_finite() || rate <= IRR_BRACKET.0 {
            break;
        }
    }

    bisect(flows, tolerance)
}

fn bisect(flows: &[f64], tolerance: f64) -> Option<f64> {
    let (mut lo, mut hi) = IRR_BRACKET;
    let mut f_lo = npv_at(lo, flows);
    let f_hi = npv_at(hi, flows);
    if !f_lo.is_finite() || !f_hi.is_finite() || f_lo.signum() == f_hi.signum() {
        return None;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv_at(mid, flows);
        if f_mid.abs() < tolerance || (hi - lo) < 1e-12 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inputs(years: usize, rate: f64, capex: f64, opex: f64) -> ValuationInputs {
        ValuationInputs {
            capacity_mw: 10.0,
            lifetime_years: years,
            discount_rate: rate,
            capex_total: Some(capex),
            opex_annual: opex,
            capacity_factor: 1.0,
        }
    }

    #[test]
    fn npv_at_zero_rate_is_plain_sum() {
        let cashflows = vec![100.0, 120.0, 140.0];
        let result = evaluate(&inputs(3, 0.0, 2000.0, 50.0), &cashflows, 0.0);
        let npv = result.map(|r| r.npv).ok();
        assert_eq!(npv, Some(1000.0 + 1200.0 + 1400.0 - 150.0 - 2000.0));
    }

    #[test]
    fn insufficient_years_fail() {
        let result = evaluate(&inputs(5, 0.07, 100.0, 0.0), &[1.0, 2.0], 0.0);
        assert_eq!(
            result,
            Err(ValuationError::InsufficientRevenueYears {
                required: 5,
                available: 2
            })
        );
    }

    #[test]
    fn extra_years_are_ignored() {
        let result = evaluate(&inputs(2, 0.0, 0.0, 0.0), &[1.0, 1.0, 1.0], 0.0);
        assert_eq!(result.map(|r| r.revenues.len()).ok(), Some(2));
    }

    #[test]
    fn capex_fallback_used_when_unset() {
        let mut cfg = inputs(1, 0.0, 0.0, 0.0);
        cfg.capex_total = None;
        let result = evaluate(&cfg, &[10.0], 42.0);
        assert_eq!(result.map(|r| r.capex_total).ok(), Some(42.0));
    }

    #[test]
    fn irr_of_simple_project() {
        // -100 then 110 returns exactly 10%
        let rate = irr(&[-100.0, 110.0]);
        assert!(rate.is_some_and(|r| (r - 0.1).abs() < 1e-9));
    }

    #[test]
    fn irr_none_without_sign_change() {
        assert_eq!(irr(&[100.0, 10.0, 10.0]), None);
        assert_eq!(irr(&[-100.0, -10.0]), None);
    }

    #[test]
    fn irr_none_for_non_finite_flows() {
        assert_eq!(irr(&[-100.0, f64::NAN, 50.0]), None);
        assert_eq!(irr(&[-100.0]), None);
    }

    #[test]
    fn irr_none_for_all_zero_flows() {
        assert_eq!(irr(&[0.0, 0.0, 0.0]), None);
        // revenue exactly covers OPEX and there is no CAPEX
        let result = evaluate(&inputs(3, 0.05, 0.0, 20.0), &[2.0, 2.0, 2.0], 0.0);
        assert!(result.as_ref().is_ok_and(|r| r.npv == 0.0 && r.irr.is_none()));
    }

    #[test]
    fn valuation_with_no_irr_still_succeeds() {
        let result = evaluate(&inputs(2, 0.05, 0.0, 0.0), &[1.0, 1.0], 0.0);
        assert!(result.as_ref().is_ok_and(|r| r.irr.is_none()));
    }

    proptest! {
        #[test]
        fn npv_vanishes_at_irr(
            capex in 100.0f64..10_000.0,
            revenue in 1.0f64..2_000.0,
            years in 1usize..30,
        ) {
            let flows: Vec<f64> = std::iter::once(-capex)
                .chain(std::iter::repeat_n(revenue, years))
                .collect();
            if let Some(rate) = irr(&flows) {
                let scale = capex.max(revenue);
                prop_assert!(npv_at(rate, &flows).abs() < 1e-6 * scale);
            }
        }

        #[test]
        fn npv_decreases_with_rate(
            revenue in 1.0f64..1_000.0,
            r1 in 0.0f64..0.2,
            dr in 0.001f64..0.2,
        ) {
            let flows = vec![-500.0, revenue, revenue, revenue];
            prop_assert!(npv_at(r1 + dr, &flows) < npv_at(r1, &flows));
        }
    }
}
