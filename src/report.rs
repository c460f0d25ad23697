//! Summary statistics across Monte Carlo runs.

use std::fmt;

use serde::Serialize;

/// Distribution of one metric across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

impl Distribution {
    /// Summarizes `samples`, ignoring non-finite values.
    ///
    /// Returns `None` when no finite sample remains.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut values: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let n = values.len();
        Some(Self {
            count: n,
            mean: values.iter().sum::<f64>() / n as f64,
            min: values[0],
            max: values[n - 1],
            p10: percentile(&values, 10.0),
            p50: percentile(&values, 50.0),
            p90: percentile(&values, 90.0),
        })
    }
}

/// Linear interpolation between closest ranks of sorted `values`.
fn percentile(values: &[f64], p: f64) -> f64 {
    let n = values.len();
    if n == 1 {
        return values[0];
    }
    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.2}  p10 {:.2}  p50 {:.2}  p90 {:.2}  [min {:.2}, max {:.2}]",
            self.mean, self.p10, self.p50, self.p90, self.min, self.max
        )
    }
}

/// Aggregate of N independent appraisal runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub runs: usize,
    pub total_cost: Option<Distribution>,
    pub discounted_cost: Option<Distribution>,
    /// Absent when no run produced a valuation.
    pub npv: Option<Distribution>,
    /// Over runs whose IRR converged.
    pub irr: Option<Distribution>,
    /// Runs whose valuation had no IRR.
    pub irr_missing: usize,
}

impl fmt::Display for MonteCarloSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Monte Carlo Summary ({} runs) ---", self.runs)?;
        let line = |d: &Option<Distribution>| match d {
            Some(d) => d.to_string(),
            None => "n/a".to_string(),
        };
        writeln!(f, "CAPEX total:        {}", line(&self.total_cost))?;
        writeln!(f, "CAPEX discounted:   {}", line(&self.discounted_cost))?;
        writeln!(f, "NPV:                {}", line(&self.npv))?;
        write!(
            f,
            "IRR:                {} ({} runs without IRR)",
            line(&self.irr),
            self.irr_missing
        )
    }
}
