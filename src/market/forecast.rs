//! Multi-decade price forecast from a historical reference quarter.
//!
//! The forecast price for a year is the mean price of a reference quarter,
//! escalated with inflation and scaled by a market value factor (MVF) that
//! falls as the renewable share grows.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::MarketError;
use super::series::{Point, TimeSeries};

/// Lowest market value factor the curve may reach.
pub const MVF_FLOOR: f64 = 0.7;

/// `[forecast]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Renewable share observed in `known_year` (0.0–1.0).
    pub known_share: f64,
    /// Renewable share expected in `target_year` (0.0–1.0).
    pub target_share: f64,
    pub known_year: i32,
    pub target_year: i32,
    /// First forecast year (inclusive).
    pub start_year: i32,
    /// Last forecast year (inclusive).
    pub end_year: i32,
    /// Annual price escalation as a decimal.
    pub inflation_rate: f64,
    /// MVF reduction per unit of renewable share.
    pub mvf_slope: f64,
    /// Year of the reference quarter; defaults to the last year in the history.
    pub reference_year: Option<i32>,
    /// Reference quarter (1–4); defaults to the last quarter in the history.
    pub reference_quarter: Option<u32>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            known_share: 0.2084,
            target_share: 0.4866,
            known_year: 2021,
            target_year: 2030,
            start_year: 2025,
            end_year: 2050,
            inflation_rate: 0.01,
            mvf_slope: 0.5,
            reference_year: None,
            reference_quarter: None,
        }
    }
}

impl ForecastConfig {
    /// Renewable share in `year`, linear through the known and target points,
    /// flat before the known year and clamped to `[0, 1]`.
    pub fn renewable_share(&self, year: i32) -> f64 {
        if year <= self.known_year || self.target_year == self.known_year {
            return self.known_share.clamp(0.0, 1.0);
        }
        let slope = (self.target_share - self.known_share)
            / f64::from(self.target_year - self.known_year);
        (self.known_share + slope * f64::from(year - self.known_year)).clamp(0.0, 1.0)
    }

    /// Market value factor in `year`, never below [`MVF_FLOOR`].
    pub fn market_value_factor(&self, year: i32) -> f64 {
        (1.0 - self.mvf_slope * self.renewable_share(year)).clamp(MVF_FLOOR, 1.0)
    }

    /// Mean price of the reference quarter and the quarter's year.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::EmptySeries`] for an empty history and
    /// [`MarketError::NoReferenceData`] if the quarter has no observations.
    pub fn base_price(&self, history: &TimeSeries) -> Result<(f64, i32), MarketError> {
        let last = history.last().ok_or(MarketError::EmptySeries)?.timestamp;
        let year = self.reference_year.unwrap_or(last.year());
        let quarter = self.reference_quarter.unwrap_or(last.month0() / 3 + 1);

        let (from, to) = quarter_bounds(year, quarter).ok_or(MarketError::NoReferenceData {
            year,
            quarter,
        })?;
        let window = history.between(from, to);
        if window.is_empty() {
            return Err(MarketError::NoReferenceData { year, quarter });
        }
        Ok((window.total() / window.len() as f64, year))
    }

    /// Forecast price for `year` given the base price of `reference_year`.
    pub fn price(&self, base_price: f64, reference_year: i32, year: i32) -> f64 {
        let escalation = (1.0 + self.inflation_rate).powi(year - reference_year);
        base_price * escalation * self.market_value_factor(year)
    }

    /// Hourly forecast series covering `start_year..=end_year`, flat within
    /// each year.
    ///
    /// # Errors
    ///
    /// Fails on an empty window (`start_year > end_year`) or when no base
    /// price can be taken from `history`.
    pub fn forecast(&self, history: &TimeSeries) -> Result<TimeSeries, MarketError> {
        if self.start_year > self.end_year {
            return Err(MarketError::InvalidForecastWindow {
                start: self.start_year,
                end: self.end_year,
            });
        }
        let (base, reference_year) = self.base_price(history)?;
        info!(
            base_price = base,
            reference_year,
            start = self.start_year,
            end = self.end_year,
            "forecasting market prices"
        );

        let mut points = Vec::new();
        for year in self.start_year..=self.end_year {
            let price = self.price(base, reference_year, year);
            let Some(mut t) = year_start(year) else {
                continue;
            };
            while t.year() == year {
                points.push(Point {
                    timestamp: t,
                    value: price,
                });
                t += TimeDelta::hours(1);
            }
        }
        TimeSeries::new(points)
    }
}

fn year_start(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn quarter_bounds(year: i32, quarter: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    let from = NaiveDate::from_ymd_opt(year, 3 * (quarter - 1) + 1, 1)?.and_hms_opt(0, 0, 0)?;
    let to = if quarter == 4 {
        year_start(year + 1)?
    } else {
        NaiveDate::from_ymd_opt(year, 3 * quarter + 1, 1)?.and_hms_opt(0, 0, 0)?
    };
    Some((from, to))
}
