//! Timestamped value series with calendar resampling.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use super::MarketError;

/// Calendar bucket used for reference prices and payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// Start of the calendar period containing `ts`.
    pub fn period_start(self, ts: NaiveDateTime) -> NaiveDateTime {
        let date = ts.date();
        match self {
            Self::Hourly => ts
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(ts),
            Self::Daily => date.and_time(chrono::NaiveTime::MIN),
            Self::Monthly => date.with_day(1).unwrap_or(date).and_time(chrono::NaiveTime::MIN),
            Self::Yearly => date
                .with_ordinal(1)
                .unwrap_or(date)
                .and_time(chrono::NaiveTime::MIN),
        }
    }
}

impl Frequency {
    /// Finest frequency whose periods are at least `step` long.
    fn covering(step: TimeDelta) -> Self {
        if step <= TimeDelta::hours(1) {
            Self::Hourly
        } else if step <= TimeDelta::days(1) {
            Self::Daily
        } else if step <= TimeDelta::days(31) {
            Self::Monthly
        } else {
            Self::Yearly
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        };
        f.write_str(s)
    }
}

/// One observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Ordered `(timestamp, value)` pairs with strictly increasing timestamps.
///
/// Series are never modified in place; every transformation returns a new
/// series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<Point>,
}

impl TimeSeries {
    /// Builds a series, rejecting non-increasing timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::UnorderedTimestamps`] at the first timestamp
    /// that is not later than its predecessor.
    pub fn new(points: Vec<Point>) -> Result<Self, MarketError> {
        if let Some(i) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(MarketError::UnorderedTimestamps {
                index: i + 1,
                timestamp: points[i + 1].timestamp,
            });
        }
        Ok(Self { points })
    }

    /// Hourly series starting at `start`.
    pub fn hourly(start: NaiveDateTime, values: &[f64]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Point {
                timestamp: start + TimeDelta::hours(i as i64),
                value,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn total(&self) -> f64 {
        self.values().sum()
    }

    /// Applies `f` to every value, keeping timestamps.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point {
                    timestamp: p.timestamp,
                    value: f(p.value),
                })
                .collect(),
        }
    }

    /// One point per non-empty period, stamped at the period start, holding
    /// the mean of the period's values.
    pub fn resample_mean(&self, freq: Frequency) -> Self {
        self.resample(freq, |sum, n| sum / n as f64)
    }

    /// One point per non-empty period, stamped at the period start, holding
    /// the sum of the period's values.
    pub fn resample_sum(&self, freq: Frequency) -> Self {
        self.resample(freq, |sum, _| sum)
    }

    /// Replaces every value with the mean of its calendar period, keeping
    /// the native timestamps (period mean forward-filled to native
    /// resolution).
    pub fn period_mean(&self, freq: Frequency) -> Self {
        let means = self.resample_mean(freq);
        let mut periods = means.points.iter().peekable();
        let mut points = Vec::with_capacity(self.points.len());
        for p in &self.points {
            let start = freq.period_start(p.timestamp);
            while periods.next_if(|m| m.timestamp < start).is_some() {}
            let value = periods.peek().map_or(f64::NAN, |m| m.value);
            points.push(Point {
                timestamp: p.timestamp,
                value,
            });
        }
        Self { points }
    }

    /// Calendar-year totals in year order.
    pub fn yearly_totals(&self) -> Vec<(i32, f64)> {
        self.resample_sum(Frequency::Yearly)
            .points
            .iter()
            .map(|p| (p.timestamp.year(), p.value))
            .collect()
    }

    /// Calendar years at either end that the series only partly covers.
    ///
    /// The first year is partial unless the series starts on 1 January at
    /// midnight. The last year is partial unless its final point falls in
    /// the last period of December, at the resolution of the final step.
    pub fn partial_years(&self) -> Vec<i32> {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Vec::new();
        };
        let mut partial = Vec::new();
        if first.timestamp != Frequency::Yearly.period_start(first.timestamp) {
            partial.push(first.timestamp.year());
        }

        let step = match self.points.len() {
            0 | 1 => TimeDelta::days(366),
            n => self.points[n - 1].timestamp - self.points[n - 2].timestamp,
        };
        let freq = Frequency::covering(step);
        let year = last.timestamp.year();
        let year_end = NaiveDate::from_ymd_opt(year, 12, 31).and_then(|d| d.and_hms_opt(23, 0, 0));
        let ends_complete =
            year_end.is_some_and(|end| freq.period_start(last.timestamp) == freq.period_start(end));
        if !ends_complete && partial.last() != Some(&year) {
            partial.push(year);
        }
        partial
    }

    /// Points whose timestamp lies in `[from, to)`.
    pub fn between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| p.timestamp >= from && p.timestamp < to)
                .copied()
                .collect(),
        }
    }

    fn resample(&self, freq: Frequency, reduce: impl Fn(f64, usize) -> f64) -> Self {
        let mut points: Vec<Point> = Vec::new();
        let mut current: Option<(NaiveDateTime, f64, usize)> = None;
        for p in &self.points {
            let start = freq.period_start(p.timestamp);
            if let Some((_, sum, n)) = current.as_mut().filter(|(s, _, _)| *s == start) {
                *sum += p.value;
                *n += 1;
                continue;
            }
            if let Some((s, sum, n)) = current.take() {
                points.push(Point {
                    timestamp: s,
                    value: reduce(sum, n),
                });
            }
            current = Some((start, p.value, 1));
        }
        if let Some((s, sum, n)) = current {
            points.push(Point {
                timestamp: s,
                value: reduce(sum, n),
            });
        }
        Self { points }
    }
}
