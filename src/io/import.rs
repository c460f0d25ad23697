//! CSV import of hourly market prices.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::AppraisalError;
use crate::market::series::{Point, TimeSeries};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Deserialize)]
struct PriceRow {
    timestamp: String,
    price: f64,
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Loads a `timestamp,price` CSV file into a series.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a row does not parse, or
/// timestamps are not strictly increasing.
pub fn load_prices(path: &Path) -> Result<TimeSeries, AppraisalError> {
    let file = File::open(path)?;
    read_prices(file)
}

/// Reads a `timestamp,price` CSV from any reader.
///
/// Timestamps are naive local times in `YYYY-MM-DD HH:MM[:SS]` form, with
/// a space or `T` separator.
///
/// # Errors
///
/// See [`load_prices`].
pub fn read_prices(reader: impl Read) -> Result<TimeSeries, AppraisalError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();
    for (i, row) in rdr.deserialize::<PriceRow>().enumerate() {
        let row = row?;
        let timestamp =
            parse_timestamp(&row.timestamp).ok_or_else(|| AppraisalError::PriceData {
                row: i + 1,
                message: format!("unrecognized timestamp \"{}\"", row.timestamp),
            })?;
        if !row.price.is_finite() {
            return Err(AppraisalError::PriceData {
                row: i + 1,
                message: "price is not finite".into(),
            });
        }
        points.push(Point {
            timestamp,
            value: row.price,
        });
    }
    Ok(TimeSeries::new(points)?)
}
