//! CSV export of cost ledgers and cashflow series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::capex::ledger::CostRecord;
use crate::finex::DiscountedCostRecord;
use crate::market::series::TimeSeries;

/// Column header for discounted ledger export.
const DISCOUNTED_HEADER: &str = "event_name,category_name,subcategory_name,subsubcategory_name,\
                                 cost,timing,discounted_cost";

/// Column header for cashflow export.
const CASHFLOW_HEADER: &str = "timestamp,cashflow";

fn ledger_fields(r: &CostRecord) -> [String; 6] {
    [
        r.event_name.clone(),
        r.category_name.clone(),
        r.subcategory_name.clone(),
        r.subsubcategory_name.clone(),
        format!("{:.2}", r.cost),
        format!("{:.1}", r.timing),
    ]
}

/// Writes a discounted ledger to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_ledger_csv(records: &[DiscountedCostRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_discounted_csv(records, io::BufWriter::new(file))
}

/// Writes discounted cost records as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_discounted_csv(records: &[DiscountedCostRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(DISCOUNTED_HEADER.split(',').map(str::trim))?;
    for d in records {
        let [a, b, c, e, cost, timing] = ledger_fields(&d.record);
        wtr.write_record(&[a, b, c, e, cost, timing, format!("{:.2}", d.discounted_cost)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a cashflow series to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_cashflow_csv(series: &TimeSeries, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_cashflow_csv(series, io::BufWriter::new(file))
}

/// Writes a cashflow series as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_cashflow_csv(series: &TimeSeries, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(CASHFLOW_HEADER.split(','))?;
    for p in series.points() {
        wtr.write_record(&[
            p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.4}", p.value),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
