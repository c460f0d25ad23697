//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use owf_appraisal::capex::schedule::{CostCategory, CostFile, CostItem, CostSchedule, Subcategory};
use owf_appraisal::config::{DurationSpec, ScenarioConfig};
use owf_appraisal::market::series::TimeSeries;

/// Midnight on January 1st of `year`.
pub fn start_of(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid calendar year")
}

/// Flat hourly price series of `hours` points starting at `start`.
pub fn flat_prices(start: NaiveDateTime, price: f64, hours: usize) -> TimeSeries {
    TimeSeries::hourly(start, &vec![price; hours])
}

/// One cost file with one category; each `(subcategory, trigger_h, fixed_cost)`
/// becomes a subcategory holding a single fixed-cost item.
pub fn fixed_schedule(entries: &[(&str, f64, f64)]) -> CostSchedule {
    let subcategories = entries
        .iter()
        .map(|&(name, trigger_h, cost)| Subcategory {
            name: name.into(),
            trigger_time: Some(DurationSpec::Hours(trigger_h)),
            subsubcategories: vec![CostItem::fixed(format!("{name} item"), cost)],
        })
        .collect();
    let mut schedule = CostSchedule::new();
    schedule.insert(
        "project",
        CostFile {
            cost_categories: Some(vec![CostCategory {
                name: "Capex".into(),
                subcategories,
            }]),
        },
    );
    schedule
}

/// Scenario with only the given cost schedule, no forecast and no discounting.
pub fn scenario_with(schedule: CostSchedule) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.capex = schedule;
    cfg.forecast = None;
    cfg.financing.instruments.clear();
    cfg
}
