//! CAPEX side of a run: event firing, ledger contents and reproducibility.

mod common;

use owf_appraisal::capex::CostDiagnostic;
use owf_appraisal::config::ScenarioConfig;
use owf_appraisal::runner::{Project, run_monte_carlo};

use common::{fixed_schedule, scenario_with};

#[test]
fn two_events_one_year_apart() {
    let cfg = scenario_with(fixed_schedule(&[
        ("Development", 0.0, 1_000_000.0),
        ("Installation", 8760.0, 500_000.0),
    ]));
    let report = Project::with_prices(cfg, None).and_then(|p| p.run(0));
    assert!(report.is_ok(), "{:?}", report.err());
    let report = report.unwrap();

    assert_eq!(report.ledger.len(), 2);
    assert_eq!(report.total_cost, 1_500_000.0);
    let timings: Vec<f64> = report.ledger.iter().map(|d| d.record.timing).collect();
    assert_eq!(timings, vec![0.0, 8760.0]);
    assert_eq!(report.ledger[0].record.event_name, "Development_event");
    // No financing instrument: zero discount rate.
    assert_eq!(report.discounted_cost, report.total_cost);
}

#[test]
fn events_fire_in_trigger_order() {
    let cfg = scenario_with(fixed_schedule(&[
        ("Late", 500.0, 3.0),
        ("Early", 100.0, 1.0),
        ("Tie", 500.0, 2.0),
    ]));
    let report = Project::with_prices(cfg, None).and_then(|p| p.run(0)).unwrap();
    let names: Vec<&str> = report
        .ledger
        .iter()
        .map(|d| d.record.subcategory_name.as_str())
        .collect();
    assert_eq!(names, vec!["Early", "Late", "Tie"]);
}

#[test]
fn events_after_horizon_do_not_fire() {
    let mut cfg = scenario_with(fixed_schedule(&[("Now", 0.0, 1.0), ("Never", 1e9, 1.0)]));
    cfg.simulation.horizon = owf_appraisal::config::DurationSpec::years(1.0);
    let report = Project::with_prices(cfg, None).and_then(|p| p.run(0)).unwrap();
    assert_eq!(report.events_fired, 1);
    assert_eq!(report.total_cost, 1.0);
}

#[test]
fn missing_cost_categories_is_diagnosed_not_fatal() {
    let mut schedule = fixed_schedule(&[("Only", 0.0, 5.0)]);
    schedule.insert("empty", Default::default());
    let report = Project::with_prices(scenario_with(schedule), None)
        .and_then(|p| p.run(0))
        .unwrap();
    assert_eq!(report.total_cost, 5.0);
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| matches!(d, CostDiagnostic::MissingCostCategories { file } if file == "empty"))
    );
}

#[test]
fn fixed_commodities_give_identical_ledgers_across_runs() {
    let project = Project::with_prices(ScenarioConfig::baseline(), None).unwrap();
    let a = project.run(0).unwrap();
    let b = project.run(7).unwrap();
    assert_eq!(a.ledger, b.ledger);
    assert_eq!(a.total_cost.to_bits(), b.total_cost.to_bits());
}

#[test]
fn stochastic_runs_are_reproducible_per_index() {
    let project = Project::with_prices(ScenarioConfig::commodity_risk(), None).unwrap();
    let first = project.run(3).unwrap();
    let again = project.run(3).unwrap();
    let other = project.run(4).unwrap();
    assert_eq!(first.ledger, again.ledger);
    assert_ne!(first.total_cost, other.total_cost);
}

#[test]
fn monte_carlo_spreads_stochastic_costs() {
    let project = Project::with_prices(ScenarioConfig::commodity_risk(), None).unwrap();
    let summary = run_monte_carlo(&project, 20).unwrap();
    let total = summary.total_cost.unwrap();
    assert_eq!(total.count, 20);
    assert!(total.min < total.max);
    assert!(total.p10 <= total.p50 && total.p50 <= total.p90);
    assert!(summary.npv.is_none());
}
