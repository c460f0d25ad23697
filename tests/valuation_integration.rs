//! Discounting and valuation of complete runs.

mod common;

use std::path::PathBuf;

use owf_appraisal::AppraisalError;
use owf_appraisal::config::ScenarioConfig;
use owf_appraisal::finex::{DiscountEngine, FinancingInstrument, TimingBasis};
use owf_appraisal::market::SupportScheme;
use owf_appraisal::runner::{Project, run_monte_carlo};
use owf_appraisal::valuation::{ValuationError, npv_at};

use common::{fixed_schedule, flat_prices, scenario_with, start_of};

#[test]
fn one_year_discount_at_seven_percent() {
    let engine = DiscountEngine::new(0.07, TimingBasis::Years);
    assert!((engine.discount(1000.0, 1.0) - 934.579_439).abs() < 1e-6);
    let hourly = DiscountEngine::new(0.07, TimingBasis::Hours);
    assert_eq!(hourly.discount(1000.0, 8760.0), engine.discount(1000.0, 1.0));
}

#[test]
fn debt_rate_discounts_the_ledger() {
    let mut cfg = scenario_with(fixed_schedule(&[
        ("Now", 0.0, 1000.0),
        ("Later", 8760.0, 1000.0),
    ]));
    cfg.financing.instruments = vec![FinancingInstrument {
        name: "Debt".into(),
        interest_rate: 7.0,
    }];
    let report = Project::with_prices(cfg, None).and_then(|p| p.run(0)).unwrap();
    assert_eq!(report.ledger[0].discounted_cost, 1000.0);
    assert!((report.ledger[1].discounted_cost - 934.579_439).abs() < 1e-6);
}

fn valued_config(scheme: SupportScheme) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.market.scheme = scheme;
    cfg
}

#[test]
fn fixed_price_npv_matches_hand_computation() {
    let mut cfg = valued_config(SupportScheme::FixedPrice { strike_price: 80.0 });
    cfg.valuation.discount_rate = 0.0;
    let history = flat_prices(start_of(2024), 50.0, 24);
    let report = Project::with_prices(cfg.clone(), Some(history))
        .and_then(|p| p.run(0))
        .unwrap();
    let v = report.valuation.unwrap();

    let capacity = cfg.valuation.capacity_mw * cfg.valuation.capacity_factor;
    // 2025..=2049 with leap years 2028, 2032, 2036, 2040, 2044, 2048
    let hours = 25.0 * 8760.0 + 6.0 * 24.0;
    let expected = 80.0 * hours * capacity - 25.0 * cfg.valuation.opex_annual - v.capex_total;
    assert!((v.npv - expected).abs() < 1e-3 * expected.abs(), "{} vs {expected}", v.npv);
    assert_eq!(v.capex_total, report.discounted_cost);
    assert_eq!(v.revenues.len(), 25);
}

#[test]
fn npv_is_zero_at_irr() {
    let history = flat_prices(start_of(2024), 50.0, 24);
    let report = Project::with_prices(ScenarioConfig::baseline(), Some(history))
        .and_then(|p| p.run(0))
        .unwrap();
    let v = report.valuation.unwrap();
    let irr = v.irr.expect("a CfD project with positive cashflows has an IRR");
    let npv = npv_at(irr, &v.cash_flows());
    assert!(npv.abs() < 1e-3 * v.capex_total, "npv at irr = {npv}");
}

#[test]
fn short_history_without_forecast_is_a_validation_error() {
    let mut cfg = ScenarioConfig::baseline();
    cfg.forecast = None;
    let history = flat_prices(start_of(2024), 50.0, 24);
    let result = Project::with_prices(cfg, Some(history)).and_then(|p| p.run(0));
    assert!(matches!(
        result,
        Err(AppraisalError::Valuation(ValuationError::InsufficientRevenueYears {
            required: 25,
            available: 1
        }))
    ));
}

#[test]
fn merchant_project_has_lower_npv_than_cfd_when_prices_are_low() {
    let history = flat_prices(start_of(2024), 30.0, 24);
    let npv = |scheme| {
        Project::with_prices(valued_config(scheme), Some(history.clone()))
            .and_then(|p| p.run(0))
            .ok()
            .and_then(|r| r.valuation)
            .map(|v| v.npv)
            .unwrap_or(f64::NAN)
    };
    let merchant = npv(SupportScheme::MarketExposed);
    let cfd = npv(SupportScheme::ContractForDifference {
        strike_price: 80.0,
        one_sided: false,
    });
    assert!(cfd > merchant, "cfd {cfd} vs merchant {merchant}");
}

#[test]
fn prices_load_from_csv_file() {
    let mut cfg = ScenarioConfig::baseline();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/prices_sample.csv");
    cfg.market.prices = Some(path);
    let project = Project::new(cfg).unwrap();
    let prices = project.market_prices().unwrap();
    // 2025..=2050 forecast, hourly
    assert_eq!(prices.first().map(|p| p.timestamp), Some(start_of(2025)));
    assert!(project.cashflows().is_some_and(|c| c.len() == 26));
}

#[test]
fn monte_carlo_reports_npv_distribution() {
    let history = flat_prices(start_of(2024), 50.0, 24);
    let project = Project::with_prices(ScenarioConfig::commodity_risk(), Some(history)).unwrap();
    let summary = run_monte_carlo(&project, 8).unwrap();
    let npv = summary.npv.unwrap();
    assert_eq!(npv.count, 8);
    assert!(npv.min < npv.max);
    assert_eq!(summary.irr.map(|d| d.count).unwrap_or(0) + summary.irr_missing, 8);
}
