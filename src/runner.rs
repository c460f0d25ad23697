//! Project run orchestration.
//!
//! A [`Project`] holds everything that is identical across runs: the cost
//! schedule, the event list derived from it, and the market cashflows. Each
//! call to [`Project::run`] replays the cost events on a fresh scheduler with
//! its own random stream, discounts the ledger and values the project.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::capex::CostDiagnostic;
use crate::capex::commodity::CommodityTable;
use crate::capex::ledger::{CostLedger, register_cost_events};
use crate::capex::schedule::CostSchedule;
use crate::config::ScenarioConfig;
use crate::error::AppraisalError;
use crate::finex::{DiscountEngine, DiscountedCostRecord};
use crate::io::import::load_prices;
use crate::market::engine::MarketCashflowEngine;
use crate::market::series::TimeSeries;
use crate::report::{Distribution, MonteCarloSummary};
use crate::sim::response::{ConstantResponse, HourlyResponseLoop, ResponseLog, ResponseModel};
use crate::sim::schedule::EventSchedule;
use crate::sim::scheduler::{EventPort, Scheduler};
use crate::sim::types::SimTime;
use crate::valuation::{self, ValuationResult};

/// Mutable world of one run: the ledger and the response log.
#[derive(Debug)]
pub struct RunState {
    pub ledger: CostLedger,
    pub responses: ResponseLog,
}

impl AsMut<CostLedger> for RunState {
    fn as_mut(&mut self) -> &mut CostLedger {
        &mut self.ledger
    }
}

impl AsMut<ResponseLog> for RunState {
    fn as_mut(&mut self) -> &mut ResponseLog {
        &mut self.responses
    }
}

/// Outcome of one appraisal run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_index: u64,
    pub seed: u64,
    pub events_fired: usize,
    /// Nominal CAPEX.
    pub total_cost: f64,
    /// CAPEX discounted to project start.
    pub discounted_cost: f64,
    pub ledger: Vec<DiscountedCostRecord>,
    pub cost_by_category: BTreeMap<String, f64>,
    pub cost_by_event: BTreeMap<String, f64>,
    pub diagnostics: Vec<CostDiagnostic>,
    pub responses: ResponseLog,
    /// Support-scheme cashflows per MW at the payment frequency.
    pub cashflows: Option<TimeSeries>,
    pub valuation: Option<ValuationResult>,
}

impl RunReport {
    /// Discounted ledger entries whose timing lies in `[from, to]` hours.
    pub fn ledger_between(&self, from: f64, to: f64) -> Vec<DiscountedCostRecord> {
        self.ledger
            .iter()
            .filter(|d| d.record.timing >= from && d.record.timing <= to)
            .cloned()
            .collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Appraisal Run {} (seed {}) ---", self.run_index, self.seed)?;
        writeln!(f, "Cost events fired:  {}", self.events_fired)?;
        writeln!(f, "CAPEX nominal:      {:.2}", self.total_cost)?;
        writeln!(f, "CAPEX discounted:   {:.2}", self.discounted_cost)?;
        for (category, cost) in &self.cost_by_category {
            writeln!(f, "  {category:<18}{cost:.2}")?;
        }
        if !self.diagnostics.is_empty() {
            writeln!(f, "Diagnostics:        {}", self.diagnostics.len())?;
            for d in &self.diagnostics {
                writeln!(f, "  {d}")?;
            }
        }
        if let Some(mean) = self.responses.mean() {
            writeln!(
                f,
                "Response samples:   {} (mean {mean:.3})",
                self.responses.len()
            )?;
        }
        match &self.valuation {
            Some(v) => {
                writeln!(f, "NPV:                {:.2}", v.npv)?;
                match v.irr {
                    Some(irr) => write!(f, "IRR:                {:.2}%", irr * 100.0),
                    None => write!(f, "IRR:                n/a"),
                }
            }
            None => write!(f, "Valuation:          skipped (no market prices)"),
        }
    }
}

/// Run-invariant part of an appraisal.
#[derive(Debug, Clone)]
pub struct Project {
    config: ScenarioConfig,
    schedule: Arc<CostSchedule>,
    commodities: Arc<CommodityTable>,
    events: EventSchedule,
    diagnostics: Vec<CostDiagnostic>,
    market: Option<TimeSeries>,
    cashflows: Option<TimeSeries>,
    annual: Vec<f64>,
}

impl Project {
    /// Builds a project from a scenario, loading `market.prices` if set.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, an unreadable price file, or price
    /// data the forecast or cashflow engine cannot use.
    pub fn new(config: ScenarioConfig) -> Result<Self, AppraisalError> {
        let history = match &config.market.prices {
            Some(path) => Some(load_prices(path)?),
            None => None,
        };
        Self::with_prices(config, history)
    }

    /// Builds a project from a scenario and an already loaded price history.
    ///
    /// Without a history the runs only produce the CAPEX side.
    ///
    /// # Errors
    ///
    /// See [`Project::new`].
    pub fn with_prices(
        config: ScenarioConfig,
        history: Option<TimeSeries>,
    ) -> Result<Self, AppraisalError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(AppraisalError::Config(errors));
        }

        let (events, diagnostics) = EventSchedule::from_cost_schedule(&config.capex);
        let horizon = config.simulation.horizon.to_hours();
        if let Some(last) = events.last_trigger() {
            if last.hours() >= horizon {
                warn!(
                    last_trigger = %last,
                    horizon,
                    "cost events at or after the horizon will not fire"
                );
            }
        }

        let market = match (history, &config.forecast) {
            (Some(h), Some(forecast)) => Some(forecast.forecast(&h)?),
            (h, _) => h,
        };
        if let Some(prices) = &market {
            let partial = prices.partial_years();
            if !partial.is_empty() {
                warn!(
                    ?partial,
                    "market prices only partly cover these calendar years, \
                     their cashflows count as full operating years"
                );
            }
        }
        let (cashflows, annual) = match &market {
            Some(prices) => {
                let engine = MarketCashflowEngine::new(config.market.scheme_config());
                let cashflows = engine.cashflows(prices)?;
                let annual = cashflows.yearly_totals().into_iter().map(|(_, v)| v).collect();
                (Some(cashflows), annual)
            }
            None => (None, Vec::new()),
        };

        info!(
            events = events.len(),
            diagnostics = diagnostics.len(),
            market = market.is_some(),
            "project prepared"
        );
        Ok(Self {
            schedule: Arc::new(config.capex.clone()),
            commodities: Arc::new(config.commodity.clone()),
            config,
            events,
            diagnostics,
            market,
            cashflows,
            annual,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn events(&self) -> &EventSchedule {
        &self.events
    }

    /// Problems found while building the event list.
    pub fn diagnostics(&self) -> &[CostDiagnostic] {
        &self.diagnostics
    }

    /// Prices the cashflows are computed from, forecast if configured.
    pub fn market_prices(&self) -> Option<&TimeSeries> {
        self.market.as_ref()
    }

    pub fn cashflows(&self) -> Option<&TimeSeries> {
        self.cashflows.as_ref()
    }

    /// Runs once with the configured constant response model.
    ///
    /// # Errors
    ///
    /// Fails when the market cashflows cover fewer years than the project
    /// lifetime.
    pub fn run(&self, run_index: u64) -> Result<RunReport, AppraisalError> {
        self.run_with_response(run_index, ConstantResponse(self.config.response.constant_mw))
    }

    /// Runs once, sampling `model` during the operations window when the
    /// response loop is enabled.
    ///
    /// # Arguments
    ///
    /// * `run_index` - Selects the random stream; equal indices reproduce
    ///   identical ledgers
    /// * `model` - Farm response queried by the hourly loop
    ///
    /// # Errors
    ///
    /// See [`Project::run`].
    pub fn run_with_response<M>(&self, run_index: u64, model: M) -> Result<RunReport, AppraisalError>
    where
        M: ResponseModel + 'static,
    {
        let sim = &self.config.simulation;
        let mut ledger = CostLedger::new(
            Arc::clone(&self.schedule),
            Arc::clone(&self.commodities),
            sim.seed,
            run_index,
        );
        ledger.extend_diagnostics(self.diagnostics.iter().cloned());
        let mut state = RunState {
            ledger,
            responses: ResponseLog::default(),
        };

        let mut scheduler = Scheduler::new(SimTime::from_hours(sim.horizon.to_hours()));
        register_cost_events::<RunState, _>(&mut scheduler, &self.events);
        let response = &self.config.response;
        if response.enabled {
            let start = SimTime::from_hours(sim.operations_start.to_hours());
            let end = SimTime::from_hours(sim.operations_end.to_hours());
            let looped =
                HourlyResponseLoop::with_interval(model, start, end, response.interval.to_hours());
            scheduler.register_at(start, Box::new(looped));
        }
        scheduler.run(&mut state);

        let RunState { ledger, responses } = state;
        let discount = DiscountEngine::from_config(&self.config.financing);
        let discounted = discount.discount_records(ledger.records());
        let discounted_cost: f64 = discounted.iter().map(|d| d.discounted_cost).sum();

        let valuation = if self.market.is_some() {
            Some(valuation::evaluate(
                &self.config.valuation,
                &self.annual,
                discounted_cost,
            )?)
        } else {
            None
        };

        info!(
            run_index,
            total = ledger.total(),
            discounted = discounted_cost,
            npv = valuation.as_ref().map(|v| v.npv),
            "run completed"
        );
        Ok(RunReport {
            run_index,
            seed: sim.seed,
            events_fired: ledger.events_fired(),
            total_cost: ledger.total(),
            discounted_cost,
            ledger: discounted,
            cost_by_category: ledger.by_category(),
            cost_by_event: ledger.by_event(),
            diagnostics: ledger.diagnostics().to_vec(),
            responses,
            cashflows: self.cashflows.clone(),
            valuation,
        })
    }
}

/// Builds a project from `config` and runs it once with run index 0.
///
/// # Errors
///
/// See [`Project::new`] and [`Project::run`].
pub fn run_scenario(config: ScenarioConfig) -> Result<RunReport, AppraisalError> {
    Project::new(config)?.run(0)
}

/// Runs `runs` independent appraisals and summarizes them.
///
/// Run `i` uses random stream `i`, so any single run can be replayed with
/// [`Project::run`].
///
/// # Errors
///
/// Stops at the first failing run.
pub fn run_monte_carlo(project: &Project, runs: usize) -> Result<MonteCarloSummary, AppraisalError> {
    let mut totals = Vec::with_capacity(runs);
    let mut discounted = Vec::with_capacity(runs);
    let mut npvs = Vec::new();
    let mut irrs = Vec::new();
    let mut irr_missing = 0;

    for i in 0..runs {
        let report = project.run(i as u64)?;
        totals.push(report.total_cost);
        discounted.push(report.discounted_cost);
        if let Some(v) = &report.valuation {
            npvs.push(v.npv);
            match v.irr {
                Some(irr) => irrs.push(irr),
                None => irr_missing += 1,
            }
        }
    }

    let summary = MonteCarloSummary {
        runs,
        total_cost: Distribution::from_samples(&totals),
        discounted_cost: Distribution::from_samples(&discounted),
        npv: Distribution::from_samples(&npvs),
        irr: Distribution::from_samples(&irrs),
        irr_missing,
    };
    info!(runs, irr_missing, "monte carlo completed");
    Ok(summary)
}
