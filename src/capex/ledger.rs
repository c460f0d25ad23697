//! Append-only ledger of realized capital costs.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::CostDiagnostic;
use super::commodity::CommodityTable;
use super::schedule::{CostItem, CostSchedule};
use crate::sim::event::ScheduledEvent;
use crate::sim::schedule::EventSchedule;
use crate::sim::scheduler::{EventPort, Process, Yield};
use crate::sim::types::SimTime;

/// One realized cost of a subsubcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub event_name: String,
    pub category_name: String,
    pub subcategory_name: String,
    pub subsubcategory_name: String,
    pub cost: f64,
    /// Simulated time of the firing, in hours from project start.
    pub timing: f64,
}

/// Realizes costs for fired events and keeps them in firing order.
///
/// The ledger owns its random stream; two ledgers built with the same
/// seed and stream produce identical records for identical firings.
#[derive(Debug, Clone)]
pub struct CostLedger {
    schedule: Arc<CostSchedule>,
    commodities: Arc<CommodityTable>,
    rng: ChaCha8Rng,
    records: Vec<CostRecord>,
    total: f64,
    events_fired: usize,
    diagnostics: Vec<CostDiagnostic>,
}

impl CostLedger {
    /// Creates an empty ledger.
    ///
    /// # Arguments
    ///
    /// * `schedule` - Cost schedule the fired events refer to
    /// * `commodities` - Commodity table for material pricing
    /// * `seed` - Master seed shared by all runs
    /// * `stream` - Stream index, one per Monte Carlo run
    pub fn new(
        schedule: Arc<CostSchedule>,
        commodities: Arc<CommodityTable>,
        seed: u64,
        stream: u64,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self {
            schedule,
            commodities,
            rng,
            records: Vec::new(),
            total: 0.0,
            events_fired: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Realizes every cost item of the fired event's subcategory.
    ///
    /// Appends one record per subsubcategory with `timing = now` and returns
    /// the event cost. An event whose key is not in the schedule records
    /// nothing and yields a diagnostic.
    pub fn fire(&mut self, event: &ScheduledEvent, now: SimTime) -> f64 {
        self.events_fired += 1;
        let schedule = Arc::clone(&self.schedule);
        let Some((category, sub)) = schedule.find(&event.key) else {
            warn!(key = %event.key, "fired event not found in cost schedule");
            self.diagnostics.push(CostDiagnostic::UnknownEvent {
                key: event.key.to_string(),
            });
            return 0.0;
        };

        let mut event_cost = 0.0;
        for item in &sub.subsubcategories {
            let cost = self.item_cost(event, item, now);
            self.records.push(CostRecord {
                event_name: event.name.clone(),
                category_name: category.name.clone(),
                subcategory_name: sub.name.clone(),
                subsubcategory_name: item.name.clone(),
                cost,
                timing: now.hours(),
            });
            self.total += cost;
            event_cost += cost;
        }

        info!(event = %event.name, time = %now, cost = event_cost, "capital cost event");
        event_cost
    }

    fn item_cost(&mut self, event: &ScheduledEvent, item: &CostItem, now: SimTime) -> f64 {
        let mut cost = item.fixed_cost;
        for material in item.priced_materials() {
            let Some(commodity) = self.commodities.get(&material.name) else {
                warn!(
                    event = %event.name,
                    item = %item.name,
                    commodity = %material.name,
                    "commodity not found, material costed at 0"
                );
                self.diagnostics.push(CostDiagnostic::UnknownCommodity {
                    event: event.name.clone(),
                    item: item.name.clone(),
                    commodity: material.name.clone(),
                });
                continue;
            };
            let unit_price =
                commodity
                    .price_model()
                    .realize(commodity.base_price, now.years(), &mut self.rng);
            cost += material.mass * unit_price * material.consumption_factor;
        }
        cost
    }

    /// Records in firing order.
    pub fn records(&self) -> &[CostRecord] {
        &self.records
    }

    /// Sum of all record costs.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn events_fired(&self) -> usize {
        self.events_fired
    }

    pub fn diagnostics(&self) -> &[CostDiagnostic] {
        &self.diagnostics
    }

    /// Adds diagnostics produced outside the ledger, e.g. at schedule build.
    pub fn extend_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = CostDiagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Totals per category name.
    pub fn by_category(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for r in &self.records {
            *totals.entry(r.category_name.clone()).or_insert(0.0) += r.cost;
        }
        totals
    }

    /// Totals per event name.
    pub fn by_event(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for r in &self.records {
            *totals.entry(r.event_name.clone()).or_insert(0.0) += r.cost;
        }
        totals
    }
}

/// Scheduler process that fires one cost event and terminates.
#[derive(Debug, Clone)]
pub struct CostEventProcess {
    event: ScheduledEvent,
}

impl CostEventProcess {
    pub fn new(event: ScheduledEvent) -> Self {
        Self { event }
    }
}

impl<W: AsMut<CostLedger>> Process<W> for CostEventProcess {
    fn name(&self) -> &str {
        &self.event.name
    }

    fn resume(&mut self, now: SimTime, world: &mut W) -> Yield {
        world.as_mut().fire(&self.event, now);
        Yield::Done
    }
}

/// Registers every scheduled event as a one-shot process at its trigger time.
pub fn register_cost_events<W, P>(port: &mut P, events: &EventSchedule)
where
    W: AsMut<CostLedger>,
    P: EventPort<W>,
{
    for event in events {
        port.register_at(event.trigger, Box::new(CostEventProcess::new(event.clone())));
    }
}
