//! Event schedule built from the nested cost schedule.

use std::collections::BTreeSet;

use tracing::{info, warn};

use super::event::ScheduledEvent;
use super::types::SimTime;
use crate::capex::CostDiagnostic;
use crate::capex::schedule::CostSchedule;

/// One-shot cost events in declaration order.
///
/// Declaration order becomes registration order, which decides firing
/// order among events sharing a trigger time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSchedule {
    events: Vec<ScheduledEvent>,
}

impl EventSchedule {
    /// Builds one event per subcategory that declares a trigger time.
    ///
    /// # Returns
    ///
    /// The schedule plus diagnostics for entries that were skipped: files
    /// without `cost_categories`, invalid trigger times, and duplicate keys.
    /// Only the first declaration of a key is considered, even when it has no
    /// trigger time and a later repeat does.
    pub fn from_cost_schedule(schedule: &CostSchedule) -> (Self, Vec<CostDiagnostic>) {
        let mut diagnostics = Vec::new();
        for (file_key, file) in schedule.files() {
            if file.cost_categories.is_none() {
                warn!(file = file_key, "cost file has no cost_categories, skipped");
                diagnostics.push(CostDiagnostic::MissingCostCategories {
                    file: file_key.to_string(),
                });
            }
        }

        let mut seen = BTreeSet::new();
        let mut events = Vec::new();
        for (key, _, sub) in schedule.subcategories() {
            // First declaration owns the key, as in `CostSchedule::find`.
            if !seen.insert(key.clone()) {
                warn!(%key, "duplicate subcategory key, later declaration ignored");
                diagnostics.push(CostDiagnostic::DuplicateEvent {
                    key: key.to_string(),
                });
                continue;
            }
            let Some(trigger) = sub.trigger_time else {
                info!(%key, "no trigger time, subcategory not scheduled");
                continue;
            };
            let hours = trigger.to_hours();
            if !hours.is_finite() || hours < 0.0 {
                warn!(%key, hours, "invalid trigger time, subcategory not scheduled");
                diagnostics.push(CostDiagnostic::InvalidTrigger {
                    key: key.to_string(),
                    hours,
                });
                continue;
            }
            events.push(ScheduledEvent::new(SimTime::from_hours(hours), key));
        }

        (Self { events }, diagnostics)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Latest trigger time, if any event is scheduled.
    pub fn last_trigger(&self) -> Option<SimTime> {
        self.events.iter().map(|e| e.trigger).max()
    }
}

impl<'a> IntoIterator for &'a EventSchedule {
    type Item = &'a ScheduledEvent;
    type IntoIter = std::slice::Iter<'a, ScheduledEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> CostSchedule {
        toml::from_str(toml).unwrap_or_default()
    }

    #[test]
    fn one_event_per_triggered_subcategory() {
        let schedule = parse(
            r#"
[f]
[[f.cost_categories]]
name = "Cat"
[[f.cost_categories.subcategories]]
name = "Early"
trigger_time = 0
[[f.cost_categories.subcategories]]
name = "Unscheduled"
[[f.cost_categories.subcategories]]
name = "Late"
trigger_time = { value = 2, unit = "days" }
"#,
        );
        let (events, diagnostics) = EventSchedule::from_cost_schedule(&schedule);
        assert!(diagnostics.is_empty());
        let names: Vec<(&str, f64)> = events
            .iter()
            .map(|e| (e.name.as_str(), e.trigger.hours()))
            .collect();
        assert_eq!(names, vec![("Early_event", 0.0), ("Late_event", 48.0)]);
        assert_eq!(events.last_trigger(), Some(SimTime::from_hours(48.0)));
    }

    #[test]
    fn missing_categories_and_duplicates_are_diagnosed() {
        let schedule = parse(
            r#"
[empty]

[f]
[[f.cost_categories]]
name = "Cat"
[[f.cost_categories.subcategories]]
name = "Twice"
trigger_time = 1
[[f.cost_categories.subcategories]]
name = "Twice"
trigger_time = 5
[[f.cost_categories.subcategories]]
name = "Negative"
trigger_time = -3
"#,
        );
        let (events, diagnostics) = EventSchedule::from_cost_schedule(&schedule);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            diagnostics[0],
            CostDiagnostic::MissingCostCategories { .. }
        ));
        assert!(
            diagnostics
                .iter()
                .any(|d| matches!(d, CostDiagnostic::DuplicateEvent { .. }))
        );
        assert!(
            diagnostics
                .iter()
                .any(|d| matches!(d, CostDiagnostic::InvalidTrigger { .. }))
        );
    }

    #[test]
    fn untriggered_first_declaration_owns_duplicate_key() {
        let schedule = parse(
            r#"
[f]
[[f.cost_categories]]
name = "Cat"
[[f.cost_categories.subcategories]]
name = "Dup"
[[f.cost_categories.subcategories.subsubcategories]]
name = "untriggered item"
fixed_cost = 1.0
[[f.cost_categories.subcategories]]
name = "Dup"
trigger_time = 0
[[f.cost_categories.subcategories.subsubcategories]]
name = "triggered item"
fixed_cost = 1000.0
"#,
        );
        let (events, diagnostics) = EventSchedule::from_cost_schedule(&schedule);
        assert!(events.is_empty());
        assert!(matches!(
            diagnostics.as_slice(),
            [CostDiagnostic::DuplicateEvent { key }] if key == "f/Cat/Dup"
        ));
    }

    #[test]
    fn empty_schedule_has_no_events() {
        let (events, diagnostics) = EventSchedule::from_cost_schedule(&CostSchedule::new());
        assert!(events.is_empty());
        assert!(diagnostics.is_empty());
        assert_eq!(events.last_trigger(), None);
    }
}
