use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::SimTime;

/// Fully-qualified identity of a cost subcategory: `file/category/subcategory`.
///
/// Two subcategories with the same name in different files or categories
/// get distinct keys and therefore distinct events.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey {
    file: String,
    category: String,
    subcategory: String,
}

impl EventKey {
    pub fn new(
        file: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    /// Display name recorded in the ledger, `<subcategory>_event`.
    pub fn event_name(&self) -> String {
        format!("{}_event", self.subcategory)
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.file, self.category, self.subcategory)
    }
}

/// A one-shot cost event, created at schedule-build time and fired once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Simulated time at which the event fires.
    pub trigger: SimTime,
    pub key: EventKey,
    /// Display name, `<subcategory>_event`.
    pub name: String,
}

impl ScheduledEvent {
    /// Creates an event for `key` firing at `trigger`.
    pub fn new(trigger: SimTime, key: EventKey) -> Self {
        let name = key.event_name();
        Self { trigger, key, name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_is_qualified() {
        let key = EventKey::new("installation", "Foundations", "Monopiles");
        assert_eq!(key.to_string(), "installation/Foundations/Monopiles");
        assert_eq!(key.event_name(), "Monopiles_event");
    }

    #[test]
    fn same_subcategory_in_other_file_is_distinct() {
        let a = EventKey::new("a", "Cat", "Sub");
        let b = EventKey::new("b", "Cat", "Sub");
        assert_ne!(a, b);
        assert_eq!(a.event_name(), b.event_name());
    }

    #[test]
    fn event_carries_display_name() {
        let event = ScheduledEvent::new(
            SimTime::from_hours(8760.0),
            EventKey::new("f", "c", "Cables"),
        );
        assert_eq!(event.name, "Cables_event");
        assert_eq!(event.trigger.years(), 1.0);
    }
}
