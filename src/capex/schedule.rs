//! Nested cost schedule: file → category → subcategory → subsubcategory.
//!
//! Each `[capex.<file_key>]` table of the scenario deserializes into a
//! [`CostFile`]. Field aliases accept the spreadsheet-era names
//! (`project_time_h`, `flag_material_cost`, `material`, `CF`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DurationSpec;
use crate::sim::event::EventKey;

/// All cost files keyed by file key, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostSchedule {
    files: BTreeMap<String, CostFile>,
}

/// One cost file. `cost_categories` may be absent; such files are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostFile {
    #[serde(default)]
    pub cost_categories: Option<Vec<CostCategory>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostCategory {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// A group of cost items triggered together at one project time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subcategory {
    pub name: String,
    /// Project time at which the group's costs are incurred. Without it the
    /// subcategory never fires.
    #[serde(default, alias = "project_time_h")]
    pub trigger_time: Option<DurationSpec>,
    #[serde(default)]
    pub subsubcategories: Vec<CostItem>,
}

/// Leaf cost item (subsubcategory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fixed_cost: f64,
    /// Materials are only priced when this is set.
    #[serde(default, alias = "flag_material_cost")]
    pub uses_material: bool,
    #[serde(default, alias = "material")]
    pub materials: Option<Materials>,
}

/// A single material use or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Materials {
    One(MaterialUse),
    Many(Vec<MaterialUse>),
}

impl Materials {
    pub fn as_slice(&self) -> &[MaterialUse] {
        match self {
            Self::One(m) => std::slice::from_ref(m),
            Self::Many(ms) => ms,
        }
    }
}

/// Quantity of a commodity consumed by a cost item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialUse {
    pub name: String,
    #[serde(default)]
    pub mass: f64,
    #[serde(default = "default_consumption_factor", alias = "CF")]
    pub consumption_factor: f64,
}

fn default_consumption_factor() -> f64 {
    1.0
}

impl CostItem {
    /// Fixed-cost-only item.
    pub fn fixed(name: impl Into<String>, fixed_cost: f64) -> Self {
        Self {
            name: name.into(),
            fixed_cost,
            uses_material: false,
            materials: None,
        }
    }

    /// Material uses that contribute to the cost (empty unless flagged).
    pub fn priced_materials(&self) -> &[MaterialUse] {
        match (&self.materials, self.uses_material) {
            (Some(m), true) => m.as_slice(),
            _ => &[],
        }
    }
}

impl CostSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a cost file.
    pub fn insert(&mut self, file_key: impl Into<String>, file: CostFile) {
        self.files.insert(file_key.into(), file);
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &CostFile)> {
        self.files.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every subcategory in declaration order with its fully-qualified key.
    pub fn subcategories(&self) -> impl Iterator<Item = (EventKey, &CostCategory, &Subcategory)> {
        self.files.iter().flat_map(|(file_key, file)| {
            file.cost_categories
                .iter()
                .flatten()
                .flat_map(move |category| {
                    category.subcategories.iter().map(move |sub| {
                        (
                            EventKey::new(file_key.as_str(), &category.name, &sub.name),
                            category,
                            sub,
                        )
                    })
                })
        })
    }

    /// First subcategory matching `key`.
    pub fn find(&self, key: &EventKey) -> Option<(&CostCategory, &Subcategory)> {
        let categories = self.files.get(key.file())?.cost_categories.as_ref()?;
        categories
            .iter()
            .filter(|c| c.name == key.category())
            .find_map(|c| {
                c.subcategories
                    .iter()
                    .find(|s| s.name == key.subcategory())
                    .map(|s| (c, s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> CostSchedule {
        let parsed: Result<CostSchedule, _> = toml::from_str(toml);
        assert!(parsed.is_ok(), "schedule should parse: {:?}", parsed.err());
        parsed.unwrap_or_default()
    }

    const SAMPLE: &str = r#"
[installation]
[[installation.cost_categories]]
name = "Foundations"

[[installation.cost_categories.subcategories]]
name = "Monopiles"
project_time_h = { value = 1, unit = "years" }

[[installation.cost_categories.subcategories.subsubcategories]]
name = "Steel"
fixed_cost = 10.0
flag_material_cost = true
material = { name = "steel", mass = 2.0, CF = 1.1 }

[[installation.cost_categories.subcategories]]
name = "Survey"

[legacy]
"#;

    #[test]
    fn parses_aliases_and_single_material() {
        let schedule = parse(SAMPLE);
        let key = EventKey::new("installation", "Foundations", "Monopiles");
        let found = schedule.find(&key);
        assert!(found.is_some());
        let sub = found.map(|(_, s)| s);
        assert_eq!(
            sub.and_then(|s| s.trigger_time).map(|d| d.to_hours()),
            Some(8760.0)
        );
        let item = sub.and_then(|s| s.subsubcategories.first());
        let materials = item.map(|i| i.priced_materials()).unwrap_or_default();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].consumption_factor, 1.1);
    }

    #[test]
    fn subcategories_are_qualified_and_ordered() {
        let schedule = parse(SAMPLE);
        let keys: Vec<String> = schedule
            .subcategories()
            .map(|(k, _, _)| k.to_string())
            .collect();
        assert_eq!(
            keys,
            vec!["installation/Foundations/Monopiles", "installation/Foundations/Survey"]
        );
    }

    #[test]
    fn materials_ignored_without_flag() {
        let item = CostItem {
            materials: Some(Materials::Many(vec![MaterialUse {
                name: "steel".into(),
                mass: 1.0,
                consumption_factor: 1.0,
            }])),
            ..CostItem::fixed("x", 0.0)
        };
        assert!(item.priced_materials().is_empty());
    }

    #[test]
    fn consumption_factor_defaults_to_one() {
        let m: Result<MaterialUse, _> = toml::from_str("name = \"steel\"\nmass = 3.0");
        assert_eq!(m.map(|m| m.consumption_factor).ok(), Some(1.0));
    }

    #[test]
    fn unknown_key_not_found() {
        let schedule = parse(SAMPLE);
        assert!(schedule.find(&EventKey::new("legacy", "A", "B")).is_none());
        assert!(schedule.find(&EventKey::new("nope", "A", "B")).is_none());
    }
}
