//! Commodity table: base prices and price-model parameters per material.

use serde::{Deserialize, Serialize};

use super::price::PriceModel;

/// Price process selector of a commodity entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    #[default]
    Fixed,
    Gbm,
    JumpDiffusion,
}

/// One `[[commodity]]` entry.
///
/// Parameters not used by the selected model are ignored; all of them
/// default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Commodity {
    /// Name referenced by material uses.
    pub name: String,
    /// Price per unit mass at project start.
    #[serde(alias = "material_cost")]
    pub base_price: f64,
    #[serde(default)]
    pub model: PriceKind,
    /// Annual drift.
    #[serde(default)]
    pub mu: f64,
    /// Annual volatility.
    #[serde(default)]
    pub sigma: f64,
    /// Expected jumps per year.
    #[serde(default)]
    pub lambda_jump: f64,
    /// Standard deviation of the log jump size.
    #[serde(default)]
    pub sigma_jump: f64,
}

impl Commodity {
    /// Creates a commodity whose price never moves.
    pub fn fixed(name: impl Into<String>, base_price: f64) -> Self {
        Self {
            name: name.into(),
            base_price,
            model: PriceKind::Fixed,
            mu: 0.0,
            sigma: 0.0,
            lambda_jump: 0.0,
            sigma_jump: 0.0,
        }
    }

    /// The price process described by this entry.
    pub fn price_model(&self) -> PriceModel {
        match self.model {
            PriceKind::Fixed => PriceModel::Fixed,
            PriceKind::Gbm => PriceModel::Gbm {
                mu: self.mu,
                sigma: self.sigma,
            },
            PriceKind::JumpDiffusion => PriceModel::JumpDiffusion {
                mu: self.mu,
                sigma: self.sigma,
                lambda_jump: self.lambda_jump,
                sigma_jump: self.sigma_jump,
            },
        }
    }
}

/// Ordered list of commodities looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommodityTable(Vec<Commodity>);

impl CommodityTable {
    pub fn new(commodities: Vec<Commodity>) -> Self {
        Self(commodities)
    }

    /// First commodity with the given name.
    pub fn get(&self, name: &str) -> Option<&Commodity> {
        self.0.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Commodity> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every commodity uses the fixed model, so realized costs
    /// do not depend on the random stream.
    pub fn is_deterministic(&self) -> bool {
        self.0.iter().all(|c| c.model == PriceKind::Fixed)
    }
}

impl From<Vec<Commodity>> for CommodityTable {
    fn from(commodities: Vec<Commodity>) -> Self {
        Self(commodities)
    }
}
