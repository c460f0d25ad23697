//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capex::commodity::{Commodity, CommodityTable, PriceKind};
use crate::capex::schedule::{
    CostCategory, CostFile, CostItem, CostSchedule, MaterialUse, Materials, Subcategory,
};
use crate::finex::{FinancingConfig, FinancingInstrument};
use crate::market::forecast::ForecastConfig;
use crate::market::scheme::{SchemeConfig, SupportScheme};
use crate::market::series::Frequency;
use crate::sim::types::HOURS_PER_YEAR;
use crate::valuation::ValuationInputs;

/// Calendar unit of a [`DurationSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[serde(alias = "hour", alias = "h")]
    Hours,
    #[serde(alias = "day", alias = "d")]
    Days,
    /// 30 days.
    #[serde(alias = "month")]
    Months,
    /// 365 days.
    #[serde(alias = "year", alias = "y")]
    Years,
}

impl TimeUnit {
    pub fn hours(self) -> f64 {
        match self {
            Self::Hours => 1.0,
            Self::Days => 24.0,
            Self::Months => 30.0 * 24.0,
            Self::Years => HOURS_PER_YEAR,
        }
    }
}

/// A duration given either as bare hours or as `{ value, unit }`.
///
/// ```toml
/// horizon = 8760
/// horizon = { value = 1, unit = "years" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Hours(f64),
    Value { value: f64, unit: TimeUnit },
}

impl DurationSpec {
    pub fn years(value: f64) -> Self {
        Self::Value {
            value,
            unit: TimeUnit::Years,
        }
    }

    /// Normalized length in hours.
    pub fn to_hours(self) -> f64 {
        match self {
            Self::Hours(h) => h,
            Self::Value { value, unit } => value * unit.hours(),
        }
    }
}

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation horizon, seed and Monte Carlo parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Discount rate for CAPEX.
    #[serde(default)]
    pub financing: FinancingConfig,
    /// Support scheme and price data.
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub valuation: ValuationInputs,
    /// Price forecast; without it the price history is used as is.
    #[serde(default)]
    pub forecast: Option<ForecastConfig>,
    /// Cost files keyed by file key.
    #[serde(default)]
    pub capex: CostSchedule,
    #[serde(default)]
    pub commodity: CommodityTable,
    /// Hourly wind-farm response sampling.
    #[serde(default)]
    pub response: ResponseConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Project horizon; events at or after it never fire.
    pub horizon: DurationSpec,
    /// Master random seed.
    pub seed: u64,
    /// Number of Monte Carlo runs (must be > 0).
    pub runs: usize,
    /// Start of the operations window.
    pub operations_start: DurationSpec,
    /// End of the operations window (inclusive).
    pub operations_end: DurationSpec,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon: DurationSpec::years(30.0),
            seed: 42,
            runs: 1,
            operations_start: DurationSpec::years(3.0),
            operations_end: DurationSpec::years(28.0),
        }
    }
}

/// `[market]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    pub scheme: SupportScheme,
    pub reference_period: Frequency,
    pub payment_frequency: Frequency,
    /// Hourly price CSV (`timestamp,price`).
    pub prices: Option<PathBuf>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        let scheme = SchemeConfig::default();
        Self {
            scheme: SupportScheme::ContractForDifference {
                strike_price: 80.0,
                one_sided: false,
            },
            reference_period: scheme.reference_period,
            payment_frequency: scheme.payment_frequency,
            prices: None,
        }
    }
}

impl MarketConfig {
    pub fn scheme_config(&self) -> SchemeConfig {
        SchemeConfig {
            scheme: self.scheme,
            reference_period: self.reference_period,
            payment_frequency: self.payment_frequency,
        }
    }
}

/// `[response]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResponseConfig {
    /// Register the hourly response loop.
    pub enabled: bool,
    /// Sampling interval.
    pub interval: DurationSpec,
    /// Output (MW) of the built-in constant response model.
    pub constant_mw: f64,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: DurationSpec::Hours(1.0),
            constant_mw: 0.0,
        }
    }
}

/// A single configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.runs"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn fixed_item(name: &str, cost: f64) -> CostItem {
    CostItem::fixed(name, cost)
}

fn material_item(name: &str, fixed_cost: f64, materials: Vec<(&str, f64)>) -> CostItem {
    CostItem {
        name: name.into(),
        fixed_cost,
        uses_material: true,
        materials: Some(Materials::Many(
            materials
                .into_iter()
                .map(|(commodity, mass)| MaterialUse {
                    name: commodity.into(),
                    mass,
                    consumption_factor: 1.0,
                })
                .collect(),
        )),
    }
}

fn subcategory(name: &str, years: f64, items: Vec<CostItem>) -> Subcategory {
    Subcategory {
        name: name.into(),
        trigger_time: Some(DurationSpec::years(years)),
        subsubcategories: items,
    }
}

/// Cost schedule of a 500 MW reference farm.
fn reference_capex() -> CostSchedule {
    let mut schedule = CostSchedule::new();
    schedule.insert(
        "development",
        CostFile {
            cost_categories: Some(vec![CostCategory {
                name: "Development".into(),
                subcategories: vec![subcategory(
                    "Consenting",
                    0.0,
                    vec![
                        fixed_item("Surveys", 12_000_000.0),
                        fixed_item("Permitting", 8_000_000.0),
                    ],
                )],
            }]),
        },
    );
    schedule.insert(
        "construction",
        CostFile {
            cost_categories: Some(vec![
                CostCategory {
                    name: "Turbines".into(),
                    subcategories: vec![subcategory(
                        "Turbine supply",
                        1.0,
                        vec![material_item(
                            "Towers",
                            150_000_000.0,
                            vec![("steel", 60_000.0)],
                        )],
                    )],
                },
                CostCategory {
                    name: "Balance of plant".into(),
                    subcategories: vec![
                        subcategory(
                            "Foundations",
                            1.5,
                            vec![material_item(
                                "Monopiles",
                                40_000_000.0,
                                vec![("steel", 120_000.0)],
                            )],
                        ),
                        subcategory(
                            "Array cables",
                            2.0,
                            vec![material_item(
                                "Cables",
                                25_000_000.0,
                                vec![("copper", 2_500.0), ("steel", 4_000.0)],
                            )],
                        ),
                    ],
                },
            ]),
        },
    );
    schedule
}

fn commodity(name: &str, base_price: f64, model: PriceKind, sigma: f64) -> Commodity {
    Commodity {
        model,
        mu: 0.02,
        sigma,
        lambda_jump: 0.3,
        sigma_jump: 0.15,
        ..Commodity::fixed(name, base_price)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: fixed commodity prices, two-sided CfD.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            financing: FinancingConfig {
                instruments: vec![FinancingInstrument {
                    name: "Debt".into(),
                    interest_rate: 6.0,
                }],
                ..FinancingConfig::default()
            },
            market: MarketConfig::default(),
            valuation: ValuationInputs {
                opex_annual: 40_000_000.0,
                capacity_factor: 0.45,
                ..ValuationInputs::default()
            },
            forecast: Some(ForecastConfig::default()),
            capex: reference_capex(),
            commodity: CommodityTable::from(vec![
                Commodity::fixed("steel", 800.0),
                Commodity::fixed("copper", 8_500.0),
            ]),
            response: ResponseConfig::default(),
        }
    }

    /// Returns the commodity-risk preset: GBM steel, jump-diffusion copper,
    /// Monte Carlo with 50 runs.
    pub fn commodity_risk() -> Self {
        let base = Self::baseline();
        Self {
            simulation: SimulationConfig {
                runs: 50,
                ..base.simulation
            },
            commodity: CommodityTable::from(vec![
                commodity("steel", 800.0, PriceKind::Gbm, 0.2),
                commodity("copper", 8_500.0, PriceKind::JumpDiffusion, 0.3),
            ]),
            ..base
        }
    }

    /// Returns the merchant preset: no support scheme, revenue at the reference price.
    pub fn merchant() -> Self {
        let base = Self::baseline();
        Self {
            market: MarketConfig {
                scheme: SupportScheme::MarketExposed,
                ..base.market
            },
            ..base
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "commodity_risk", "merchant"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "commodity_risk" => Ok(Self::commodity_risk()),
            "merchant" => Ok(Self::merchant()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        let horizon = s.horizon.to_hours();
        if !horizon.is_finite() || horizon <= 0.0 {
            errors.push(ConfigError::new("simulation.horizon", "must be > 0"));
        }
        if s.runs == 0 {
            errors.push(ConfigError::new("simulation.runs", "must be > 0"));
        }
        let (ops_start, ops_end) = (s.operations_start.to_hours(), s.operations_end.to_hours());
        let window_finite = ops_start.is_finite() && ops_end.is_finite();
        if !window_finite || ops_start < 0.0 || ops_start > ops_end {
            errors.push(ConfigError::new(
                "simulation.operations_start",
                "must be >= 0 and <= simulation.operations_end",
            ));
        }

        if let Some(rate) = self.financing.interest_rate_percent {
            if rate.is_nan() || rate <= -100.0 {
                errors.push(ConfigError::new(
                    "financing.interest_rate_percent",
                    "must be > -100",
                ));
            }
        }

        let v = &self.valuation;
        if v.capacity_mw <= 0.0 {
            errors.push(ConfigError::new("valuation.capacity_mw", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&v.capacity_factor) {
            errors.push(ConfigError::new(
                "valuation.capacity_factor",
                "must be in [0.0, 1.0]",
            ));
        }
        if v.discount_rate <= -1.0 {
            errors.push(ConfigError::new("valuation.discount_rate", "must be > -1"));
        }

        if let SupportScheme::Premium {
            cap: Some(cap),
            floor: Some(floor),
            ..
        } = self.market.scheme
        {
            if floor > cap {
                errors.push(ConfigError::new(
                    "market.scheme.floor",
                    "must be <= market.scheme.cap",
                ));
            }
        }

        if let Some(f) = &self.forecast {
            if f.start_year > f.end_year {
                errors.push(ConfigError::new(
                    "forecast.start_year",
                    "must be <= forecast.end_year",
                ));
            }
            if f.reference_quarter.is_some_and(|q| !(1..=4).contains(&q)) {
                errors.push(ConfigError::new(
                    "forecast.reference_quarter",
                    "must be in 1..=4",
                ));
            }
        }

        for (i, c) in self.commodity.iter().enumerate() {
            if c.base_price < 0.0 {
                errors.push(ConfigError::new(
                    format!("commodity[{i}].base_price"),
                    "must be >= 0",
                ));
            }
            if c.sigma < 0.0 || c.sigma_jump < 0.0 || c.lambda_jump < 0.0 {
                errors.push(ConfigError::new(
                    format!("commodity[{i}]"),
                    "sigma, sigma_jump and lambda_jump must be >= 0",
                ));
            }
        }

        let interval = self.response.interval.to_hours();
        if self.response.enabled && (interval.is_nan() || interval <= 0.0) {
            errors.push(ConfigError::new("response.interval", "must be > 0"));
        }

        errors
    }
}
