//! Revenue support schemes and their per-MWh cashflow formulas.

use serde::{Deserialize, Serialize};

use super::series::Frequency;

/// Support scheme under which the project sells its output.
///
/// Cashflows are per MWh. A positive cashflow is money received by the
/// operator; a two-sided contract for difference pays back when the
/// reference price exceeds the strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SupportScheme {
    /// Feed-in tariff: the strike price regardless of the market.
    #[serde(alias = "FiT")]
    FixedPrice { strike_price: f64 },
    /// Feed-in premium on top of the reference price, optionally bounded.
    #[serde(alias = "FiP")]
    Premium {
        premium: f64,
        #[serde(default)]
        cap: Option<f64>,
        #[serde(default)]
        floor: Option<f64>,
    },
    /// Contract for difference settled against the reference price.
    #[serde(alias = "CfD", alias = "cfd")]
    ContractForDifference {
        strike_price: f64,
        /// When set, only shortfalls below the strike are paid out.
        #[serde(default)]
        one_sided: bool,
    },
    /// No support: the reference price itself.
    MarketExposed,
}

impl SupportScheme {
    /// Cashflow per MWh at the given reference price.
    ///
    /// # Examples
    ///
    /// ```
    /// use owf_appraisal::market::scheme::SupportScheme;
    ///
    /// let cfd = SupportScheme::ContractForDifference { strike_price: 50.0, one_sided: false };
    /// assert_eq!(cfd.cashflow(60.0), -10.0);
    /// ```
    pub fn cashflow(&self, reference: f64) -> f64 {
        match *self {
            Self::FixedPrice { strike_price } => strike_price,
            Self::Premium { premium, cap, floor } => {
                let mut price = reference + premium;
                if let Some(floor) = floor {
                    price = price.max(floor);
                }
                if let Some(cap) = cap {
                    price = price.min(cap);
                }
                price
            }
            Self::ContractForDifference {
                strike_price,
                one_sided,
            } => {
                let diff = strike_price - reference;
                if one_sided { diff.max(0.0) } else { diff }
            }
            Self::MarketExposed => reference,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FixedPrice { .. } => "fixed_price",
            Self::Premium { .. } => "premium",
            Self::ContractForDifference {
                one_sided: true, ..
            } => "cfd_one_sided",
            Self::ContractForDifference { .. } => "cfd_two_sided",
            Self::MarketExposed => "market_exposed",
        }
    }
}

/// Scheme plus the calendar periods used to settle it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeConfig {
    pub scheme: SupportScheme,
    /// Period over which the market price is averaged into the reference price.
    #[serde(default)]
    pub reference_period: Frequency,
    /// Period over which cashflows are summed into payments.
    #[serde(default = "default_payment_frequency")]
    pub payment_frequency: Frequency,
}

fn default_payment_frequency() -> Frequency {
    Frequency::Yearly
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            scheme: SupportScheme::MarketExposed,
            reference_period: Frequency::Monthly,
            payment_frequency: default_payment_frequency(),
        }
    }
}
