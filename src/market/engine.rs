//! Reduces a market price series to support-scheme cashflows.

use tracing::debug;

use super::MarketError;
use super::scheme::SchemeConfig;
use super::series::TimeSeries;

/// Computes per-MWh cashflows under a [`SchemeConfig`].
///
/// The pipeline is: reference price (period mean at native resolution),
/// scheme formula per native point, then summation into payment periods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketCashflowEngine {
    config: SchemeConfig,
}

impl MarketCashflowEngine {
    pub fn new(config: SchemeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// Market price averaged over the reference period, at native resolution.
    pub fn reference_prices(&self, market: &TimeSeries) -> TimeSeries {
        market.period_mean(self.config.reference_period)
    }

    /// Scheme cashflow per MWh for every native timestamp.
    pub fn unit_cashflows(&self, market: &TimeSeries) -> TimeSeries {
        let scheme = self.config.scheme;
        self.reference_prices(market)
            .map(|reference| scheme.cashflow(reference))
    }

    /// Cashflows summed into payment periods, stamped at each period start.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::EmptySeries`] for an empty price series.
    pub fn cashflows(&self, market: &TimeSeries) -> Result<TimeSeries, MarketError> {
        if market.is_empty() {
            return Err(MarketError::EmptySeries);
        }
        let payments = self
            .unit_cashflows(market)
            .resample_sum(self.config.payment_frequency);
        debug!(
            scheme = self.config.scheme.label(),
            reference = %self.config.reference_period,
            payment = %self.config.payment_frequency,
            periods = payments.len(),
            "market cashflows computed"
        );
        Ok(payments)
    }

    /// Cashflow per MW of capacity for each calendar year, in year order.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::EmptySeries`] for an empty price series.
    pub fn annual_cashflows(&self, market: &TimeSeries) -> Result<Vec<(i32, f64)>, MarketError> {
        Ok(self.cashflows(market)?.yearly_totals())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::scheme::SupportScheme;
    use crate::market::series::Frequency;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid start")
    }

    fn engine(scheme: SupportScheme, reference: Frequency, payment: Frequency) -> MarketCashflowEngine {
        MarketCashflowEngine::new(SchemeConfig {
            scheme,
            reference_period: reference,
            payment_frequency: payment,
        })
    }

    #[test]
    fn empty_series_is_an_error() {
        let e = engine(SupportScheme::MarketExposed, Frequency::Daily, Frequency::Daily);
        assert!(matches!(
            e.cashflows(&TimeSeries::default()),
            Err(MarketError::EmptySeries)
        ));
    }

    #[test]
    fn reference_uses_period_mean() {
        // hours alternate 30/50: the daily mean is 40 and a one-sided CfD at 45
        // pays 5 every hour even though half the hourly prices are above strike
        let values: Vec<f64> = (0..24).map(|h| if h % 2 == 0 { 30.0 } else { 50.0 }).collect();
        let market = TimeSeries::hourly(start(), &values);
        let e = engine(
            SupportScheme::ContractForDifference {
                strike_price: 45.0,
                one_sided: true,
            },
            Frequency::Daily,
            Frequency::Daily,
        );
        let payments = e.cashflows(&market).unwrap_or_default();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments.points()[0].value, 24.0 * 5.0);
    }

    #[test]
    fn hourly_reference_differs_from_period_reference() {
        let values: Vec<f64> = (0..24).map(|h| if h % 2 == 0 { 30.0 } else { 50.0 }).collect();
        let market = TimeSeries::hourly(start(), &values);
        let e = engine(
            SupportScheme::ContractForDifference {
                strike_price: 45.0,
                one_sided: true,
            },
            Frequency::Hourly,
            Frequency::Daily,
        );
        let total = e.cashflows(&market).map(|s| s.total()).unwrap_or_default();
        assert_eq!(total, 12.0 * 15.0);
    }

    #[test]
    fn payments_split_by_month() {
        let hours_jan = 31 * 24;
        let values = vec![10.0; hours_jan + 24];
        let market = TimeSeries::hourly(start(), &values);
        let e = engine(SupportScheme::MarketExposed, Frequency::Monthly, Frequency::Monthly);
        let payments = e.cashflows(&market).unwrap_or_default();
        let totals: Vec<f64> = payments.values().collect();
        assert_eq!(totals, vec![hours_jan as f64 * 10.0, 240.0]);
    }

    #[test]
    fn annual_cashflows_per_year() {
        let market = TimeSeries::hourly(start(), &[40.0; 48]);
        let e = engine(
            SupportScheme::FixedPrice { strike_price: 50.0 },
            Frequency::Monthly,
            Frequency::Monthly,
        );
        assert_eq!(e.annual_cashflows(&market).ok(), Some(vec![(2024, 48.0 * 50.0)]));
    }

    proptest! {
        #[test]
        fn one_sided_cfd_payments_never_negative(
            values in prop::collection::vec(-500.0f64..500.0, 1..200),
            strike in 0.0f64..150.0,
        ) {
            let e = engine(
                SupportScheme::ContractForDifference { strike_price: strike, one_sided: true },
                Frequency::Daily,
                Frequency::Monthly,
            );
            let market = TimeSeries::hourly(start(), &values);
            let unit = e.unit_cashflows(&market);
            prop_assert!(unit.values().all(|v| v >= 0.0));
            let payments = e.cashflows(&market);
            prop_assert!(payments.is_ok());
            prop_assert!(payments.unwrap_or_default().values().all(|v| v >= 0.0));
        }
    }
}
