//! Next-month expense forecasting
//!
//! The pipeline is a single synchronous pass:
//! - `filter` - keep one user's expense records, drop unparseable ones
//! - `aggregate` - sum by calendar month
//! - `model` - fit a single-feature regressor on (month number, total)
//! - classification of the prediction against the historical mean
//!
//! Nothing is cached between runs; the fitted model is dropped when `run`
//! returns.

mod aggregate;
mod filter;
pub mod model;

use tracing::{debug, info};

pub use aggregate::aggregate_monthly;
pub use filter::{filter_records, parse_record_date};
pub use model::{FittedModel, GradientBoostedTrees, LinearRegression, Regressor, Sample};

use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::models::{
    ForecastOutcome, ForecastResult, ForecastStatus, MonthlyAggregate, RawTransaction,
};

/// Message returned to callers when a user has nothing to forecast from
pub const NO_DATA_MESSAGE: &str = "No transactions for analysis";

/// Supplier of raw transaction records
///
/// Implementations return at least every expense record owned by `uid`.
/// Returning extra records is harmless: the pipeline filters again. A record
/// with a malformed date must be returned as-is, not turned into an error.
pub trait TransactionSource {
    fn fetch_expenses(&self, uid: &str) -> Result<Vec<RawTransaction>>;
}

impl TransactionSource for [RawTransaction] {
    fn fetch_expenses(&self, _uid: &str) -> Result<Vec<RawTransaction>> {
        Ok(self.to_vec())
    }
}

impl TransactionSource for Vec<RawTransaction> {
    fn fetch_expenses(&self, uid: &str) -> Result<Vec<RawTransaction>> {
        self.as_slice().fetch_expenses(uid)
    }
}

/// Month number following `max_ordinal`, wrapping December to January
pub fn next_month_ordinal(max_ordinal: u32) -> u32 {
    max_ordinal % 12 + 1
}

/// Arithmetic mean of the monthly totals
pub fn historical_mean(aggregates: &[MonthlyAggregate]) -> f64 {
    aggregates.iter().map(|a| a.total).sum::<f64>() / aggregates.len() as f64
}

/// Round to two decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stable unless the prediction exceeds the mean; a tie is stable
pub fn classify(prediction: f64, mean: f64) -> ForecastStatus {
    if prediction <= mean {
        ForecastStatus::Stable
    } else {
        ForecastStatus::HigherExpense
    }
}

/// Forecast pipeline bound to one regressor configuration
pub struct ForecastPipeline {
    regressor: Box<dyn Regressor>,
}

impl ForecastPipeline {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            regressor: model::regressor_for(config),
        }
    }

    /// Use a specific regressor
    pub fn with_regressor(regressor: Box<dyn Regressor>) -> Self {
        Self { regressor }
    }

    pub fn regressor_name(&self) -> &'static str {
        self.regressor.name()
    }

    /// Fetch a user's records from `source` and forecast
    pub fn forecast_for_user(
        &self,
        source: &dyn TransactionSource,
        uid: &str,
    ) -> Result<ForecastOutcome> {
        let raw = source.fetch_expenses(uid)?;
        self.run(&raw, uid)
    }

    /// Forecast from an already-fetched record list
    pub fn run(&self, raw: &[RawTransaction], uid: &str) -> Result<ForecastOutcome> {
        let records = filter_records(raw, uid);
        debug!(uid, fetched = raw.len(), kept = records.len(), "Filtered records");

        let Some(aggregates) = aggregate_monthly(&records) else {
            info!(uid, "No expense records to forecast from");
            return Ok(ForecastOutcome::NoData);
        };
        debug!(uid, months = aggregates.len(), "Aggregated monthly totals");

        let result = self.forecast_aggregates(&aggregates)?;
        info!(
            uid,
            model = self.regressor.name(),
            next_month = result.next_month,
            prediction = result.prediction,
            mean = result.mean,
            status = %result.status,
            "Forecast complete"
        );

        Ok(ForecastOutcome::Forecast(result))
    }

    /// Fit on non-empty monthly aggregates and predict the following month
    pub fn forecast_aggregates(&self, aggregates: &[MonthlyAggregate]) -> Result<ForecastResult> {
        let max_ordinal = aggregates
            .iter()
            .map(|a| a.month_ordinal)
            .max()
            .ok_or_else(|| Error::Model("no monthly aggregates to fit".into()))?;

        let samples: Vec<Sample> = aggregates
            .iter()
            .map(|a| Sample::new(f64::from(a.month_ordinal), a.total))
            .collect();

        let fitted = self.regressor.fit(&samples)?;

        let next_month = next_month_ordinal(max_ordinal);
        let raw_prediction = fitted.predict(f64::from(next_month));
        if !raw_prediction.is_finite() {
            return Err(Error::Model(format!(
                "{} produced a non-finite prediction",
                self.regressor.name()
            )));
        }

        let prediction = round2(raw_prediction);
        let mean = round2(historical_mean(aggregates));

        Ok(ForecastResult {
            next_month,
            prediction,
            mean,
            status: classify(prediction, mean),
        })
    }
}

impl Default for ForecastPipeline {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}
