use crate::model::additive::{AdditiveModel, ModelConfig};
use crate::model::error::InsufficientDataError;
use crate::types::forecast_point::{FailureStage, ForecastPoint};
use crate::types::time_series::TimeSeries;
use chrono::{DateTime, Utc};
use log::{info, warn};

/// Forecasts one variable at `target`.
///
/// Never fails: a series that cannot be forecast yields an unavailable point.
pub fn forecast(series: &TimeSeries, target: DateTime<Utc>, config: &ModelConfig) -> ForecastPoint {
    match estimate(series, target, config) {
        Ok(value) => {
            info!("Forecast for {} at {}: {}", series.variable, target, value);
            ForecastPoint::value(series.variable, target, value)
        }
        Err(e) => {
            warn!("No forecast for {} at {}: {}", series.variable, target, e);
            ForecastPoint::unavailable(
                series.variable,
                target,
                FailureStage::Forecast,
                e.to_string(),
            )
        }
    }
}

fn estimate(
    series: &TimeSeries,
    target: DateTime<Utc>,
    config: &ModelConfig,
) -> Result<f64, InsufficientDataError> {
    let observations = series.valid_points();
    if observations.len() < 2 {
        return Err(InsufficientDataError::TooFewPoints {
            found: observations.len(),
        });
    }

    let model = AdditiveModel::fit(&observations, config)?;
    let yhat = model
        .predict(&[target])
        .into_iter()
        .find(|row| row.timestamp == target)
        .ok_or(InsufficientDataError::NoPredictionAt(target))?
        .yhat;

    if yhat.is_finite() {
        Ok(yhat)
    } else {
        Err(InsufficientDataError::NonFiniteEstimate(target))
    }
}
