//! This module provides the main entry point of the crate: the [`Forecaster`],
//! which turns a location and a timestamp into a [`WeatherReport`].
//!
//! Each request fetches the full history of six GLDAS variables, fits one
//! additive model per variable, predicts at the requested 3-hour slot and
//! derives the report from the six estimates. Either all six succeed or the
//! request fails as a whole.

use crate::config::ForecastConfig;
use crate::derivation::derive;
use crate::error::ForecastError;
use crate::model::additive::ModelConfig;
use crate::model::point_forecaster;
use crate::request::ForecastRequest;
use crate::series_data::error::FetchError;
use crate::series_data::fetcher::VariableFetcher;
use crate::series_data::parser;
use crate::series_data::transport::{Credentials, EarthdataTransport, Transport};
use crate::types::forecast_point::{FailureStage, ForecastPoint, ForecastValues};
use crate::types::into_utc_trait::IntoUtcDateTime;
use crate::types::time_series::RawSeriesResponse;
use crate::types::weather_report::WeatherReport;
use crate::utils::snap_to_three_hours;
use bon::bon;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures_util::future::join_all;
use log::{info, warn};
use std::fmt;
use std::sync::Arc;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use parade_forecast::LatLon;
///
/// let sao_paulo = LatLon(-23.55, -46.63);
/// assert_eq!(sao_paulo.0, -23.55); // Latitude
/// assert_eq!(sao_paulo.1, -46.63); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.0, self.1)
    }
}

/// Produces single-timestamp weather reports from provider time series.
///
/// The forecaster holds no per-request state; the transport is asked for a fresh
/// token on every request.
///
/// # Examples
///
/// ```no_run
/// # use parade_forecast::{ForecastConfig, ForecastError, Forecaster, LatLon};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), ForecastError> {
/// let forecaster = Forecaster::from_env(ForecastConfig::default())?;
/// let at = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap().and_hms_opt(20, 15, 0).unwrap();
///
/// let report = forecaster
///     .forecast()
///     .location(LatLon(-23.55, -46.63))
///     .at(at)
///     .call()
///     .await?;
/// println!("{:.1} °C, rain score {}", report.temperature_c, report.rain_chance);
/// # Ok(())
/// # }
/// ```
pub struct Forecaster {
    transport: Arc<dyn Transport>,
    config: ForecastConfig,
}

#[bon]
impl Forecaster {
    /// Creates a forecaster over any [`Transport`].
    pub fn new(transport: Arc<dyn Transport>, config: ForecastConfig) -> Self {
        Self { transport, config }
    }

    /// Creates a forecaster talking to NASA Earthdata, with credentials read from
    /// `EARTHDATA_USERNAME` and `EARTHDATA_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Auth`] if either variable is unset.
    pub fn from_env(config: ForecastConfig) -> Result<Self, ForecastError> {
        let credentials = Credentials::from_env()?;
        let transport = EarthdataTransport::new(config.signin_url.clone(), credentials)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecasts the weather at `location` for the 3-hour slot nearest to `at`.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** Point to forecast for.
    /// * `.at(NaiveDateTime)`: **Required.** Requested time (UTC). The hour is
    ///   rounded to the nearest multiple of 3 (mod 24) and the date kept as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Aggregate`] if any of the six variables could not be
    /// fetched, parsed or forecast. No partial report is ever returned.
    #[builder]
    pub async fn forecast(
        &self,
        location: LatLon,
        at: NaiveDateTime,
    ) -> Result<WeatherReport, ForecastError> {
        let target = Self::target_for(at);
        info!("Forecasting {} at {} (requested {})", location, target, at);

        let points = self.forecast_points(location, target).await;
        let values = ForecastValues::from_points(&points).map_err(|unavailable| {
            warn!(
                "Forecast for {} at {} incomplete: {} variable(s) unavailable",
                location,
                target,
                unavailable.len()
            );
            ForecastError::Aggregate { unavailable }
        })?;
        Ok(derive(&values, &self.config.derivation))
    }

    /// Forecasts for a date and a time of day.
    pub async fn run(
        &self,
        latitude: f64,
        longitude: f64,
        target_date: NaiveDate,
        target_time: NaiveTime,
    ) -> Result<WeatherReport, ForecastError> {
        self.forecast()
            .location(LatLon(latitude, longitude))
            .at(target_date.and_time(target_time))
            .call()
            .await
    }

    /// Forecasts for an already validated caller request.
    pub async fn forecast_request(
        &self,
        request: &ForecastRequest,
    ) -> Result<WeatherReport, ForecastError> {
        self.forecast()
            .location(request.location)
            .at(request.datetime)
            .call()
            .await
    }

    /// The forecast horizon used for a requested time.
    pub fn target_for(at: NaiveDateTime) -> DateTime<Utc> {
        snap_to_three_hours(at).into_utc()
    }

    /// Runs fetch, parse and forecast for all six variables.
    ///
    /// Returns one point per tracked variable, in fixed variable order. Failures
    /// are reported as unavailable points rather than errors.
    pub async fn forecast_points(
        &self,
        location: LatLon,
        target: DateTime<Utc>,
    ) -> Vec<ForecastPoint> {
        let window = self.config.history_window();
        let fetcher = VariableFetcher::new(
            self.transport.as_ref(),
            &self.config.timeseries_url,
            &self.config.dataset_prefix,
        );
        let fetched = fetcher.fetch_all(location, &window).await;

        let tasks = fetched.into_iter().map(|(variable, result)| {
            let model = self.config.model;
            async move {
                let raw = match result {
                    Ok(raw) => raw,
                    Err(e) => {
                        return ForecastPoint::unavailable(
                            variable,
                            target,
                            fetch_stage(&e),
                            e.to_string(),
                        )
                    }
                };
                tokio::task::spawn_blocking(move || parse_and_forecast(raw, target, &model))
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Forecast task for {} failed: {}", variable, e);
                        ForecastPoint::unavailable(
                            variable,
                            target,
                            FailureStage::Forecast,
                            format!("forecast task failed: {}", e),
                        )
                    })
            }
        });
        join_all(tasks).await
    }
}

fn fetch_stage(error: &FetchError) -> FailureStage {
    match error {
        FetchError::Auth(_) => FailureStage::Auth,
        FetchError::Transport { .. } => FailureStage::Transport,
    }
}

fn parse_and_forecast(
    raw: RawSeriesResponse,
    target: DateTime<Utc>,
    model: &ModelConfig,
) -> ForecastPoint {
    let variable = raw.variable;
    match parser::parse(raw) {
        Ok((_, series)) => point_forecaster::forecast(&series, target, model),
        Err(e) => {
            warn!("Failed to process response for {}: {}", variable, e);
            ForecastPoint::unavailable(variable, target, FailureStage::Parse, e.to_string())
        }
    }
}
