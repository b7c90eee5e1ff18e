//! Immutable configuration injected into the [`crate::Forecaster`].

use crate::derivation::DerivationConstants;
use crate::model::additive::ModelConfig;
use bon::Builder;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

pub const DEFAULT_SIGNIN_URL: &str = "https://api.giovanni.earthdata.nasa.gov/signin";
pub const DEFAULT_TIMESERIES_URL: &str = "https://api.giovanni.earthdata.nasa.gov/timeseries";
pub const DEFAULT_DATASET_PREFIX: &str = "GLDAS_NOAH025_3H_2_1";

/// Format of the `time` query parameter endpoints.
pub(crate) const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn default_history_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 9, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// Settings for one forecaster instance.
///
/// # Examples
///
/// ```
/// use parade_forecast::ForecastConfig;
///
/// let config = ForecastConfig::builder()
///     .dataset_prefix("GLDAS_NOAH025_3H_2_1".to_string())
///     .build();
/// assert!(config.timeseries_url.ends_with("/timeseries"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ForecastConfig {
    #[builder(default = DEFAULT_SIGNIN_URL.to_string())]
    pub signin_url: String,
    #[builder(default = DEFAULT_TIMESERIES_URL.to_string())]
    pub timeseries_url: String,
    #[builder(default = DEFAULT_DATASET_PREFIX.to_string())]
    pub dataset_prefix: String,
    /// First timestamp of the historical window fetched for every variable.
    #[builder(default = default_history_start())]
    pub history_start: NaiveDateTime,
    #[builder(default)]
    pub model: ModelConfig,
    #[builder(default)]
    pub derivation: DerivationConstants,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ForecastConfig {
    /// The historical window for a request made now: from `history_start` to the end
    /// of the current UTC day.
    pub fn history_window(&self) -> HistoryWindow {
        let end = Utc::now()
            .date_naive()
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| Utc::now().naive_utc());
        HistoryWindow {
            start: self.history_start,
            end,
        }
    }
}

/// Time range of the history queried from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl HistoryWindow {
    /// `start/end` as expected by the provider's `time` parameter.
    pub fn query_param(&self) -> String {
        format!(
            "{}/{}",
            self.start.format(QUERY_TIME_FORMAT),
            self.end.format(QUERY_TIME_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_defaults() {
        let config = ForecastConfig::default();
        assert_eq!(config.dataset_prefix, "GLDAS_NOAH025_3H_2_1");
        assert_eq!(config.history_start.to_string(), "2000-09-01 00:00:00");
        assert_eq!(config.derivation.humidity_weight, 0.5);
    }

    #[test]
    fn test_history_window_ends_today() {
        let window = ForecastConfig::default().history_window();
        assert_eq!(window.end.hour(), 23);
        assert_eq!(window.end.minute(), 59);
        assert!(window.query_param().starts_with("2000-09-01T00:00:00/"));
        assert!(window.query_param().ends_with("T23:59:59"));
    }
}
