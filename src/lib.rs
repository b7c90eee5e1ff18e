mod config;
mod derivation;
mod error;
mod forecaster;
mod model;
mod request;
mod series_data;
mod types;
mod utils;

pub use error::ForecastError;
pub use forecaster::*;

pub use config::{
    ForecastConfig, HistoryWindow, DEFAULT_DATASET_PREFIX, DEFAULT_SIGNIN_URL,
    DEFAULT_TIMESERIES_URL,
};
pub use derivation::{
    celsius_from_fahrenheit, celsius_from_kelvin, derive, derive_weather, fahrenheit_from_celsius,
    rain_chance, relative_humidity, DerivationConstants,
};
pub use request::{ForecastRequest, RequestError, REQUEST_DATETIME_FORMAT};
pub use utils::snap_to_three_hours;

pub use types::forecast_point::*;
pub use types::into_utc_trait::IntoUtcDateTime;
pub use types::time_series::*;
pub use types::tracked_variable::TrackedVariable;
pub use types::weather_report::WeatherReport;

pub use series_data::fetcher::VariableFetcher;
pub use series_data::parser::{parse, METADATA_LINES};
pub use series_data::transport::*;

pub use model::additive::{AdditiveModel, ModelConfig, Prediction};
pub use model::point_forecaster::forecast;

pub use model::error::InsufficientDataError;
pub use series_data::error::{AuthError, FetchError, ParseError, TransportError};
