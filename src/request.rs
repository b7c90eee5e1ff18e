//! Validation of the caller-facing forecast request.

use crate::forecaster::LatLon;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Format of the caller's combined date and time, minute precision.
pub const REQUEST_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("Missing parameters: latitude, longitude or datetime")]
    MissingParameters,

    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Invalid datetime '{0}', expected YYYY-MM-DDTHH:MM")]
    InvalidDatetime(String),
}

/// A validated (location, timestamp) query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub location: LatLon,
    pub datetime: NaiveDateTime,
}

impl ForecastRequest {
    /// Validates coordinates and parses a `YYYY-MM-DDTHH:MM` datetime.
    ///
    /// # Examples
    ///
    /// ```
    /// use parade_forecast::ForecastRequest;
    ///
    /// let request = ForecastRequest::new(-23.55, -46.63, "2025-10-05T14:30").unwrap();
    /// assert_eq!(request.datetime.to_string(), "2025-10-05 14:30:00");
    /// assert!(ForecastRequest::new(-23.55, -46.63, "05/10/2025").is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64, datetime: &str) -> Result<Self, RequestError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(RequestError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(RequestError::LongitudeOutOfRange(longitude));
        }
        let datetime = NaiveDateTime::parse_from_str(datetime.trim(), REQUEST_DATETIME_FORMAT)
            .map_err(|_| RequestError::InvalidDatetime(datetime.to_string()))?;
        Ok(Self {
            location: LatLon(latitude, longitude),
            datetime,
        })
    }

    /// Like [`ForecastRequest::new`] for inputs that may be absent, as decoded from a
    /// loosely typed payload.
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
        datetime: Option<&str>,
    ) -> Result<Self, RequestError> {
        match (latitude, longitude, datetime) {
            (Some(lat), Some(lon), Some(datetime)) if !datetime.trim().is_empty() => {
                Self::new(lat, lon, datetime)
            }
            _ => Err(RequestError::MissingParameters),
        }
    }
}
