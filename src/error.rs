use crate::request::RequestError;
use crate::series_data::error::AuthError;
use crate::types::forecast_point::{FailureStage, UnavailableVariable};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// At least one variable could not be forecast, so no report is produced.
    #[error("Forecast failed for one or more variables: {}", describe(.unavailable))]
    Aggregate { unavailable: Vec<UnavailableVariable> },

    #[error(transparent)]
    Request(#[from] RequestError),

    /// The transport could not be set up, e.g. credentials are missing.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ForecastError {
    /// True when the request failed because the provider token could not be obtained.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ForecastError::Aggregate { unavailable } => {
                !unavailable.is_empty()
                    && unavailable.iter().all(|u| u.stage == FailureStage::Auth)
            }
            ForecastError::Auth(_) => true,
            ForecastError::Request(_) => false,
        }
    }
}

fn describe(unavailable: &[UnavailableVariable]) -> String {
    unavailable
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
