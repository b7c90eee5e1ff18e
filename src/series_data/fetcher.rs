use crate::config::HistoryWindow;
use crate::forecaster::LatLon;
use crate::series_data::error::FetchError;
use crate::series_data::transport::{BearerToken, Transport};
use crate::types::time_series::RawSeriesResponse;
use crate::types::tracked_variable::TrackedVariable;
use futures_util::future::join_all;
use log::{info, warn};

const TOKEN_HEADER: &str = "authorizationtoken";

/// Issues one provider query per tracked variable.
pub struct VariableFetcher<'a> {
    transport: &'a dyn Transport,
    timeseries_url: &'a str,
    dataset_prefix: &'a str,
}

impl<'a> VariableFetcher<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        timeseries_url: &'a str,
        dataset_prefix: &'a str,
    ) -> Self {
        Self {
            transport,
            timeseries_url,
            dataset_prefix,
        }
    }

    fn query_params(
        &self,
        variable: TrackedVariable,
        location: LatLon,
        window: &HistoryWindow,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("data", variable.provider_code(self.dataset_prefix)),
            ("location", location.to_string()),
            ("time", window.query_param()),
        ]
    }

    /// Fetches the raw series text for one variable with an already-acquired token.
    pub async fn fetch(
        &self,
        variable: TrackedVariable,
        location: LatLon,
        window: &HistoryWindow,
        token: &BearerToken,
    ) -> Result<RawSeriesResponse, FetchError> {
        let params = self.query_params(variable, location, window);
        let headers = [(TOKEN_HEADER, token.as_str().to_string())];
        info!("Querying {} for {}", variable, location);

        let body = self
            .transport
            .query(self.timeseries_url, &params, &headers)
            .await
            .map_err(|source| FetchError::Transport { variable, source })?;
        Ok(RawSeriesResponse::new(variable, body))
    }

    /// Fetches all six variables concurrently under a single token.
    ///
    /// If the token cannot be obtained no query is issued and every variable gets
    /// the same authentication-failure sentinel.
    pub async fn fetch_all(
        &self,
        location: LatLon,
        window: &HistoryWindow,
    ) -> Vec<(TrackedVariable, Result<RawSeriesResponse, FetchError>)> {
        let token = match self.transport.get_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to obtain authentication token: {}", e);
                let message = e.to_string();
                return TrackedVariable::ALL
                    .iter()
                    .map(|variable| (*variable, Err(FetchError::Auth(message.clone()))))
                    .collect();
            }
        };

        let requests = TrackedVariable::ALL.iter().map(|variable| {
            let token = &token;
            async move {
                let result = self.fetch(*variable, location, window, token).await;
                if let Err(e) = &result {
                    warn!("{}", e);
                }
                (*variable, result)
            }
        });
        join_all(requests).await
    }
}
