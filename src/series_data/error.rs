use crate::types::tracked_variable::TrackedVariable;
use thiserror::Error;

/// Failure to obtain a bearer token. Affects every variable of a request at once.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Earthdata credentials not found in environment variable '{0}'")]
    MissingCredentials(&'static str),

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Sign-in request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Sign-in failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Sign-in returned an empty token")]
    EmptyToken,

    #[error("{0}")]
    Rejected(String),
}

/// Failure of a single provider query.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Why the fetcher could not produce a response for one variable.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Shared sentinel: token acquisition failed, so every variable carries this.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Query for {variable} failed")]
    Transport {
        variable: TrackedVariable,
        #[source]
        source: TransportError,
    },
}

/// A provider response that could not be turned into a time series.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty response for {0}")]
    EmptyResponse(TrackedVariable),

    #[error("No data table found in response for {0}")]
    MissingTable(TrackedVariable),

    #[error("Data table for {variable} has {found} columns, expected at least 2")]
    ColumnCount {
        variable: TrackedVariable,
        found: usize,
    },

    #[error("Parsing error reading data table for {variable}")]
    CsvRead {
        variable: TrackedVariable,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("Unparseable timestamp '{value}' in row {row} for {variable}")]
    Timestamp {
        variable: TrackedVariable,
        row: usize,
        value: String,
    },
}
