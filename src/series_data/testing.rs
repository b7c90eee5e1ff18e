//! In-memory [`Transport`] for tests.

use crate::series_data::error::{AuthError, TransportError};
use crate::series_data::parser::METADATA_LINES;
use crate::series_data::transport::{BearerToken, Transport};
use crate::types::tracked_variable::TrackedVariable;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A recorded provider query.
#[derive(Debug, Clone)]
pub(crate) struct RecordedQuery {
    pub url: String,
    pub params: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

/// Serves canned bodies keyed by the `data` query parameter.
#[derive(Default)]
pub(crate) struct FakeTransport {
    pub fail_auth: bool,
    bodies: HashMap<String, String>,
    failing: Vec<String>,
    pub token_requests: AtomicUsize,
    pub queries: Mutex<Vec<RecordedQuery>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, code: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(code.into(), body.into());
        self
    }

    pub fn with_failure(mut self, code: impl Into<String>) -> Self {
        self.failing.push(code.into());
        self
    }

    pub fn failing_auth(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    pub fn recorded(&self) -> Vec<RecordedQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_token(&self) -> Result<BearerToken, AuthError> {
        let n = self.token_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth {
            return Err(AuthError::Rejected("invalid credentials".to_string()));
        }
        Ok(BearerToken::new(format!("token-{}", n)))
    }

    async fn query(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<String, TransportError> {
        let to_map = |pairs: &[(&str, String)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>()
        };
        let record = RecordedQuery {
            url: url.to_string(),
            params: to_map(params),
            headers: to_map(headers),
        };
        let code = record.params.get("data").cloned().unwrap_or_default();
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(record);
        }

        if self.failing.contains(&code) {
            return Err(TransportError::Other(format!("connection reset for {}", code)));
        }
        self.bodies
            .get(&code)
            .cloned()
            .ok_or_else(|| TransportError::Other(format!("no body for {}", code)))
    }
}

/// Renders a provider response with a framing byte, a full metadata block and a table.
pub(crate) fn provider_body(param_name: &str, rows: &[(DateTime<Utc>, String)]) -> String {
    let mut lines = vec![
        format!("Title:,Time Series of {}", param_name),
        format!("param_name,{}", param_name),
        "unit,unknown".to_string(),
    ];
    while lines.len() < METADATA_LINES {
        lines.push(String::new());
    }
    let mut body = format!("\u{feff}{}\nTimestamp (UTC),{}\n", lines.join("\n"), param_name);
    for (timestamp, value) in rows {
        body.push_str(&format!("{},{}\n", timestamp.format("%Y-%m-%dT%H:%M:%S"), value));
    }
    body
}

/// Three-hourly rows starting at `start`, with `value(i)` for row `i`.
pub(crate) fn three_hourly_rows(
    start: DateTime<Utc>,
    count: usize,
    value: impl Fn(usize) -> f64,
) -> Vec<(DateTime<Utc>, String)> {
    (0..count)
        .map(|i| (start + Duration::hours(3 * i as i64), value(i).to_string()))
        .collect()
}

/// A transport with a steady, plausible series for every tracked variable.
pub(crate) fn steady_transport(prefix: &str, start: DateTime<Utc>, count: usize) -> FakeTransport {
    let level = |variable: TrackedVariable| match variable {
        TrackedVariable::Temperature => 300.0,
        TrackedVariable::Humidity => 0.01,
        TrackedVariable::RainRate => 0.0002,
        TrackedVariable::SnowRate => 0.0,
        TrackedVariable::WindSpeed => 3.0,
        TrackedVariable::Pressure => 101_300.0,
    };
    TrackedVariable::ALL
        .iter()
        .fold(FakeTransport::new(), |transport, variable| {
            let name = variable.code_suffix().trim_start_matches('_');
            let rows = three_hourly_rows(start, count, |_| level(*variable));
            transport.with_body(variable.provider_code(prefix), provider_body(name, &rows))
        })
}
