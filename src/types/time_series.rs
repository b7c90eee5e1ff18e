//! Structured forms of a provider response: the raw payload, its metadata
//! header and the parsed time series.

use crate::types::tracked_variable::TrackedVariable;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Metadata key holding the provider parameter name.
pub(crate) const PARAM_NAME_KEY: &str = "param_name";
/// Column label used when the metadata has no `param_name`.
pub(crate) const FALLBACK_LABEL: &str = "value";

/// Raw text returned by the provider for one variable.
///
/// Owned transiently by the fetcher and consumed once by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeriesResponse {
    pub variable: TrackedVariable,
    pub body: String,
}

impl RawSeriesResponse {
    pub fn new(variable: TrackedVariable, body: impl Into<String>) -> Self {
        Self {
            variable,
            body: body.into(),
        }
    }
}

/// Key/value pairs from the metadata header of a provider response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesMetadata {
    entries: BTreeMap<String, String>,
}

impl SeriesMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The provider parameter name (e.g. `Tair_f_inst`), if the header carried one.
    pub fn param_name(&self) -> Option<&str> {
        self.get(PARAM_NAME_KEY)
    }

    /// Label for the value column: `param_name`, or `"value"` when absent.
    pub fn value_label(&self) -> &str {
        self.param_name().unwrap_or(FALLBACK_LABEL)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One row of a series. `value` is `None` when the cell failed numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Ordered observations of one variable, in the order received.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub variable: TrackedVariable,
    /// Name of the value column.
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn new(
        variable: TrackedVariable,
        label: impl Into<String>,
        points: Vec<SeriesPoint>,
    ) -> Self {
        Self {
            variable,
            label: label.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observations with a finite value, missing cells dropped.
    pub fn valid_points(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.points
            .iter()
            .filter_map(|p| match p.value {
                Some(v) if v.is_finite() => Some((p.timestamp, v)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_label_fallback() {
        let mut metadata = SeriesMetadata::new();
        assert_eq!(metadata.value_label(), "value");
        metadata.insert("param_name", "Tair_f_inst");
        assert_eq!(metadata.value_label(), "Tair_f_inst");
    }

    #[test]
    fn test_valid_points_drops_missing_and_nan() {
        let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2020, 1, 1, 3, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2020, 1, 1, 6, 0, 0).unwrap();
        let series = TimeSeries::new(
            TrackedVariable::WindSpeed,
            "Wind_f_inst",
            vec![
                SeriesPoint { timestamp: t0, value: Some(2.0) },
                SeriesPoint { timestamp: t1, value: None },
                SeriesPoint { timestamp: t2, value: Some(f64::NAN) },
            ],
        );
        assert_eq!(series.len(), 3);
        assert_eq!(series.valid_points(), vec![(t0, 2.0)]);
    }
}
