//! Parses Giovanni time-series CSV responses.
//!
//! A response is one framing character, a metadata block of up to
//! [`METADATA_LINES`] `key,value` lines, then a CSV table whose first two
//! columns are the timestamp and the value.

use crate::series_data::error::ParseError;
use crate::types::into_utc_trait::IntoUtcDateTime;
use crate::types::time_series::{RawSeriesResponse, SeriesMetadata, SeriesPoint, TimeSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use polars::prelude::*;
use std::io::Cursor;

/// Lines read as metadata after the framing character.
pub const METADATA_LINES: usize = 13;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses a provider response into its metadata and time series.
pub fn parse(raw: RawSeriesResponse) -> Result<(SeriesMetadata, TimeSeries), ParseError> {
    let variable = raw.variable;
    let mut chars = raw.body.chars();
    if chars.next().is_none() {
        return Err(ParseError::EmptyResponse(variable));
    }
    let (metadata, table) = split_metadata(chars.as_str());

    let table = skip_blank_lines(table);
    if table.is_empty() {
        return Err(ParseError::MissingTable(variable));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(table.as_bytes().to_vec()))
        .finish()
        .map_err(|source| ParseError::CsvRead { variable, source })?;

    if df.width() < 2 {
        return Err(ParseError::ColumnCount {
            variable,
            found: df.width(),
        });
    }

    let columns = df.get_columns();
    let timestamps = columns[0]
        .str()
        .map_err(|source| ParseError::CsvRead { variable, source })?;
    let values = columns[1]
        .str()
        .map_err(|source| ParseError::CsvRead { variable, source })?;

    let mut points = Vec::with_capacity(df.height());
    for (row, (timestamp, value)) in timestamps.into_iter().zip(values.into_iter()).enumerate() {
        let timestamp = timestamp
            .and_then(parse_timestamp)
            .ok_or_else(|| ParseError::Timestamp {
                variable,
                row,
                value: timestamp.unwrap_or_default().to_string(),
            })?;
        points.push(SeriesPoint {
            timestamp,
            value: value.and_then(parse_value),
        });
    }

    let label = metadata.value_label().to_string();
    debug!("Parsed {} rows of '{}' for {}", points.len(), label, variable);
    Ok((metadata, TimeSeries::new(variable, label, points)))
}

/// Reads the metadata block and returns it together with the remaining text.
///
/// Blank lines count toward the block but are ignored. Lines are split at the first
/// comma; lines without any comma are skipped with a warning.
fn split_metadata(text: &str) -> (SeriesMetadata, &str) {
    let mut metadata = SeriesMetadata::new();
    let mut rest = text;

    for _ in 0..METADATA_LINES {
        if rest.is_empty() {
            break;
        }
        let (line, remainder) = match rest.find('\n') {
            Some(end) => (&rest[..end], &rest[end + 1..]),
            None => (rest, ""),
        };
        rest = remainder;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(',') {
            Some((key, value)) => metadata.insert(key, value.trim()),
            None => warn!("Skipping malformed metadata line: '{}'", line),
        }
    }
    (metadata, rest)
}

fn skip_blank_lines(mut text: &str) -> &str {
    loop {
        match text.find('\n') {
            Some(end) if text[..end].trim().is_empty() => text = &text[end + 1..],
            None if text.trim().is_empty() => return "",
            _ => return text,
        }
    }
}

/// Parses a provider timestamp. Offset-less forms are taken as UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim().trim_matches('"');
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.into_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(IntoUtcDateTime::into_utc)
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(IntoUtcDateTime::into_utc)
        })
}

/// Numeric coercion of a value cell; anything unparseable is missing.
fn parse_value(value: &str) -> Option<f64> {
    value.trim().trim_matches('"').parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tracked_variable::TrackedVariable;
    use chrono::TimeZone;

    /// Builds a response with a framing character, exactly 13 metadata lines and a table.
    fn response(metadata: &[&str], table: &str) -> String {
        let mut lines: Vec<String> = metadata.iter().map(|s| s.to_string()).collect();
        while lines.len() < METADATA_LINES {
            lines.push(String::new());
        }
        format!("\u{feff}{}\n{}", lines.join("\n"), table)
    }

    fn temperature_response() -> String {
        response(
            &[
                "Title:,Time Series, Area-Averaged of Near surface air temperature",
                "param_name,Tair_f_inst",
                "unit,K",
            ],
            "Timestamp (UTC),GLDAS_NOAH025_3H_2_1_Tair_f_inst\n\
             2025-01-01T00:00:00,300.0\n\
             2025-01-01T03:00:00,301.0\n",
        )
    }

    #[test]
    fn test_parse_two_rows_labelled_by_param_name() {
        let raw = RawSeriesResponse::new(TrackedVariable::Temperature, temperature_response());
        let (metadata, series) = parse(raw).unwrap();

        assert_eq!(metadata.param_name(), Some("Tair_f_inst"));
        assert_eq!(metadata.get("unit"), Some("K"));
        assert_eq!(series.label, "Tair_f_inst");
        assert_eq!(series.variable, TrackedVariable::Temperature);
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.points[0].timestamp,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(series.points[0].value, Some(300.0));
        assert_eq!(series.points[1].value, Some(301.0));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let body = temperature_response();
        let raw = RawSeriesResponse::new(TrackedVariable::Temperature, body);
        let (_, first) = parse(raw.clone()).unwrap();
        let (_, second) = parse(raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_metadata_line_is_skipped() {
        let body = response(
            &["param_name,Wind_f_inst", "this line has no comma", "unit,m/s"],
            "Timestamp (UTC),value\n2025-01-01T00:00:00,2.5\n2025-01-01T03:00:00,3.5\n",
        );
        let raw = RawSeriesResponse::new(TrackedVariable::WindSpeed, body);
        let (metadata, series) = parse(raw).unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(series.label, "Wind_f_inst");
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_missing_param_name_uses_fallback_label() {
        let body = response(&["unit,Pa"], "Timestamp (UTC),x\n2025-01-01 00:00:00,101300\n");
        let (_, series) = parse(RawSeriesResponse::new(TrackedVariable::Pressure, body)).unwrap();
        assert_eq!(series.label, "value");
        assert_eq!(series.points[0].value, Some(101_300.0));
    }

    #[test]
    fn test_non_numeric_values_become_missing() {
        let body = response(
            &["param_name,Rainf_tavg"],
            concat!(
                "Timestamp (UTC),Rainf_tavg\n",
                "2025-01-01T00:00:00,abc\n",
                "2025-01-01T03:00:00,0.0001\n",
                "2025-01-01T06:00:00,\n",
            ),
        );
        let (_, series) = parse(RawSeriesResponse::new(TrackedVariable::RainRate, body)).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.points[0].value, None);
        assert_eq!(series.points[1].value, Some(0.0001));
        assert_eq!(series.points[2].value, None);
        assert_eq!(series.valid_points().len(), 1);
    }

    #[test]
    fn test_unparseable_timestamp_fails() {
        let body = response(
            &["param_name,Qair_f_inst"],
            "Timestamp (UTC),Qair_f_inst\nyesterday,0.01\n",
        );
        let err = parse(RawSeriesResponse::new(TrackedVariable::Humidity, body)).unwrap_err();
        assert!(matches!(err, ParseError::Timestamp { row: 0, .. }));
    }

    #[test]
    fn test_missing_table_fails() {
        let body = response(&["param_name,Snowf_tavg"], "\n\n");
        let err = parse(RawSeriesResponse::new(TrackedVariable::SnowRate, body)).unwrap_err();
        assert!(matches!(err, ParseError::MissingTable(TrackedVariable::SnowRate)));
    }

    #[test]
    fn test_empty_response_fails() {
        let err = parse(RawSeriesResponse::new(TrackedVariable::SnowRate, "")).unwrap_err();
        assert!(matches!(err, ParseError::EmptyResponse(_)));
    }

    #[test]
    fn test_single_column_table_fails() {
        let body = response(&[], "Timestamp\n2025-01-01T00:00:00\n");
        let err = parse(RawSeriesResponse::new(TrackedVariable::Temperature, body)).unwrap_err();
        assert!(matches!(err, ParseError::ColumnCount { found: 1, .. }));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T09:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01 09:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T09:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T09:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T11:00:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-06-01"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("not a time"), None);
    }
}
