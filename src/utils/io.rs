//! I/O Utilities
//!
//! CSV and JSON persistence for series, forecasts and configuration.

use crate::data::{Observation, Series};
use crate::error::{Error, Result};
use crate::preprocessing::ForecastPoint;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{Reader, Writer};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::path::Path;

const DATE_COLUMNS: [&str; 4] = ["date", "datetime", "timestamp", "time"];
const VALUE_COLUMNS: [&str; 3] = ["close", "adj close", "value"];

/// Parse a timestamp written as RFC 3339, `YYYY-MM-DD[ HH:MM:SS]` or Unix milliseconds
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

/// Load dated close prices from a CSV file with a header row.
///
/// The date column may be called `date`, `datetime`, `timestamp` or `time`;
/// the value column `close`, `adj close` or `value`. Rows are returned in file
/// order.
pub fn load_observations_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
    let mut reader = Reader::from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();

    let date_idx = find_column(&headers, &DATE_COLUMNS)
        .ok_or_else(|| Error::InputData("CSV has no date column".to_string()))?;
    let value_idx = find_column(&headers, &VALUE_COLUMNS)
        .ok_or_else(|| Error::InputData("CSV has no close column".to_string()))?;

    let mut observations = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let line = row + 2;

        let timestamp = record
            .get(date_idx)
            .and_then(parse_timestamp)
            .ok_or_else(|| Error::InputData(format!("line {}: invalid date", line)))?;

        let value = record
            .get(value_idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .ok_or_else(|| Error::InputData(format!("line {}: invalid close price", line)))?;

        observations.push(Observation::new(timestamp, value));
    }

    Ok(observations)
}

/// Save a series as `date,close` CSV
pub fn save_series_csv<P: AsRef<Path>>(series: &Series, path: P) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    writer.write_record(["date", "close"])?;
    for obs in series.observations() {
        writer.write_record(&[obs.timestamp.to_rfc3339(), obs.value.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Save aligned forecasts as `date,actual,predicted,error` CSV
pub fn save_forecasts_csv<P: AsRef<Path>>(points: &[ForecastPoint], path: P) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    writer.write_record(["date", "actual", "predicted", "error"])?;
    for point in points {
        writer.write_record(&[
            point.timestamp.to_rfc3339(),
            point.actual.to_string(),
            point.predicted.to_string(),
            point.error().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Save any serializable data to JSON
pub fn save_json<T: Serialize, P: AsRef<Path>>(data: &T, path: P) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, data)?;
    Ok(())
}

/// Load data from JSON
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path)?;
    let data = serde_json::from_reader(file)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = Utc.with_ymd_and_hms(2014, 1, 2, 0, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2014-01-02"), Some(midnight));
        assert_eq!(parse_timestamp("2014-01-02 00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2014-01-02T00:00:00+00:00"), Some(midnight));
        assert_eq!(
            parse_timestamp(&midnight.timestamp_millis().to_string()),
            Some(midnight)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_series_csv_round_trip() {
        let start = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
        let series = Series::from_values("AAPL", start, &[71.5, 72.25, 70.0]).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        save_series_csv(&series, file.path()).unwrap();

        let loaded = load_observations_csv(file.path()).unwrap();
        assert_eq!(loaded, series.observations().to_vec());
        assert_eq!(loaded[2].timestamp - loaded[0].timestamp, Duration::days(2));
    }

    #[test]
    fn test_bad_rows_are_input_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "date,close\n2020-01-01,abc\n").unwrap();
        assert!(matches!(
            load_observations_csv(file.path()),
            Err(Error::InputData(_))
        ));

        std::fs::write(file.path(), "day,price\n2020-01-01,1.0\n").unwrap();
        assert!(matches!(
            load_observations_csv(file.path()),
            Err(Error::InputData(_))
        ));
    }

    #[test]
    fn test_save_forecasts_csv() {
        let t = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let points = vec![ForecastPoint {
            timestamp: t,
            actual: 10.0,
            predicted: 9.5,
        }];

        let file = tempfile::NamedTempFile::new().unwrap();
        save_forecasts_csv(&points, file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("date,actual,predicted,error"));
        assert!(lines.next().unwrap().ends_with(",10,9.5,-0.5"));
    }
}
