//! Forecast extraction from responses of unknown shape.
//!
//! The service has wrapped its forecasts in several ways over time. The
//! shape is discovered at read time by trying each known layout in priority
//! order.

use crate::models::ForecastRecord;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Layout of a raw forecast response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape<'a> {
    /// Candidate forecast records, in response order.
    Records(Vec<&'a Value>),
    /// A JSON document encoded in a string.
    Encoded(&'a str),
    /// Nothing we know how to read.
    Unrecognized,
}

impl<'a> ResponseShape<'a> {
    /// Match `raw` against the known layouts, first match wins:
    /// bare array, `{forecasts: [..]}`, `{forecast: ..}`, a single record,
    /// an encoded string.
    pub fn discover(raw: &'a Value) -> Self {
        match raw {
            Value::Array(items) => Self::Records(items.iter().collect()),
            Value::Object(map) => {
                if let Some(Value::Array(items)) = map.get("forecasts") {
                    return Self::Records(items.iter().collect());
                }

                match map.get("forecast") {
                    Some(Value::Array(items)) => return Self::Records(items.iter().collect()),
                    Some(Value::Null) | None => {}
                    Some(single) => return Self::Records(vec![single]),
                }

                if map.contains_key("forecastid") && map.contains_key("recommendation") {
                    Self::Records(vec![raw])
                } else {
                    Self::Unrecognized
                }
            }
            Value::String(text) => Self::Encoded(text),
            _ => Self::Unrecognized,
        }
    }
}

/// Extract the forecast records dated `today` or later.
///
/// Never fails: unreadable responses and records are logged and yield
/// nothing.
pub fn extract_forecasts(raw: &Value, today: NaiveDate) -> Vec<ForecastRecord> {
    let records = decode_records(raw);
    let total = records.len();

    let upcoming: Vec<ForecastRecord> = records
        .into_iter()
        .filter(|record| record.recommendationfor >= today)
        .collect();

    debug!(
        "Kept {} of {} forecasts dated {} or later",
        upcoming.len(),
        total,
        today
    );

    upcoming
}

fn decode_records(raw: &Value) -> Vec<ForecastRecord> {
    match ResponseShape::discover(raw) {
        ResponseShape::Records(items) => items
            .into_iter()
            .filter_map(|item| match ForecastRecord::deserialize(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable forecast record: {}", e);
                    None
                }
            })
            .collect(),
        ResponseShape::Encoded(text) => match serde_json::from_str::<Value>(text) {
            Ok(decoded) => decode_records(&decoded),
            Err(e) => {
                warn!("Forecast response is a string but not JSON: {}", e);
                Vec::new()
            }
        },
        ResponseShape::Unrecognized => {
            warn!("Unrecognized forecast response shape, treating as no forecasts");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn record(id: i64, date: &str) -> Value {
        json!({
            "forecastid": id,
            "recommendation": "{\"3\": 2.5}",
            "recommendationfor": date,
            "createdat": "2026-10-18T09:00:00.000Z"
        })
    }

    fn ids(records: &[ForecastRecord]) -> Vec<i64> {
        records.iter().map(|r| r.forecastid).collect()
    }

    #[test]
    fn test_all_shapes_extract_the_same_records() {
        let one = record(1, "2026-10-20");
        let two = record(2, "2026-10-21");
        let array = json!([one.clone(), two.clone()]);

        let expected = extract_forecasts(&array, today());
        assert_eq!(ids(&expected), vec![1, 2]);

        let wrapped = json!({ "forecasts": [one.clone(), two.clone()] });
        assert_eq!(extract_forecasts(&wrapped, today()), expected);

        let forecast_array = json!({ "forecast": [one.clone(), two.clone()] });
        assert_eq!(extract_forecasts(&forecast_array, today()), expected);

        let encoded = Value::String(array.to_string());
        assert_eq!(extract_forecasts(&encoded, today()), expected);

        let encoded_wrapper = Value::String(wrapped.to_string());
        assert_eq!(extract_forecasts(&encoded_wrapper, today()), expected);
    }

    #[test]
    fn test_single_record_shapes() {
        let one = record(1, "2026-10-20");
        let expected = extract_forecasts(&json!([one.clone()]), today());
        assert_eq!(expected.len(), 1);

        assert_eq!(extract_forecasts(&json!({ "forecast": one.clone() }), today()), expected);
        assert_eq!(extract_forecasts(&one, today()), expected);
        assert_eq!(
            extract_forecasts(&Value::String(one.to_string()), today()),
            expected
        );
    }

    #[test]
    fn test_forecasts_takes_priority_over_forecast() {
        let raw = json!({
            "forecasts": [record(1, "2026-10-20")],
            "forecast": [record(2, "2026-10-20")]
        });
        assert_eq!(ids(&extract_forecasts(&raw, today())), vec![1]);
    }

    #[test]
    fn test_past_dates_are_dropped() {
        let raw = json!([
            record(1, "2026-10-18T23:59:59.000Z"),
            record(2, "2026-10-19T00:00:00.000Z"),
            record(3, "2026-10-19T22:30:00.000Z"),
            record(4, "2026-11-02"),
            record(5, "2025-12-31")
        ]);

        assert_eq!(ids(&extract_forecasts(&raw, today())), vec![2, 3, 4]);
    }

    #[test]
    fn test_unrecognized_shapes_yield_nothing() {
        assert!(extract_forecasts(&json!({ "error": "Internal server error" }), today()).is_empty());
        assert!(extract_forecasts(&json!(42), today()).is_empty());
        assert!(extract_forecasts(&Value::Null, today()).is_empty());
        assert!(extract_forecasts(&json!({ "forecast": null }), today()).is_empty());
        assert!(extract_forecasts(&json!("not json at all"), today()).is_empty());
    }

    #[test]
    fn test_unreadable_records_are_skipped() {
        let raw = json!([
            record(1, "2026-10-20"),
            { "forecastid": "abc" },
            record(3, "soon")
        ]);
        assert_eq!(ids(&extract_forecasts(&raw, today())), vec![1]);
    }

    #[test]
    fn test_discover_shapes() {
        assert_eq!(ResponseShape::discover(&json!({})), ResponseShape::Unrecognized);
        assert_eq!(
            ResponseShape::discover(&json!("[]")),
            ResponseShape::Encoded("[]")
        );
        let single = record(9, "2026-10-20");
        assert_eq!(
            ResponseShape::discover(&single),
            ResponseShape::Records(vec![&single])
        );
    }
}
