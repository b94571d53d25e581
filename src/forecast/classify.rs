//! Decoding of a forecast's recommendation payload.

use crate::models::ForecastRecord;
use serde_json::{Map, Value};

/// Value of the `type` marker on traffic recommendations.
pub const TRAFFIC_FORECAST_TYPE: &str = "traffic_forecast";

/// Marker keys that are never ingredient ids.
pub const MARKER_KEYS: [&str; 2] = ["type", "text_recommendation"];

/// A decoded recommendation. Every record is exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Free-text traffic outlook.
    Traffic { text: String },
    /// Ingredient id to quantity mapping, marker keys removed.
    Prep(Map<String, Value>),
    /// Payload is not a JSON object.
    Unclassifiable(String),
}

/// Decode and classify the recommendation of `record`.
pub fn classify(record: &ForecastRecord) -> Recommendation {
    let decoded = match serde_json::from_str::<Value>(&record.recommendation) {
        Ok(value) => value,
        Err(e) => return Recommendation::Unclassifiable(format!("invalid JSON: {}", e)),
    };

    let Value::Object(mut payload) = decoded else {
        return Recommendation::Unclassifiable("payload is not an object".to_string());
    };

    if payload.get("type").and_then(Value::as_str) == Some(TRAFFIC_FORECAST_TYPE) {
        let text = payload
            .get("text_recommendation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Recommendation::Traffic { text };
    }

    for key in MARKER_KEYS {
        payload.remove(key);
    }
    Recommendation::Prep(payload)
}
