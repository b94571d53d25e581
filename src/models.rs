//! Data models for the forecast aggregator.
//!
//! This module contains the records received from the management service
//! and the derived collections shown to operators.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational - prep suggestions, outlooks
    Info,
    /// Something went well - restocks, completed orders
    Success,
    /// Needs attention soon
    Warning,
    /// Needs attention now
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Success => write!(f, "Success"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "🔵",
            Severity::Success => "🟢",
            Severity::Warning => "🟡",
            Severity::Critical => "🔴",
        }
    }
}

/// A single row of the service's `forecasts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Server-assigned identifier.
    pub forecastid: i64,
    /// JSON-encoded recommendation payload, opaque until classified.
    #[serde(deserialize_with = "recommendation_text")]
    pub recommendation: String,
    /// Calendar day the recommendation applies to, read from the literal
    /// `YYYY-MM-DD` prefix; time and offset are ignored on purpose.
    #[serde(deserialize_with = "date_prefix")]
    pub recommendationfor: NaiveDate,
    /// Creation timestamp as sent by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub createdat: Option<String>,
}

/// Accept the recommendation either as an encoded string or as an inline
/// JSON value, which is re-encoded.
fn recommendation_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Read the `YYYY-MM-DD` prefix of a date or timestamp string. The time of
/// day and any offset are ignored.
fn date_prefix<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date_prefix(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {:?}", raw)))
}

/// Parse the calendar-day portion of a date string.
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// A row of the stock endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Ingredient identifier, matches the keys of prep recommendations.
    pub ingredientid: i64,
    /// Display name.
    #[serde(default)]
    pub ingredientname: String,
    /// Quantity the supplier ships per bulk order.
    #[serde(rename = "bulkOrderQuantity", default)]
    pub bulk_order_quantity: f64,
}

/// Index over stock records keyed by stringified ingredient id.
#[derive(Debug, Clone, Default)]
pub struct IngredientLookup {
    by_id: HashMap<String, StockRecord>,
}

impl IngredientLookup {
    /// Build the lookup from stock records. Later duplicates win.
    pub fn from_records(records: &[StockRecord]) -> Self {
        let by_id = records
            .iter()
            .map(|record| (record.ingredientid.to_string(), record.clone()))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, ingredient_id: &str) -> Option<&StockRecord> {
        self.by_id.get(ingredient_id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// Structured summary of an expected customer-volume pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficForecast {
    /// Id of the forecast record it was parsed from.
    pub id: i64,
    pub date: NaiveDate,
    /// Percentage above normal, e.g. `35.5%`.
    pub forecasted_increase: String,
    /// Peak hour as sent, e.g. `18:00`.
    pub peak_hour: String,
    /// Comma-joined busy ranges, e.g. `11:00-13:00, 17:00-19:00`.
    pub busy_periods: String,
    pub day_of_week: String,
}

/// One ingredient to prepare in advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepItem {
    /// `<forecast id>-<ingredient id>`, unique across a dashboard.
    pub id: String,
    #[serde(rename = "itemId")]
    pub item_id: String,
    pub name: String,
    pub quantity: f64,
    #[serde(rename = "bulkOrderQuantity")]
    pub bulk_order_quantity: f64,
}

/// Date-scoped group of prep items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepNotification {
    /// Id of the forecast record it was built from.
    pub id: i64,
    pub date: NaiveDate,
    pub items: Vec<PrepItem>,
    pub severity: Severity,
}

/// Both derived collections, recomputed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub notifications: Vec<PrepNotification>,
    pub traffic_forecasts: Vec<TrafficForecast>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.traffic_forecasts.is_empty()
    }
}

/// Metadata about a rendered report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the data came from (URL or file paths).
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Calendar day used for the date filter and relative labels.
    pub today: NaiveDate,
    /// Prep notifications hidden by dismissal.
    pub dismissed_prep: usize,
    /// Traffic forecasts hidden by dismissal.
    pub dismissed_traffic: usize,
}

/// A dashboard after dismissals, ready to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
}
