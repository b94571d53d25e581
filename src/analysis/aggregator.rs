//! Dashboard aggregation and statistics.
//!
//! This module recomputes both derived collections from the two raw inputs
//! and provides summary helpers used by the report.

use crate::forecast::{extract_forecasts, prep_notifications, traffic_forecasts, PrepRules};
use crate::models::{Dashboard, IngredientLookup, PrepNotification, StockRecord};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// Recompute the dashboard from a raw forecast response and the stock list.
///
/// Pure: the same inputs and `today` always give the same dashboard.
pub fn aggregate(
    raw_forecasts: &Value,
    stock: &[StockRecord],
    today: NaiveDate,
    rules: &PrepRules,
) -> Dashboard {
    let forecasts = extract_forecasts(raw_forecasts, today);
    let lookup = IngredientLookup::from_records(stock);
    debug!("Ingredient lookup holds {} entries", lookup.len());

    let dashboard = Dashboard {
        notifications: prep_notifications(&forecasts, &lookup, rules),
        traffic_forecasts: traffic_forecasts(&forecasts),
    };

    info!(
        "Aggregated {} forecasts into {} prep notifications and {} traffic forecasts",
        forecasts.len(),
        dashboard.notifications.len(),
        dashboard.traffic_forecasts.len()
    );

    dashboard
}

/// Total prep quantity per ingredient name across notifications, largest
/// first.
pub fn top_ingredients(notifications: &[PrepNotification], n: usize) -> Vec<(String, f64)> {
    let mut totals: HashMap<String, f64> = HashMap::new();

    for item in notifications.iter().flat_map(|n| &n.items) {
        *totals.entry(item.name.clone()).or_default() += item.quantity;
    }

    let mut ranked: Vec<(String, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(n);

    ranked
}

/// Count prep items across notifications.
pub fn total_prep_items(notifications: &[PrepNotification]) -> usize {
    notifications.iter().map(|n| n.items.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrepItem, Severity};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn stock() -> Vec<StockRecord> {
        vec![
            StockRecord {
                ingredientid: 1,
                ingredientname: "Bun".to_string(),
                bulk_order_quantity: 48.0,
            },
            StockRecord {
                ingredientid: 2,
                ingredientname: "Patty".to_string(),
                bulk_order_quantity: 24.0,
            },
        ]
    }

    fn item(name: &str, quantity: f64) -> PrepItem {
        PrepItem {
            id: format!("1-{}", name),
            item_id: name.to_string(),
            name: name.to_string(),
            quantity,
            bulk_order_quantity: 0.0,
        }
    }

    #[test]
    fn test_aggregate_splits_categories() {
        let raw = json!({
            "forecast": [
                {
                    "forecastid": 1,
                    "recommendation": "{\"1\": 12.5, \"2\": 6.0, \"3\": 0.4}",
                    "recommendationfor": "2026-10-20T00:00:00.000Z",
                    "createdat": "2026-10-19T06:00:00.000Z"
                },
                {
                    "forecastid": 2,
                    "recommendation": "{\"type\": \"traffic_forecast\", \"text_recommendation\": \"Expect HEAVY traffic on Tuesday, 2026-10-20. Forecasting 20% above normal levels for a Tuesday. Peak hours expected around 12:00.\"}",
                    "recommendationfor": "2026-10-20T00:00:00.000Z",
                    "createdat": "2026-10-19T06:00:00.000Z"
                },
                {
                    "forecastid": 3,
                    "recommendation": "{\"1\": 30.0}",
                    "recommendationfor": "2026-10-10T00:00:00.000Z",
                    "createdat": "2026-10-09T06:00:00.000Z"
                },
                {
                    "forecastid": 4,
                    "recommendation": "oops",
                    "recommendationfor": "2026-10-21T00:00:00.000Z",
                    "createdat": "2026-10-19T06:00:00.000Z"
                }
            ]
        });

        let dashboard = aggregate(&raw, &stock(), today(), &PrepRules::default());

        assert_eq!(dashboard.notifications.len(), 1);
        let names: Vec<&str> = dashboard.notifications[0]
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bun", "Patty"]);

        assert_eq!(dashboard.traffic_forecasts.len(), 1);
        assert_eq!(dashboard.traffic_forecasts[0].id, 2);
        assert_eq!(dashboard.traffic_forecasts[0].forecasted_increase, "20%");
    }

    #[test]
    fn test_aggregate_without_stock_keeps_traffic() {
        let raw = json!([
            {
                "forecastid": 1,
                "recommendation": "{\"1\": 12.5}",
                "recommendationfor": "2026-10-20"
            },
            {
                "forecastid": 2,
                "recommendation": "{\"type\": \"traffic_forecast\", \"text_recommendation\": \"\"}",
                "recommendationfor": "2026-10-20"
            }
        ]);

        let dashboard = aggregate(&raw, &[], today(), &PrepRules::default());
        assert!(dashboard.notifications.is_empty());
        assert_eq!(dashboard.traffic_forecasts.len(), 1);
    }

    #[test]
    fn test_aggregate_unrecognized_response() {
        let dashboard = aggregate(
            &json!({ "error": "Internal server error" }),
            &stock(),
            today(),
            &PrepRules::default(),
        );
        assert!(dashboard.is_empty());
    }

    #[test]
    fn test_top_ingredients() {
        let notifications = vec![
            PrepNotification {
                id: 1,
                date: today(),
                items: vec![item("Bun", 4.0), item("Patty", 2.0)],
                severity: Severity::Info,
            },
            PrepNotification {
                id: 2,
                date: today(),
                items: vec![item("Patty", 5.0), item("Cheese", 1.0)],
                severity: Severity::Info,
            },
        ];

        let top = top_ingredients(&notifications, 2);
        assert_eq!(top, vec![("Patty".to_string(), 7.0), ("Bun".to_string(), 4.0)]);
        assert_eq!(total_prep_items(&notifications), 4);
    }
}
