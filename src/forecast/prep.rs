//! Prep quantity aggregation.

use crate::forecast::classify::{classify, Recommendation};
use crate::models::{ForecastRecord, IngredientLookup, PrepItem, PrepNotification, Severity};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Significance threshold and cap for prep items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepRules {
    /// Items need strictly more than this quantity.
    pub min_quantity: f64,
    /// Items kept per notification, largest first.
    pub max_items: usize,
}

impl Default for PrepRules {
    fn default() -> Self {
        Self {
            min_quantity: 0.8,
            max_items: 5,
        }
    }
}

/// Build prep notifications from the records classified as prep.
///
/// Returns nothing until the ingredient lookup is populated, since items
/// could not be named without it.
pub fn prep_notifications(
    records: &[ForecastRecord],
    lookup: &IngredientLookup,
    rules: &PrepRules,
) -> Vec<PrepNotification> {
    if lookup.is_empty() {
        debug!("Ingredient lookup is empty, skipping prep aggregation");
        return Vec::new();
    }

    records
        .iter()
        .filter_map(|record| match classify(record) {
            Recommendation::Prep(quantities) => {
                let items = prep_items(record.forecastid, &quantities, lookup, rules);
                if items.is_empty() {
                    debug!("Forecast {} has no significant prep items", record.forecastid);
                    return None;
                }
                Some(PrepNotification {
                    id: record.forecastid,
                    date: record.recommendationfor,
                    items,
                    severity: Severity::Info,
                })
            }
            Recommendation::Unclassifiable(reason) => {
                warn!(
                    "Dropping forecast {}: unreadable recommendation ({})",
                    record.forecastid, reason
                );
                None
            }
            Recommendation::Traffic { .. } => None,
        })
        .collect()
}

/// Turn one decoded quantity mapping into sorted, filtered prep items.
pub fn prep_items(
    forecast_id: i64,
    quantities: &Map<String, Value>,
    lookup: &IngredientLookup,
    rules: &PrepRules,
) -> Vec<PrepItem> {
    let mut items: Vec<PrepItem> = quantities
        .iter()
        .filter_map(|(item_id, quantity)| {
            let Some(quantity) = quantity.as_f64() else {
                debug!(
                    "Forecast {}: ignoring non-numeric quantity for item {}",
                    forecast_id, item_id
                );
                return None;
            };

            let (name, bulk_order_quantity) = match lookup.get(item_id) {
                Some(stock) => (stock.ingredientname.clone(), stock.bulk_order_quantity),
                None => (format!("Item {}", item_id), 0.0),
            };

            Some(PrepItem {
                id: format!("{}-{}", forecast_id, item_id),
                item_id: item_id.clone(),
                name,
                quantity,
                bulk_order_quantity,
            })
        })
        .filter(|item| item.quantity > rules.min_quantity)
        .collect();

    items.sort_by(|a, b| {
        b.quantity
            .partial_cmp(&a.quantity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    items.truncate(rules.max_items);

    items
}
