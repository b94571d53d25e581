//! Two-input join over the forecast and stock sources.
//!
//! The fetches complete independently and in any order. The join keeps the
//! latest successful result of each and only hands them to a computation
//! when both are present, so prep items are never named against a missing
//! stock list.

use crate::analysis::aggregator::aggregate;
use crate::forecast::PrepRules;
use crate::models::{Dashboard, StockRecord};
use crate::source::{SourceError, SourceUpdate};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::error;

/// Latest result of each source.
#[derive(Debug, Default)]
pub struct SourceJoin {
    forecasts: Option<Value>,
    stock: Option<Vec<StockRecord>>,
}

impl SourceJoin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed fetch. A failure clears that source's slot and is
    /// handed back to the caller.
    pub fn apply(&mut self, update: SourceUpdate) -> Result<(), SourceError> {
        match update {
            SourceUpdate::Forecasts(result) => match result {
                Ok(value) => {
                    self.forecasts = Some(value);
                    Ok(())
                }
                Err(e) => {
                    self.forecasts = None;
                    Err(e)
                }
            },
            SourceUpdate::Stock(result) => match result {
                Ok(value) => {
                    self.stock = Some(value);
                    Ok(())
                }
                Err(e) => {
                    self.stock = None;
                    Err(e)
                }
            },
        }
    }

    /// Whether both sources currently hold data.
    pub fn is_ready(&self) -> bool {
        self.forecasts.is_some() && self.stock.is_some()
    }

    /// Run `f` over both results, or return `None` while either is missing.
    pub fn compute<R>(&self, f: impl FnOnce(&Value, &[StockRecord]) -> R) -> Option<R> {
        match (&self.forecasts, &self.stock) {
            (Some(forecasts), Some(stock)) => Some(f(forecasts, stock)),
            _ => None,
        }
    }
}

/// Join a single fetch of each source and aggregate them. If either fetch
/// failed, the first failure is returned and nothing is computed.
pub fn aggregate_fetched(
    forecasts: Result<Value, SourceError>,
    stock: Result<Vec<StockRecord>, SourceError>,
    today: NaiveDate,
    rules: &PrepRules,
) -> Result<Dashboard, SourceError> {
    let mut join = SourceJoin::new();
    let mut failure = None;

    for update in [SourceUpdate::Forecasts(forecasts), SourceUpdate::Stock(stock)] {
        if let Err(e) = join.apply(update) {
            error!("Fetch failed: {}", e);
            if failure.is_none() {
                failure = Some(e);
            }
        }
    }

    if let Some(e) = failure {
        return Err(e);
    }

    Ok(join
        .compute(|raw, stock| aggregate(raw, stock, today, rules))
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn forecasts() -> Value {
        json!([{
            "forecastid": 5,
            "recommendation": "{\"1\": 4.0}",
            "recommendationfor": "2026-10-20"
        }])
    }

    fn stock() -> Vec<StockRecord> {
        vec![StockRecord {
            ingredientid: 1,
            ingredientname: "Rice".to_string(),
            bulk_order_quantity: 50.0,
        }]
    }

    fn failure() -> SourceError {
        SourceError::Io {
            path: PathBuf::from("stocks.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
    }

    #[test]
    fn test_waits_for_both_sources() {
        let mut join = SourceJoin::new();
        assert!(join.compute(|_, _| ()).is_none());

        join.apply(SourceUpdate::Forecasts(Ok(json!([])))).unwrap();
        assert!(!join.is_ready());
        assert!(join.compute(|_, _| ()).is_none());

        join.apply(SourceUpdate::Stock(Ok(stock()))).unwrap();
        assert!(join.is_ready());
        assert_eq!(join.compute(|_, stock| stock.len()), Some(1));
    }

    #[test]
    fn test_order_does_not_matter() {
        let mut join = SourceJoin::new();
        join.apply(SourceUpdate::Stock(Ok(stock()))).unwrap();
        assert!(join.compute(|_, _| ()).is_none());

        join.apply(SourceUpdate::Forecasts(Ok(json!({ "forecast": [] }))))
            .unwrap();
        assert_eq!(
            join.compute(|forecasts, _| forecasts["forecast"].is_array()),
            Some(true)
        );
    }

    #[test]
    fn test_failure_withholds_computation() {
        let mut join = SourceJoin::new();
        join.apply(SourceUpdate::Forecasts(Ok(json!([])))).unwrap();
        join.apply(SourceUpdate::Stock(Ok(stock()))).unwrap();
        assert!(join.is_ready());

        assert!(join.apply(SourceUpdate::Stock(Err(failure()))).is_err());
        assert!(!join.is_ready());
        assert!(join.compute(|_, _| ()).is_none());

        join.apply(SourceUpdate::Stock(Ok(Vec::new()))).unwrap();
        assert_eq!(join.compute(|_, stock| stock.is_empty()), Some(true));
    }

    #[test]
    fn test_latest_result_wins() {
        let mut join = SourceJoin::new();
        join.apply(SourceUpdate::Stock(Ok(stock()))).unwrap();
        join.apply(SourceUpdate::Forecasts(Ok(json!([1])))).unwrap();
        join.apply(SourceUpdate::Forecasts(Ok(json!([1, 2])))).unwrap();

        assert_eq!(
            join.compute(|forecasts, _| forecasts.as_array().map(Vec::len)),
            Some(Some(2))
        );
    }

    #[test]
    fn test_aggregate_fetched_with_both_sources() {
        let dashboard =
            aggregate_fetched(Ok(forecasts()), Ok(stock()), today(), &PrepRules::default())
                .unwrap();

        assert_eq!(dashboard.notifications.len(), 1);
        assert_eq!(dashboard.notifications[0].items[0].name, "Rice");
    }

    #[test]
    fn test_aggregate_fetched_withholds_on_one_failure() {
        let result =
            aggregate_fetched(Ok(forecasts()), Err(failure()), today(), &PrepRules::default());
        assert!(matches!(result, Err(SourceError::Io { .. })));

        let result =
            aggregate_fetched(Err(failure()), Ok(stock()), today(), &PrepRules::default());
        assert!(result.is_err());
    }
}
