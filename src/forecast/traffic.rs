//! Traffic forecast parsing.
//!
//! Traffic recommendations arrive as prose generated by the forecasting job,
//! e.g. `Expect HEAVY traffic on Saturday, 2026-10-24. Forecasting 35.5%
//! above normal levels for a Saturday. ... Peak hours expected around 18:00.`
//! Each field is pulled out by its own pattern so a missing sentence only
//! blanks that field.

use crate::forecast::classify::{classify, Recommendation};
use crate::models::{ForecastRecord, TrafficForecast};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Fields parsed from a traffic recommendation's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficDetails {
    pub day_of_week: String,
    pub forecasted_increase: String,
    pub peak_hour: String,
    pub busy_periods: String,
}

/// Build traffic forecasts from the records classified as traffic.
pub fn traffic_forecasts(records: &[ForecastRecord]) -> Vec<TrafficForecast> {
    records
        .iter()
        .filter_map(|record| match classify(record) {
            Recommendation::Traffic { text } => {
                let details = parse_traffic_text(&text);
                Some(TrafficForecast {
                    id: record.forecastid,
                    date: record.recommendationfor,
                    forecasted_increase: details.forecasted_increase,
                    peak_hour: details.peak_hour,
                    busy_periods: details.busy_periods,
                    day_of_week: details.day_of_week,
                })
            }
            Recommendation::Unclassifiable(reason) => {
                debug!(
                    "Forecast {} is not a traffic forecast: {}",
                    record.forecastid, reason
                );
                None
            }
            Recommendation::Prep(_) => None,
        })
        .collect()
}

/// Extract the structured fields from a traffic recommendation.
pub fn parse_traffic_text(text: &str) -> TrafficDetails {
    static DAY_RE: OnceLock<Regex> = OnceLock::new();
    let day_re = DAY_RE
        .get_or_init(|| Regex::new(r"Expect\s+(\w+)\s+traffic\s+on\s+(\w+)").expect("day pattern"));

    static INCREASE_RE: OnceLock<Regex> = OnceLock::new();
    let increase_re = INCREASE_RE.get_or_init(|| {
        Regex::new(r"Forecasting\s+(\d+(?:\.\d+)?)%\s+above\s+normal").expect("increase pattern")
    });

    static PEAK_RE: OnceLock<Regex> = OnceLock::new();
    let peak_re = PEAK_RE.get_or_init(|| {
        Regex::new(r"Peak hours expected around\s+(\d{1,2}:\d{2})").expect("peak pattern")
    });

    static BUSY_RE: OnceLock<Regex> = OnceLock::new();
    let busy_re = BUSY_RE.get_or_init(|| {
        Regex::new(r"Multiple busy periods expected:\s*([^.]+)\.").expect("busy pattern")
    });

    TrafficDetails {
        day_of_week: capture(day_re, text, 2),
        forecasted_increase: {
            let number = capture(increase_re, text, 1);
            if number.is_empty() {
                number
            } else {
                format!("{}%", number)
            }
        },
        peak_hour: capture(peak_re, text, 1),
        busy_periods: capture(busy_re, text, 1),
    }
}

fn capture(re: &Regex, text: &str, group: usize) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
