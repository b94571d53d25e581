//! Session-scoped dismissal of notifications.
//!
//! Dismissed ids are hidden when rendering but never removed from the
//! dashboard itself. Nothing is persisted: every run starts empty.

use crate::models::{Dashboard, PrepNotification, TrafficForecast};
use std::collections::HashSet;

/// Dismissed prep notification and traffic forecast ids.
#[derive(Debug, Clone, Default)]
pub struct DismissalState {
    prep: HashSet<i64>,
    traffic: HashSet<i64>,
}

impl DismissalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the state with ids dismissed up front.
    pub fn with_ids(prep: &[i64], traffic: &[i64]) -> Self {
        let mut state = Self::new();
        for &id in prep {
            state.dismiss_prep(id);
        }
        for &id in traffic {
            state.dismiss_traffic(id);
        }
        state
    }

    /// Dismiss a prep notification. Returns `false` if it already was.
    pub fn dismiss_prep(&mut self, id: i64) -> bool {
        self.prep.insert(id)
    }

    /// Dismiss a traffic forecast. Returns `false` if it already was.
    pub fn dismiss_traffic(&mut self, id: i64) -> bool {
        self.traffic.insert(id)
    }

    pub fn is_prep_dismissed(&self, id: i64) -> bool {
        self.prep.contains(&id)
    }

    pub fn is_traffic_dismissed(&self, id: i64) -> bool {
        self.traffic.contains(&id)
    }

    pub fn dismissed_prep_count(&self) -> usize {
        self.prep.len()
    }

    pub fn dismissed_traffic_count(&self) -> usize {
        self.traffic.len()
    }

    pub fn visible_notifications<'a>(
        &self,
        notifications: &'a [PrepNotification],
    ) -> Vec<&'a PrepNotification> {
        notifications
            .iter()
            .filter(|n| !self.is_prep_dismissed(n.id))
            .collect()
    }

    pub fn visible_traffic<'a>(&self, forecasts: &'a [TrafficForecast]) -> Vec<&'a TrafficForecast> {
        forecasts
            .iter()
            .filter(|f| !self.is_traffic_dismissed(f.id))
            .collect()
    }

    /// Copy of `dashboard` without dismissed entries.
    pub fn visible(&self, dashboard: &Dashboard) -> Dashboard {
        Dashboard {
            notifications: self
                .visible_notifications(&dashboard.notifications)
                .into_iter()
                .cloned()
                .collect(),
            traffic_forecasts: self
                .visible_traffic(&dashboard.traffic_forecasts)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
    }

    fn dashboard() -> Dashboard {
        Dashboard {
            notifications: vec![
                PrepNotification {
                    id: 1,
                    date: day(),
                    items: Vec::new(),
                    severity: Severity::Info,
                },
                PrepNotification {
                    id: 2,
                    date: day(),
                    items: Vec::new(),
                    severity: Severity::Info,
                },
            ],
            traffic_forecasts: vec![TrafficForecast {
                id: 1,
                date: day(),
                forecasted_increase: String::new(),
                peak_hour: String::new(),
                busy_periods: String::new(),
                day_of_week: String::new(),
            }],
        }
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut state = DismissalState::new();
        assert!(state.dismiss_prep(7));
        assert!(!state.dismiss_prep(7));
        assert_eq!(state.dismissed_prep_count(), 1);
    }

    #[test]
    fn test_sets_are_independent() {
        let mut state = DismissalState::new();
        state.dismiss_prep(1);

        assert!(state.is_prep_dismissed(1));
        assert!(!state.is_traffic_dismissed(1));
        assert_eq!(state.dismissed_traffic_count(), 0);
    }

    #[test]
    fn test_visible_keeps_underlying_collections() {
        let dashboard = dashboard();
        let state = DismissalState::with_ids(&[1], &[1]);

        let visible = state.visible(&dashboard);
        assert_eq!(visible.notifications.len(), 1);
        assert_eq!(visible.notifications[0].id, 2);
        assert!(visible.traffic_forecasts.is_empty());

        assert_eq!(dashboard.notifications.len(), 2);
        assert_eq!(dashboard.traffic_forecasts.len(), 1);
    }

    #[test]
    fn test_unknown_ids_hide_nothing() {
        let dashboard = dashboard();
        let mut state = DismissalState::new();
        state.dismiss_traffic(99);

        assert_eq!(state.visible(&dashboard), dashboard);
    }
}
