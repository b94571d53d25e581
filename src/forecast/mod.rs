//! Forecast record handling.
//!
//! Raw responses are reduced to dated records by `extract`, each record's
//! payload is decoded by `classify`, and the two derived collections are
//! built by `traffic` and `prep`.

pub mod classify;
pub mod extract;
pub mod prep;
pub mod traffic;

pub use extract::extract_forecasts;
pub use prep::{prep_notifications, PrepRules};
pub use traffic::traffic_forecasts;
