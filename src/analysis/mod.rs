//! Analysis modules.
//!
//! The aggregator turns the two raw inputs into a dashboard; the join
//! decides when both inputs are available.

pub mod aggregator;
pub mod join;

pub use aggregator::*;
pub use join::{aggregate_fetched, SourceJoin};
