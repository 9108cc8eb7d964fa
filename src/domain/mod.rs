//! Domain layer: the pure settlement engine and the types it works on.
//!
//! Nothing in here performs I/O. The accumulator and planner take fully
//! materialized inputs and return fresh values, so they can be re-run freely.

pub mod accumulator;
pub mod expense;
mod id;
pub mod ledger;
pub mod member;
pub mod money;
pub mod planner;
pub mod ports;
pub mod settlement;
pub mod split;
pub mod summary;
pub mod validation;

pub use accumulator::{compute_balances, compute_balances_within};
pub use planner::plan_settlements;
