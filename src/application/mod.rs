//! Application layer orchestrating the settlement engine.
//!
//! This module defines the `SettlementEngine`, which loads group ledgers
//! through the `LedgerStore` port and runs the pure domain computations on them.

pub mod engine;
