//! Reporting views over generated cashflows.

pub mod aggregator;
pub mod horizon;
