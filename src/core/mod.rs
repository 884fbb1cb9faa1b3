//! Domain types: currencies, trades and cashflows.

pub mod cashflow;
pub mod currency;
pub mod trade;
