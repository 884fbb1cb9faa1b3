//! File formats: trade and points tables, filter configuration, reports.

pub mod filter;
pub mod points_loader;
pub mod report;
pub mod trade_loader;
