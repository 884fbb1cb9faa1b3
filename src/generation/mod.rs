//! Trade to cashflow conversion.

pub mod generator;
pub mod revaluation;
