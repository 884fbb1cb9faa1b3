//! # fx-cashflow-engine
//!
//! FX trade records to dated cashflows, with forward-points revaluation
//! and liquidity horizon reporting.
//!
//! Given a trade-detail table (Spot, FX Swap and Outright Forward deals)
//! and optionally a forward-points table, this engine produces one signed
//! cashflow per currency leg, marks forward legs to market and rolls the
//! result up by settlement date and by time horizon.
//!
//! ## Architecture
//!
//! - **core**: currencies and pairs, trade records, cashflows
//! - **curve**: tenors, forward-point quotes, curve store, interpolation
//! - **generation**: per-deal-type cashflow generation and revaluation
//! - **aggregation**: totals by (currency, date) and by horizon bucket
//! - **pipeline**: one filter, generate, aggregate run
//! - **io**: CSV loaders, filter configuration, CSV/HTML/JSON reports
//! - **simulation**: synthetic trade books and curves

pub mod aggregation;
pub mod core;
pub mod curve;
pub mod error;
pub mod generation;
pub mod io;
pub mod pipeline;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::aggregation::aggregator::{Aggregator, CashflowTotals};
    pub use crate::aggregation::horizon::{HorizonBucket, HorizonSummary};
    pub use crate::core::cashflow::{Cashflow, LegRole};
    pub use crate::core::currency::{CurrencyCode, CurrencyPair};
    pub use crate::core::trade::{DealType, TradeRecord};
    pub use crate::curve::interpolator::{BoundaryPolicy, PointsInterpolator};
    pub use crate::curve::store::{ForwardCurve, ForwardCurveStore};
    pub use crate::error::{CurveError, PipelineError, RunIssue, TradeError};
    pub use crate::generation::generator::CashflowGenerator;
    pub use crate::io::filter::{FilterConfig, TradeFilter};
    pub use crate::pipeline::{Pipeline, RunConfig, RunReport};
}
