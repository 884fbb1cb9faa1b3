//! One conversion run: filter, generate, aggregate.
//!
//! A [`Pipeline`] owns an immutable [`RunConfig`]. Every call to
//! [`Pipeline::run`] starts from scratch; nothing is carried between runs.

use crate::aggregation::aggregator::{Aggregator, CashflowTotals};
use crate::aggregation::horizon::HorizonSummary;
use crate::core::cashflow::Cashflow;
use crate::core::currency::CurrencyCode;
use crate::core::trade::TradeRecord;
use crate::curve::interpolator::{BoundaryPolicy, PointsInterpolator};
use crate::curve::store::ForwardCurveStore;
use crate::error::{RunIssue, RunIssues, Severity, TradeError};
use crate::generation::generator::CashflowGenerator;
use crate::io::filter::TradeFilter;
use crate::io::points_loader::LoadedCurves;
use crate::io::trade_loader::LoadedTrades;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Settings of one run. Built once, never mutated during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    filter: TradeFilter,
    reference_date: NaiveDate,
    boundary_policy: BoundaryPolicy,
}

impl RunConfig {
    /// Accept every trade, clamp out-of-range curve lookups.
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            filter: TradeFilter::accept_all(),
            reference_date,
            boundary_policy: BoundaryPolicy::default(),
        }
    }

    pub fn with_filter(mut self, filter: TradeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }

    // --- Accessors ---

    pub fn filter(&self) -> &TradeFilter {
        &self.filter
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary_policy
    }
}

/// Trade counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    /// Rows read, including rows the loader rejected.
    pub read: usize,
    pub filtered_out: usize,
    pub converted: usize,
    /// Rejected by the loader or by the generator.
    pub rejected: usize,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub reference_date: NaiveDate,
    pub boundary_policy: BoundaryPolicy,
    pub cashflows: Vec<Cashflow>,
    pub totals: CashflowTotals,
    pub horizon: HorizonSummary,
    /// Revaluation P&L per currency.
    pub pnl: BTreeMap<CurrencyCode, Decimal>,
    /// Spot rate per pair (`EUR/USD` keys).
    pub spot_rates: BTreeMap<String, Decimal>,
    pub issues: RunIssues,
    pub counts: RunCounts,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.issues.count(Severity::Error) > 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== FX Cashflow Run ===")?;
        writeln!(f, "Reference Date: {}", self.reference_date)?;
        writeln!(f, "Trades Read:    {}", self.counts.read)?;
        writeln!(f, "Filtered Out:   {}", self.counts.filtered_out)?;
        writeln!(f, "Converted:      {}", self.counts.converted)?;
        writeln!(f, "Rejected:       {}", self.counts.rejected)?;
        writeln!(f, "Cashflows:      {}", self.cashflows.len())?;

        writeln!(f, "\nCashflows by Date:")?;
        for row in self.totals.rows() {
            writeln!(f, "  {} {}: {}", row.value_date, row.currency, row.amount)?;
        }

        if !self.pnl.is_empty() {
            writeln!(f, "\nRevaluation P&L:")?;
            for (currency, amount) in &self.pnl {
                writeln!(f, "  {}: {}", currency, amount)?;
            }
        }

        if !self.issues.is_empty() {
            writeln!(f, "\nIssues:")?;
            for issue in self.issues.as_slice() {
                writeln!(f, "  {}", issue)?;
            }
        }
        Ok(())
    }
}

/// Runs trades through filtering, cashflow generation and aggregation.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RunConfig,
}

impl Pipeline {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Convert already-parsed trades. Without a curve store no P&L is computed.
    pub fn run(&self, trades: &[TradeRecord], curves: Option<&ForwardCurveStore>) -> RunReport {
        self.execute(trades, &[], curves, &[])
    }

    /// Convert the output of the loaders, carrying their rejects and
    /// skipped curve rows into the report.
    pub fn run_loaded(&self, trades: &LoadedTrades, curves: Option<&LoadedCurves>) -> RunReport {
        let curve_issues = curves.map(|c| c.issues.as_slice()).unwrap_or_default();
        self.execute(
            &trades.trades,
            &trades.rejected,
            curves.map(|c| &c.store),
            curve_issues,
        )
    }

    fn execute(
        &self,
        trades: &[TradeRecord],
        load_rejects: &[TradeError],
        curves: Option<&ForwardCurveStore>,
        curve_issues: &[RunIssue],
    ) -> RunReport {
        info!(
            "converting {} trades (reference date {})",
            trades.len(),
            self.config.reference_date
        );

        let mut issues = RunIssues::new();
        issues.extend(curve_issues.iter().cloned());
        issues.extend(load_rejects.iter().map(RunIssue::trade_rejected));

        let mut counts = RunCounts {
            read: trades.len() + load_rejects.len(),
            rejected: load_rejects.len(),
            ..RunCounts::default()
        };

        let generator = match curves {
            Some(store) => CashflowGenerator::with_interpolator(
                PointsInterpolator::new(store).with_policy(self.config.boundary_policy),
            ),
            None => CashflowGenerator::new(),
        };

        let mut cashflows = Vec::new();
        for trade in trades {
            if !self.config.filter.accepts(trade) {
                debug!("deal {} filtered out (folder '{}')", trade.deal_id(), trade.folder());
                counts.filtered_out += 1;
                continue;
            }
            match generator.generate(trade) {
                Ok(flows) => {
                    counts.converted += 1;
                    cashflows.extend(flows.cashflows);
                    issues.extend(flows.issues);
                }
                Err(e) => {
                    warn!("{}", e);
                    counts.rejected += 1;
                    issues.push(RunIssue::trade_rejected(&e));
                }
            }
        }

        let totals = Aggregator::by_currency_and_date(&cashflows);
        let horizon = Aggregator::by_horizon(&cashflows, self.config.reference_date);
        let pnl = Aggregator::pnl_by_currency(&cashflows);
        let spot_rates = curves
            .map(|store| {
                store
                    .spot_rates()
                    .into_iter()
                    .map(|(pair, rate)| (pair.to_string(), rate))
                    .collect()
            })
            .unwrap_or_default();

        info!(
            "{} converted, {} filtered out, {} rejected, {} cashflows",
            counts.converted,
            counts.filtered_out,
            counts.rejected,
            cashflows.len()
        );

        RunReport {
            reference_date: self.config.reference_date,
            boundary_policy: self.config.boundary_policy,
            cashflows,
            totals,
            horizon,
            pnl,
            spot_rates,
            issues,
            counts,
        }
    }
}
