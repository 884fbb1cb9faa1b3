//! Error kinds and the run-level issue list.
//!
//! Three layers of failure exist in a conversion run:
//!
//! - [`PipelineError`] stops the run (missing input file, missing column).
//! - [`TradeError`] excludes one trade; the run continues.
//! - [`CurveError`] drops the P&L of one trade; its principal cashflows
//!   are still produced.
//!
//! Recoverable problems end up as [`RunIssue`]s in an append-only
//! [`RunIssues`] list that is surfaced in the final report.

use crate::core::currency::{CurrencyPair, PairError};
use crate::core::trade::DealType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Unrecoverable errors. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read input file '{path}': {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{table} table is missing required column '{column}'")]
    Schema { table: &'static str, column: String },
    #[error("malformed CSV in {table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("invalid filter configuration: {0}")]
    FilterConfig(#[from] serde_json::Error),
    #[error("invalid forward curve: {0}")]
    InvalidCurve(#[from] CurveError),
    #[error("cannot write report '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A trade that cannot be converted. Only that trade is excluded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("deal {deal_id}: missing required field '{field}'")]
    MissingField { deal_id: String, field: &'static str },
    #[error("deal {deal_id}: cannot parse {field} amount '{value}'")]
    InvalidAmount {
        deal_id: String,
        field: &'static str,
        value: String,
    },
    #[error("deal {deal_id}: cannot parse {field} '{value}'")]
    InvalidDate {
        deal_id: String,
        field: &'static str,
        value: String,
    },
    #[error("deal {deal_id}: {source}")]
    InvalidPair {
        deal_id: String,
        #[source]
        source: PairError,
    },
    #[error("deal {deal_id}: unknown deal type '{value}'")]
    UnknownDealType { deal_id: String, value: String },
    #[error("deal {deal_id}: {deal_type} requires a maturity date")]
    MissingMaturityDate { deal_id: String, deal_type: DealType },
    #[error("deal {deal_id}: {deal_type} has a zero base notional")]
    ZeroNotional { deal_id: String, deal_type: DealType },
    #[error("deal {deal_id}: unreadable row: {reason}")]
    UnreadableRow { deal_id: String, reason: String },
}

impl TradeError {
    /// Deal id of the offending trade (may be empty when the id itself is missing).
    pub fn deal_id(&self) -> &str {
        match self {
            TradeError::MissingField { deal_id, .. }
            | TradeError::InvalidAmount { deal_id, .. }
            | TradeError::InvalidDate { deal_id, .. }
            | TradeError::InvalidPair { deal_id, .. }
            | TradeError::UnknownDealType { deal_id, .. }
            | TradeError::MissingMaturityDate { deal_id, .. }
            | TradeError::ZeroNotional { deal_id, .. }
            | TradeError::UnreadableRow { deal_id, .. } => deal_id,
        }
    }
}

/// Forward-curve lookup and construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("no forward points quoted for {pair}")]
    CurveNotFound { pair: CurrencyPair },
    #[error("no spot rate quoted for {pair}")]
    NoSpotRate { pair: CurrencyPair },
    #[error("{date} is outside the quoted range {first}..{last} of {pair}")]
    OutOfRange {
        pair: CurrencyPair,
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },
    #[error("forward curve for {pair} has no quotes")]
    EmptyCurve { pair: CurrencyPair },
    #[error("forward curve for {pair} quotes {date} more than once")]
    DuplicateSettlementDate { pair: CurrencyPair, date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Classification of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// The trade was excluded from the run.
    TradeValidation,
    /// The trade was converted without P&L.
    CurveLookup,
    /// A curve lookup was clamped to the first or last quote.
    InterpolationRange,
    /// A row of the forward-points table was skipped.
    CurveInput,
}

/// One recoverable problem recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIssue {
    pub deal_id: Option<String>,
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
}

impl RunIssue {
    pub fn trade_rejected(error: &TradeError) -> Self {
        let deal_id = error.deal_id();
        Self {
            deal_id: (!deal_id.is_empty()).then(|| deal_id.to_string()),
            severity: Severity::Error,
            kind: IssueKind::TradeValidation,
            message: error.to_string(),
        }
    }

    pub fn pnl_omitted(deal_id: &str, reason: impl fmt::Display) -> Self {
        Self {
            deal_id: Some(deal_id.to_string()),
            severity: Severity::Warning,
            kind: IssueKind::CurveLookup,
            message: format!("P&L omitted: {}", reason),
        }
    }

    pub fn clamped(deal_id: &str, message: impl Into<String>) -> Self {
        Self {
            deal_id: Some(deal_id.to_string()),
            severity: Severity::Info,
            kind: IssueKind::InterpolationRange,
            message: message.into(),
        }
    }

    pub fn curve_row_skipped(message: impl Into<String>) -> Self {
        Self {
            deal_id: None,
            severity: Severity::Warning,
            kind: IssueKind::CurveInput,
            message: message.into(),
        }
    }
}

impl fmt::Display for RunIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.deal_id {
            Some(id) => write!(f, "[{}] {}: {}", self.severity, id, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Append-only list of issues collected during one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunIssues {
    issues: Vec<RunIssue>,
}

impl RunIssues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: RunIssue) {
        self.issues.push(issue);
    }

    pub fn as_slice(&self) -> &[RunIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn for_deal<'a>(&'a self, deal_id: &'a str) -> impl Iterator<Item = &'a RunIssue> + 'a {
        self.issues
            .iter()
            .filter(move |i| i.deal_id.as_deref() == Some(deal_id))
    }
}

impl Extend<RunIssue> for RunIssues {
    fn extend<T: IntoIterator<Item = RunIssue>>(&mut self, iter: T) {
        self.issues.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_rejected_issue() {
        let err = TradeError::MissingMaturityDate {
            deal_id: "SW-1".to_string(),
            deal_type: DealType::FxSwap,
        };
        let issue = RunIssue::trade_rejected(&err);
        assert_eq!(issue.deal_id.as_deref(), Some("SW-1"));
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.kind, IssueKind::TradeValidation);
        assert!(issue.message.contains("FX Swap requires a maturity date"));
    }

    #[test]
    fn test_issue_without_deal_id() {
        let err = TradeError::MissingField {
            deal_id: String::new(),
            field: "Deal Id",
        };
        let issue = RunIssue::trade_rejected(&err);
        assert!(issue.deal_id.is_none());
    }

    #[test]
    fn test_run_issues_counts() {
        let mut issues = RunIssues::new();
        issues.push(RunIssue::pnl_omitted("A", "no curve"));
        issues.push(RunIssue::clamped("A", "clamped"));
        issues.push(RunIssue::curve_row_skipped("bad row"));

        assert_eq!(issues.len(), 3);
        assert_eq!(issues.count(Severity::Warning), 2);
        assert_eq!(issues.count(Severity::Info), 1);
        assert_eq!(issues.for_deal("A").count(), 2);
    }
}
