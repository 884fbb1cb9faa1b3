use crate::core::currency::CurrencyPair;
use crate::error::TradeError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The transaction types the converter understands.
///
/// Each variant has exactly one cashflow handler in
/// [`CashflowGenerator`](crate::generation::generator::CashflowGenerator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealType {
    Spot,
    FxSwap,
    OutrightForward,
}

impl DealType {
    pub fn label(&self) -> &'static str {
        match self {
            DealType::Spot => "Spot",
            DealType::FxSwap => "FX Swap",
            DealType::OutrightForward => "Outright Forward",
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DealType {
    type Err = String;

    /// Accepts the labels used in trade-detail exports, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "spot" => Ok(DealType::Spot),
            "fx swap" | "fxswap" | "swap" => Ok(DealType::FxSwap),
            "outright forward" | "outright" | "forward" => Ok(DealType::OutrightForward),
            _ => Err(s.to_string()),
        }
    }
}

/// One deal from the trade-detail table.
///
/// Records are immutable once built. Field-level validation (parsing of
/// amounts, dates and the currency pair) happens in the loader; deal-type
/// specific requirements such as the maturity date of a swap are checked
/// by the generator.
///
/// # Examples
///
/// ```
/// use fx_cashflow_engine::core::trade::{DealType, TradeRecord};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let trade = TradeRecord::new(
///     "D-1",
///     DealType::Spot,
///     "EUR/USD".parse().unwrap(),
///     dec!(1_000_000),
///     dec!(-1_100_000),
///     NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
/// );
/// assert_eq!(trade.deal_id(), "D-1");
/// assert!(trade.maturity_date().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    deal_id: String,
    counterparty: String,
    deal_type: DealType,
    folder: String,
    pair: CurrencyPair,
    /// Base-currency notional, signed from our side.
    amount1: Decimal,
    /// Quote-currency notional, signed from our side.
    amount2: Decimal,
    trade_date: Option<NaiveDate>,
    value_date: NaiveDate,
    maturity_date: Option<NaiveDate>,
    /// Contracted points from the `Rate/Price` column.
    contract_points: Option<Decimal>,
}

impl TradeRecord {
    pub fn new(
        deal_id: impl Into<String>,
        deal_type: DealType,
        pair: CurrencyPair,
        amount1: Decimal,
        amount2: Decimal,
        value_date: NaiveDate,
    ) -> Self {
        Self {
            deal_id: deal_id.into(),
            counterparty: String::new(),
            deal_type,
            folder: String::new(),
            pair,
            amount1,
            amount2,
            trade_date: None,
            value_date,
            maturity_date: None,
            contract_points: None,
        }
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = counterparty.into();
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_trade_date(mut self, date: NaiveDate) -> Self {
        self.trade_date = Some(date);
        self
    }

    pub fn with_maturity_date(mut self, date: NaiveDate) -> Self {
        self.maturity_date = Some(date);
        self
    }

    pub fn with_contract_points(mut self, points: Decimal) -> Self {
        self.contract_points = Some(points);
        self
    }

    // --- Accessors ---

    pub fn deal_id(&self) -> &str {
        &self.deal_id
    }

    pub fn counterparty(&self) -> &str {
        &self.counterparty
    }

    pub fn deal_type(&self) -> DealType {
        self.deal_type
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    pub fn amount1(&self) -> Decimal {
        self.amount1
    }

    pub fn amount2(&self) -> Decimal {
        self.amount2
    }

    pub fn trade_date(&self) -> Option<NaiveDate> {
        self.trade_date
    }

    pub fn value_date(&self) -> NaiveDate {
        self.value_date
    }

    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.maturity_date
    }

    pub fn contract_points(&self) -> Option<Decimal> {
        self.contract_points
    }

    /// Maturity date, or a validation error naming this deal.
    pub fn require_maturity(&self) -> Result<NaiveDate, TradeError> {
        self.maturity_date
            .ok_or_else(|| TradeError::MissingMaturityDate {
                deal_id: self.deal_id.clone(),
                deal_type: self.deal_type,
            })
    }

    /// Rate dealt on the trade, in quote units per base unit.
    ///
    /// `None` when the base notional is zero.
    pub fn implied_rate(&self) -> Option<Decimal> {
        if self.amount1.is_zero() {
            None
        } else {
            Some((self.amount2 / self.amount1).abs())
        }
    }
}
