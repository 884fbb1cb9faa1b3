use crate::core::currency::CurrencyCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which exchange of a deal a cashflow belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LegRole {
    /// First exchange of an FX swap.
    Near,
    /// Second exchange of an FX swap.
    Far,
    /// Single exchange of a spot or outright forward deal.
    Settlement,
}

impl fmt::Display for LegRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LegRole::Near => "near",
            LegRole::Far => "far",
            LegRole::Settlement => "settlement",
        };
        f.write_str(label)
    }
}

/// A dated cash movement in one currency.
///
/// Positive amounts are received, negative amounts are paid. A cashflow is
/// produced from exactly one trade and never changes afterwards.
///
/// # Examples
///
/// ```
/// use fx_cashflow_engine::core::cashflow::{Cashflow, LegRole};
/// use fx_cashflow_engine::core::currency::CurrencyCode;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let cf = Cashflow::new(
///     "D-1",
///     CurrencyCode::new("EUR"),
///     dec!(1_000_000),
///     NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
///     LegRole::Settlement,
/// );
/// assert!(cf.pnl().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cashflow {
    deal_id: String,
    currency: CurrencyCode,
    amount: Decimal,
    value_date: NaiveDate,
    leg: LegRole,
    /// Revaluation P&L in this cashflow's currency, when a curve was used.
    pnl: Option<Decimal>,
}

impl Cashflow {
    pub fn new(
        deal_id: impl Into<String>,
        currency: CurrencyCode,
        amount: Decimal,
        value_date: NaiveDate,
        leg: LegRole,
    ) -> Self {
        Self {
            deal_id: deal_id.into(),
            currency,
            amount,
            value_date,
            leg,
            pnl: None,
        }
    }

    /// Attach a revaluation P&L component.
    pub fn with_pnl(mut self, pnl: Decimal) -> Self {
        self.pnl = Some(pnl);
        self
    }

    pub fn deal_id(&self) -> &str {
        &self.deal_id
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn value_date(&self) -> NaiveDate {
        self.value_date
    }

    pub fn leg(&self) -> LegRole {
        self.leg
    }

    pub fn pnl(&self) -> Option<Decimal> {
        self.pnl
    }
}

impl fmt::Display for Cashflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {} ({})",
            self.deal_id, self.currency, self.amount, self.value_date, self.leg
        )?;
        if let Some(pnl) = self.pnl {
            write!(f, " pnl {}", pnl)?;
        }
        Ok(())
    }
}
