use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ISO 4217-style currency code.
///
/// Codes are stored upper-cased so that `eur` and `EUR` compare equal.
///
/// # Examples
///
/// ```
/// use fx_cashflow_engine::core::currency::CurrencyCode;
///
/// let eur = CurrencyCode::new("eur");
/// assert_eq!(eur.as_str(), "EUR");
/// assert_ne!(eur, CurrencyCode::new("USD"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal places cashflows in this currency settle with,
    /// when the currency has no minor unit. `None` keeps the input precision.
    pub fn minor_units(&self) -> Option<u32> {
        match self.0.as_str() {
            "JPY" => Some(0),
            _ => None,
        }
    }

    /// Round an amount to the settlement precision of this currency.
    pub fn normalize(&self, amount: Decimal) -> Decimal {
        match self.minor_units() {
            Some(dp) => amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
            None => amount,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from currency pair parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    #[error("currency pair '{0}' is not of the form CCY1/CCY2 or CCY1CCY2")]
    Malformed(String),
    #[error("currency pair '{0}' has the same base and quote currency")]
    SameCurrency(String),
}

/// An ordered pair of currencies: `base/quote`.
///
/// A rate on this pair is the number of quote units per one base unit.
///
/// # Examples
///
/// ```
/// use fx_cashflow_engine::core::currency::CurrencyPair;
///
/// let a: CurrencyPair = "EUR/USD".parse().unwrap();
/// let b: CurrencyPair = "EURUSD".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "EUR/USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self { base, quote }
    }

    /// Number of forward points per unit of outright rate.
    ///
    /// JPY-based pairs trade at very small rates and are pointed at 1e-6.
    /// Every other pair, JPY-quoted ones included, uses 1e-4.
    pub fn points_divisor(&self) -> Decimal {
        if self.base.as_str() == "JPY" {
            Decimal::from(1_000_000)
        } else {
            Decimal::from(10_000)
        }
    }

    /// Convert a points value into an outright rate increment.
    pub fn points_to_rate(&self, points: Decimal) -> Decimal {
        points / self.points_divisor()
    }
}

impl FromStr for CurrencyPair {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim();
        let (base, quote) = match cleaned.split_once('/') {
            Some((b, q)) => (b.trim(), q.trim()),
            None if cleaned.len() == 6 && cleaned.is_ascii() => cleaned.split_at(3),
            None => return Err(PairError::Malformed(s.to_string())),
        };

        let valid = |c: &str| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic());
        if !valid(base) || !valid(quote) {
            return Err(PairError::Malformed(s.to_string()));
        }

        let pair = Self::new(CurrencyCode::new(base), CurrencyCode::new(quote));
        if pair.base == pair.quote {
            return Err(PairError::SameCurrency(s.to_string()));
        }
        Ok(pair)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
