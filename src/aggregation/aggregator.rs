use crate::aggregation::horizon::HorizonSummary;
use crate::core::cashflow::Cashflow;
use crate::core::currency::CurrencyCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the aggregated cashflow table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedCashflow {
    pub value_date: NaiveDate,
    pub currency: CurrencyCode,
    pub amount: Decimal,
}

/// Cashflow totals keyed by (value date, currency).
///
/// Iteration is ordered by date, then currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowTotals {
    #[serde(with = "totals_serde")]
    totals: BTreeMap<(NaiveDate, CurrencyCode), Decimal>,
}

mod totals_serde {
    use super::*;
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;

    pub fn serialize<S: serde::Serializer>(
        totals: &BTreeMap<(NaiveDate, CurrencyCode), Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(totals.len()))?;
        for ((date, currency), amount) in totals {
            map.serialize_entry(&format!("{}:{}", currency, date), amount)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(NaiveDate, CurrencyCode), Decimal>, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = BTreeMap<(NaiveDate, CurrencyCode), Decimal>;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map with \"currency:date\" keys")
            }
            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut map = BTreeMap::new();
                while let Some((key, value)) = access.next_entry::<String, Decimal>()? {
                    let (currency, date) = key
                        .split_once(':')
                        .ok_or_else(|| de::Error::custom(format!("invalid key: {key}")))?;
                    let date = date
                        .parse::<NaiveDate>()
                        .map_err(|e| de::Error::custom(format!("invalid date in {key}: {e}")))?;
                    map.insert((date, CurrencyCode::new(currency)), value);
                }
                Ok(map)
            }
        }
        deserializer.deserialize_map(V)
    }
}

impl CashflowTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, currency: &CurrencyCode, date: NaiveDate, amount: Decimal) {
        *self
            .totals
            .entry((date, currency.clone()))
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Total for one currency on one date (zero when nothing settles).
    pub fn total(&self, currency: &CurrencyCode, date: NaiveDate) -> Decimal {
        self.totals
            .get(&(date, currency.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Rows ordered by date, then currency.
    pub fn rows(&self) -> Vec<AggregatedCashflow> {
        self.totals
            .iter()
            .map(|((date, currency), amount)| AggregatedCashflow {
                value_date: *date,
                currency: currency.clone(),
                amount: *amount,
            })
            .collect()
    }

    /// Net of all dates for one currency.
    pub fn currency_total(&self, currency: &CurrencyCode) -> Decimal {
        self.totals
            .iter()
            .filter(|((_, c), _)| c == currency)
            .map(|(_, amount)| *amount)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Groups cashflows into reporting views.
///
/// Summation uses exact decimals, so the totals do not depend on the
/// order cashflows arrive in. No filtering happens here.
pub struct Aggregator;

impl Aggregator {
    /// Totals grouped by (currency, value date).
    pub fn by_currency_and_date<'a>(
        cashflows: impl IntoIterator<Item = &'a Cashflow>,
    ) -> CashflowTotals {
        let mut totals = CashflowTotals::new();
        for cf in cashflows {
            totals.add(cf.currency(), cf.value_date(), cf.amount());
        }
        totals
    }

    /// Totals grouped by (horizon bucket, currency) relative to `reference`.
    pub fn by_horizon<'a>(
        cashflows: impl IntoIterator<Item = &'a Cashflow>,
        reference: NaiveDate,
    ) -> HorizonSummary {
        let mut summary = HorizonSummary::new(reference);
        for cf in cashflows {
            summary.add(cf.currency(), cf.value_date(), cf.amount());
        }
        summary
    }

    /// Revaluation P&L summed per currency. Cashflows without P&L are skipped.
    pub fn pnl_by_currency<'a>(
        cashflows: impl IntoIterator<Item = &'a Cashflow>,
    ) -> BTreeMap<CurrencyCode, Decimal> {
        let mut pnl: BTreeMap<CurrencyCode, Decimal> = BTreeMap::new();
        for cf in cashflows {
            if let Some(amount) = cf.pnl() {
                *pnl.entry(cf.currency().clone()).or_insert(Decimal::ZERO) += amount;
            }
        }
        pnl
    }
}
