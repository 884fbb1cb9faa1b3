use crate::core::currency::CurrencyCode;
use crate::curve::tenor::Tenor;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Time-to-settlement classification of a cashflow.
///
/// Buckets are ordered; a cashflow goes to the first bucket whose limit
/// covers its distance from the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HorizonBucket {
    /// On or before the reference date.
    Today,
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    BeyondOneYear,
}

impl HorizonBucket {
    pub const ALL: [HorizonBucket; 7] = [
        HorizonBucket::Today,
        HorizonBucket::OneWeek,
        HorizonBucket::OneMonth,
        HorizonBucket::ThreeMonths,
        HorizonBucket::SixMonths,
        HorizonBucket::OneYear,
        HorizonBucket::BeyondOneYear,
    ];

    /// Inclusive upper limit in days after the reference date.
    pub fn limit_days(&self) -> Option<i64> {
        match self {
            HorizonBucket::Today => Some(0),
            HorizonBucket::OneWeek => Tenor::Weeks(1).approx_days(),
            HorizonBucket::OneMonth => Tenor::Months(1).approx_days(),
            HorizonBucket::ThreeMonths => Tenor::Months(3).approx_days(),
            HorizonBucket::SixMonths => Tenor::Months(6).approx_days(),
            HorizonBucket::OneYear => Tenor::Years(1).approx_days(),
            HorizonBucket::BeyondOneYear => None,
        }
    }

    pub fn classify(reference: NaiveDate, date: NaiveDate) -> Self {
        let days = (date - reference).num_days();
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.limit_days().map_or(true, |limit| days <= limit))
            .unwrap_or(HorizonBucket::BeyondOneYear)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HorizonBucket::Today => "Today",
            HorizonBucket::OneWeek => "Next 1W",
            HorizonBucket::OneMonth => "Next 1M",
            HorizonBucket::ThreeMonths => "Next 3M",
            HorizonBucket::SixMonths => "Next 6M",
            HorizonBucket::OneYear => "Next 1Y",
            HorizonBucket::BeyondOneYear => "Beyond 1Y",
        }
    }
}

impl fmt::Display for HorizonBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Cashflow totals per horizon bucket and currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonSummary {
    reference_date: NaiveDate,
    buckets: BTreeMap<HorizonBucket, BTreeMap<CurrencyCode, Decimal>>,
}

impl HorizonSummary {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            buckets: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, currency: &CurrencyCode, date: NaiveDate, amount: Decimal) {
        let bucket = HorizonBucket::classify(self.reference_date, date);
        *self
            .buckets
            .entry(bucket)
            .or_default()
            .entry(currency.clone())
            .or_insert(Decimal::ZERO) += amount;
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Total for one bucket and currency (zero when nothing settles there).
    pub fn total(&self, bucket: HorizonBucket, currency: &CurrencyCode) -> Decimal {
        self.buckets
            .get(&bucket)
            .and_then(|per_ccy| per_ccy.get(currency))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Every currency that appears in any bucket, sorted.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut currencies: Vec<CurrencyCode> = self
            .buckets
            .values()
            .flat_map(|per_ccy| per_ccy.keys().cloned())
            .collect();
        currencies.sort();
        currencies.dedup();
        currencies
    }

    pub fn buckets(&self) -> &BTreeMap<HorizonBucket, BTreeMap<CurrencyCode, Decimal>> {
        &self.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        let r = d(2024, 1, 1);
        assert_eq!(HorizonBucket::classify(r, d(2023, 12, 1)), HorizonBucket::Today);
        assert_eq!(HorizonBucket::classify(r, r), HorizonBucket::Today);
        assert_eq!(HorizonBucket::classify(r, d(2024, 1, 2)), HorizonBucket::OneWeek);
        assert_eq!(HorizonBucket::classify(r, d(2024, 1, 8)), HorizonBucket::OneWeek);
        assert_eq!(HorizonBucket::classify(r, d(2024, 1, 9)), HorizonBucket::OneMonth);
        assert_eq!(HorizonBucket::classify(r, d(2024, 1, 31)), HorizonBucket::OneMonth);
        assert_eq!(HorizonBucket::classify(r, d(2024, 2, 1)), HorizonBucket::ThreeMonths);
        assert_eq!(HorizonBucket::classify(r, d(2024, 6, 29)), HorizonBucket::SixMonths);
        assert_eq!(HorizonBucket::classify(r, d(2024, 12, 30)), HorizonBucket::OneYear);
        assert_eq!(HorizonBucket::classify(r, d(2025, 1, 1)), HorizonBucket::BeyondOneYear);
    }

    #[test]
    fn test_buckets_are_ordered() {
        let mut sorted = HorizonBucket::ALL;
        sorted.sort();
        assert_eq!(sorted, HorizonBucket::ALL);
    }

    #[test]
    fn test_summary_accumulates() {
        let usd = CurrencyCode::new("USD");
        let eur = CurrencyCode::new("EUR");
        let mut summary = HorizonSummary::new(d(2024, 1, 1));
        summary.add(&usd, d(2024, 1, 3), dec!(100));
        summary.add(&usd, d(2024, 1, 5), dec!(-40));
        summary.add(&eur, d(2024, 3, 1), dec!(7));

        assert_eq!(summary.total(HorizonBucket::OneWeek, &usd), dec!(60));
        assert_eq!(summary.total(HorizonBucket::ThreeMonths, &eur), dec!(7));
        assert_eq!(summary.total(HorizonBucket::Today, &eur), Decimal::ZERO);
        assert_eq!(summary.currencies(), vec![eur, usd]);
    }
}
