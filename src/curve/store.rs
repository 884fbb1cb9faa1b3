use crate::core::currency::CurrencyPair;
use crate::curve::quote::ForwardPointQuote;
use crate::error::CurveError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interpolated points are never rounded coarser than this.
pub const MIN_POINTS_PRECISION: u32 = 4;

/// Position of a date relative to the quoted settlement dates of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket<'a> {
    Exact(&'a ForwardPointQuote),
    Between(&'a ForwardPointQuote, &'a ForwardPointQuote),
    BeforeFirst(&'a ForwardPointQuote),
    AfterLast(&'a ForwardPointQuote),
}

/// The quoted forward points of one currency pair, sorted by settlement date.
///
/// # Examples
///
/// ```
/// use fx_cashflow_engine::curve::quote::ForwardPointQuote;
/// use fx_cashflow_engine::curve::store::ForwardCurve;
/// use fx_cashflow_engine::curve::tenor::Tenor;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let curve = ForwardCurve::new(
///     "EUR/USD".parse().unwrap(),
///     vec![
///         ForwardPointQuote::new(Tenor::Months(1), d(2, 2), dec!(20), dec!(25)),
///         ForwardPointQuote::new(Tenor::Spot, d(1, 2), dec!(0), dec!(0)),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(curve.first().settlement_date, d(1, 2));
/// assert_eq!(curve.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CurveData")]
pub struct ForwardCurve {
    pair: CurrencyPair,
    quotes: Vec<ForwardPointQuote>,
    precision: u32,
}

/// Serialized form of a curve; validated through [`ForwardCurve::new`].
#[derive(Deserialize)]
struct CurveData {
    pair: CurrencyPair,
    quotes: Vec<ForwardPointQuote>,
}

impl TryFrom<CurveData> for ForwardCurve {
    type Error = CurveError;

    fn try_from(data: CurveData) -> Result<Self, Self::Error> {
        ForwardCurve::new(data.pair, data.quotes)
    }
}

impl ForwardCurve {
    /// Build a curve, sorting quotes by settlement date.
    ///
    /// Fails on an empty quote set or on two quotes sharing a date.
    pub fn new(pair: CurrencyPair, mut quotes: Vec<ForwardPointQuote>) -> Result<Self, CurveError> {
        if quotes.is_empty() {
            return Err(CurveError::EmptyCurve { pair });
        }
        quotes.sort_by_key(|q| q.settlement_date);

        if let Some(dup) = quotes
            .windows(2)
            .find(|w| w[0].settlement_date == w[1].settlement_date)
        {
            return Err(CurveError::DuplicateSettlementDate {
                pair,
                date: dup[0].settlement_date,
            });
        }

        let precision = quotes
            .iter()
            .map(ForwardPointQuote::points_scale)
            .max()
            .unwrap_or(0)
            .max(MIN_POINTS_PRECISION);

        Ok(Self {
            pair,
            quotes,
            precision,
        })
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    pub fn quotes(&self) -> &[ForwardPointQuote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Decimal places interpolated points are rounded to.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn first(&self) -> &ForwardPointQuote {
        &self.quotes[0]
    }

    pub fn last(&self) -> &ForwardPointQuote {
        &self.quotes[self.quotes.len() - 1]
    }

    /// Locate `date` among the quoted settlement dates (binary search).
    pub fn bracket(&self, date: NaiveDate) -> Bracket<'_> {
        match self
            .quotes
            .binary_search_by_key(&date, |q| q.settlement_date)
        {
            Ok(i) => Bracket::Exact(&self.quotes[i]),
            Err(0) => Bracket::BeforeFirst(self.first()),
            Err(i) if i == self.quotes.len() => Bracket::AfterLast(self.last()),
            Err(i) => Bracket::Between(&self.quotes[i - 1], &self.quotes[i]),
        }
    }

    /// Spot rate: mid outright of the SP quote.
    ///
    /// Falls back to the earliest quote carrying both outrights, net of its
    /// own points, when no SP row exists.
    pub fn spot_rate(&self) -> Option<Decimal> {
        if let Some(spot) = self.quotes.iter().find(|q| q.tenor.is_spot()) {
            return spot.mid_outright();
        }
        self.quotes.iter().find_map(|q| {
            q.mid_outright()
                .map(|outright| outright - self.pair.points_to_rate(q.mid_points()))
        })
    }
}

/// All forward curves loaded for a run, keyed by currency pair.
#[derive(Debug, Clone, Default)]
pub struct ForwardCurveStore {
    curves: BTreeMap<CurrencyPair, ForwardCurve>,
}

impl ForwardCurveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a curve, replacing any previous curve for the same pair.
    pub fn insert(&mut self, curve: ForwardCurve) -> Option<ForwardCurve> {
        self.curves.insert(curve.pair().clone(), curve)
    }

    pub fn curve(&self, pair: &CurrencyPair) -> Result<&ForwardCurve, CurveError> {
        self.curves
            .get(pair)
            .ok_or_else(|| CurveError::CurveNotFound { pair: pair.clone() })
    }

    pub fn spot_rate(&self, pair: &CurrencyPair) -> Result<Decimal, CurveError> {
        self.curve(pair)?
            .spot_rate()
            .ok_or_else(|| CurveError::NoSpotRate { pair: pair.clone() })
    }

    /// Spot rates of every pair that has one, ordered by pair.
    pub fn spot_rates(&self) -> BTreeMap<CurrencyPair, Decimal> {
        self.curves
            .iter()
            .filter_map(|(pair, curve)| curve.spot_rate().map(|r| (pair.clone(), r)))
            .collect()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &CurrencyPair> {
        self.curves.keys()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl FromIterator<ForwardCurve> for ForwardCurveStore {
    fn from_iter<T: IntoIterator<Item = ForwardCurve>>(iter: T) -> Self {
        let mut store = Self::new();
        for curve in iter {
            store.insert(curve);
        }
        store
    }
}
