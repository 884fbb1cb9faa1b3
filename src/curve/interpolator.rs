use crate::core::currency::CurrencyPair;
use crate::curve::quote::ForwardPointQuote;
use crate::curve::store::{Bracket, ForwardCurve, ForwardCurveStore};
use crate::error::CurveError;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// What to do with a target date outside the quoted settlement dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Flat extrapolation: use the nearest boundary quote.
    #[default]
    Clamp,
    /// Fail the lookup with [`CurveError::OutOfRange`].
    Reject,
}

/// Which end of the curve a clamped lookup was pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampSide {
    First,
    Last,
}

/// Forward points for one pair on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolatedPoint {
    pub pair: CurrencyPair,
    pub date: NaiveDate,
    pub bid: Decimal,
    pub ask: Decimal,
    /// Set when the date fell outside the quoted range and was clamped.
    pub clamped: Option<ClampSide>,
}

impl InterpolatedPoint {
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

/// Linear, date-based interpolation of forward points.
///
/// The interpolator borrows a loaded [`ForwardCurveStore`] and never
/// mutates it, so lookups are pure.
///
/// # Algorithm
///
/// 1. Find the curve for the pair.
/// 2. An exact settlement-date hit returns that quote's points.
/// 3. Between two quotes, `f = (target - low) / (high - low)` in calendar
///    days and `points = low + f * (high - low)`, rounded to the curve's
///    precision only at the end.
/// 4. Outside the quoted range the [`BoundaryPolicy`] applies.
///
/// # Examples
///
/// ```
/// use fx_cashflow_engine::curve::interpolator::PointsInterpolator;
/// use fx_cashflow_engine::curve::quote::ForwardPointQuote;
/// use fx_cashflow_engine::curve::store::{ForwardCurve, ForwardCurveStore};
/// use fx_cashflow_engine::curve::tenor::Tenor;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let pair = "EUR/USD".parse().unwrap();
/// let curve = ForwardCurve::new(
///     pair,
///     vec![
///         ForwardPointQuote::new(Tenor::Spot, d(1, 2), dec!(0), dec!(0)),
///         ForwardPointQuote::new(Tenor::Months(1), d(2, 2), dec!(20), dec!(25)),
///     ],
/// )
/// .unwrap();
/// let store: ForwardCurveStore = vec![curve].into_iter().collect();
///
/// let interpolator = PointsInterpolator::new(&store);
/// let point = interpolator
///     .interpolate(&"EUR/USD".parse().unwrap(), d(1, 17))
///     .unwrap();
/// assert_eq!(point.bid, dec!(9.6774));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PointsInterpolator<'a> {
    store: &'a ForwardCurveStore,
    policy: BoundaryPolicy,
}

impl<'a> PointsInterpolator<'a> {
    pub fn new(store: &'a ForwardCurveStore) -> Self {
        Self {
            store,
            policy: BoundaryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn store(&self) -> &'a ForwardCurveStore {
        self.store
    }

    /// Interpolated (bid, ask) points for `pair` on `target`.
    pub fn interpolate(
        &self,
        pair: &CurrencyPair,
        target: NaiveDate,
    ) -> Result<InterpolatedPoint, CurveError> {
        let curve = self.store.curve(pair)?;
        interpolate_curve(curve, target, self.policy)
    }

    /// Spot rate of `pair` from the loaded curve.
    pub fn spot_rate(&self, pair: &CurrencyPair) -> Result<Decimal, CurveError> {
        self.store.spot_rate(pair)
    }
}

/// Interpolate a single curve. See [`PointsInterpolator`].
pub fn interpolate_curve(
    curve: &ForwardCurve,
    target: NaiveDate,
    policy: BoundaryPolicy,
) -> Result<InterpolatedPoint, CurveError> {
    let point = |quote: &ForwardPointQuote, clamped| InterpolatedPoint {
        pair: curve.pair().clone(),
        date: target,
        bid: quote.bid_points,
        ask: quote.ask_points,
        clamped,
    };

    let out_of_range = || CurveError::OutOfRange {
        pair: curve.pair().clone(),
        date: target,
        first: curve.first().settlement_date,
        last: curve.last().settlement_date,
    };

    match curve.bracket(target) {
        Bracket::Exact(quote) => Ok(point(quote, None)),
        Bracket::BeforeFirst(quote) => match policy {
            BoundaryPolicy::Clamp => Ok(point(quote, Some(ClampSide::First))),
            BoundaryPolicy::Reject => Err(out_of_range()),
        },
        Bracket::AfterLast(quote) => match policy {
            BoundaryPolicy::Clamp => Ok(point(quote, Some(ClampSide::Last))),
            BoundaryPolicy::Reject => Err(out_of_range()),
        },
        Bracket::Between(low, high) => {
            let span = (high.settlement_date - low.settlement_date).num_days();
            let elapsed = (target - low.settlement_date).num_days();
            let fraction = Decimal::from(elapsed) / Decimal::from(span);
            let precision = curve.precision();

            let lerp = |lo: Decimal, hi: Decimal| {
                (lo + fraction * (hi - lo))
                    .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
            };

            Ok(InterpolatedPoint {
                pair: curve.pair().clone(),
                date: target,
                bid: lerp(low.bid_points, high.bid_points),
                ask: lerp(low.ask_points, high.ask_points),
                clamped: None,
            })
        }
    }
}
