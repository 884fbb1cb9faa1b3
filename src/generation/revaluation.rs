//! Mark-to-market of forward legs against the interpolated points curve.
//!
//! All results are in quote-currency units of the trade's pair.

use crate::core::trade::TradeRecord;
use crate::curve::interpolator::{InterpolatedPoint, PointsInterpolator};
use crate::error::CurveError;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Outcome of revaluing one forward leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revaluation {
    /// Signed P&L in the quote currency.
    pub pnl: Decimal,
    /// Curve lookups that were used, in the order they were made.
    pub lookups: Vec<InterpolatedPoint>,
}

impl Revaluation {
    /// Lookups that fell outside the quoted range.
    pub fn clamped_lookups(&self) -> impl Iterator<Item = &InterpolatedPoint> {
        self.lookups.iter().filter(|p| p.clamped.is_some())
    }
}

/// Revalue an outright forward settling on `settlement`.
///
/// Market outright = spot + mid points / divisor. The P&L is what the base
/// leg is worth at the market outright net of the quote leg dealt:
/// `amount1 * market + amount2`, i.e. `amount1 * (market - dealt rate)`.
pub fn revalue_outright(
    trade: &TradeRecord,
    settlement: NaiveDate,
    interpolator: &PointsInterpolator<'_>,
) -> Result<Revaluation, CurveError> {
    let pair = trade.pair();
    let spot = interpolator.spot_rate(pair)?;
    let point = interpolator.interpolate(pair, settlement)?;

    let market_outright = spot + pair.points_to_rate(point.mid());
    let pnl = trade.amount1() * market_outright + trade.amount2();

    Ok(Revaluation {
        pnl: pair.quote.normalize(pnl),
        lookups: vec![point],
    })
}

/// Revalue the far leg of an FX swap.
///
/// Market swap points are the mid-points differential between the near
/// and far settlement dates. The far leg pays back `amount1` of base, so
/// `pnl = -amount1 * (market points - contract points) / divisor`.
pub fn revalue_swap(
    trade: &TradeRecord,
    maturity: NaiveDate,
    contract_points: Decimal,
    interpolator: &PointsInterpolator<'_>,
) -> Result<Revaluation, CurveError> {
    let pair = trade.pair();
    let near = interpolator.interpolate(pair, trade.value_date())?;
    let far = interpolator.interpolate(pair, maturity)?;

    let market_points = far.mid() - near.mid();
    let pnl = -trade.amount1() * pair.points_to_rate(market_points - contract_points);

    Ok(Revaluation {
        pnl: pair.quote.normalize(pnl),
        lookups: vec![near, far],
    })
}
