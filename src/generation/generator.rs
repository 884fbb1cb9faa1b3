use crate::core::cashflow::{Cashflow, LegRole};
use crate::core::trade::{DealType, TradeRecord};
use crate::curve::interpolator::{ClampSide, PointsInterpolator};
use crate::error::{CurveError, RunIssue, TradeError};
use crate::generation::revaluation::{revalue_outright, revalue_swap, Revaluation};
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

/// Cashflows derived from one trade, plus any non-fatal issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFlows {
    pub cashflows: Vec<Cashflow>,
    pub issues: Vec<RunIssue>,
}

/// Maps trade records to dated cashflows.
///
/// Each [`DealType`] has one handler:
///
/// | Deal type        | Cashflows                                   | P&L           |
/// |------------------|---------------------------------------------|---------------|
/// | Spot             | 2 at value date                             | never         |
/// | Outright Forward | 2 at maturity date (value date if absent)   | quote leg     |
/// | FX Swap          | 2 near at value date, 2 reversed at maturity | far quote leg |
///
/// Without an interpolator the generator only produces principal flows.
/// Curve failures never drop principal flows: the P&L is omitted and a
/// warning issue is returned instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct CashflowGenerator<'a> {
    interpolator: Option<PointsInterpolator<'a>>,
}

impl<'a> CashflowGenerator<'a> {
    pub fn new() -> Self {
        Self { interpolator: None }
    }

    pub fn with_interpolator(interpolator: PointsInterpolator<'a>) -> Self {
        Self {
            interpolator: Some(interpolator),
        }
    }

    /// Produce the cashflows of one trade.
    pub fn generate(&self, trade: &TradeRecord) -> Result<GeneratedFlows, TradeError> {
        let flows = match trade.deal_type() {
            DealType::Spot => self.spot(trade),
            DealType::OutrightForward => self.outright_forward(trade),
            DealType::FxSwap => self.fx_swap(trade)?,
        };
        debug!(
            "deal {} ({}): {} cashflows",
            trade.deal_id(),
            trade.deal_type(),
            flows.cashflows.len()
        );
        Ok(flows)
    }

    fn spot(&self, trade: &TradeRecord) -> GeneratedFlows {
        GeneratedFlows {
            cashflows: leg_pair(
                trade,
                trade.value_date(),
                LegRole::Settlement,
                trade.amount1(),
                trade.amount2(),
            )
            .to_vec(),
            issues: Vec::new(),
        }
    }

    fn outright_forward(&self, trade: &TradeRecord) -> GeneratedFlows {
        let settlement = trade.maturity_date().unwrap_or_else(|| trade.value_date());
        let [base, quote] = leg_pair(
            trade,
            settlement,
            LegRole::Settlement,
            trade.amount1(),
            trade.amount2(),
        );

        let mut issues = Vec::new();
        let quote = match &self.interpolator {
            Some(interpolator) => {
                let reval = revalue_outright(trade, settlement, interpolator);
                attach_pnl(trade, quote, reval, &mut issues)
            }
            None => quote,
        };

        GeneratedFlows {
            cashflows: vec![base, quote],
            issues,
        }
    }

    fn fx_swap(&self, trade: &TradeRecord) -> Result<GeneratedFlows, TradeError> {
        let maturity = trade.require_maturity()?;
        if trade.amount1().is_zero() {
            return Err(TradeError::ZeroNotional {
                deal_id: trade.deal_id().to_string(),
                deal_type: trade.deal_type(),
            });
        }

        let near = leg_pair(
            trade,
            trade.value_date(),
            LegRole::Near,
            trade.amount1(),
            trade.amount2(),
        );
        let [far_base, far_quote] = leg_pair(
            trade,
            maturity,
            LegRole::Far,
            -trade.amount1(),
            -trade.amount2(),
        );

        let mut issues = Vec::new();
        let far_quote = match (&self.interpolator, trade.contract_points()) {
            (Some(interpolator), Some(points)) => {
                let reval = revalue_swap(trade, maturity, points, interpolator);
                attach_pnl(trade, far_quote, reval, &mut issues)
            }
            (Some(_), None) => {
                warn!("deal {}: no contract points, swap P&L omitted", trade.deal_id());
                issues.push(RunIssue::pnl_omitted(
                    trade.deal_id(),
                    "no contract swap points (Rate/Price)",
                ));
                far_quote
            }
            (None, _) => far_quote,
        };

        let mut cashflows = near.to_vec();
        cashflows.push(far_base);
        cashflows.push(far_quote);
        Ok(GeneratedFlows { cashflows, issues })
    }
}

/// Base and quote cashflows of one exchange, amounts normalized per currency.
fn leg_pair(
    trade: &TradeRecord,
    date: NaiveDate,
    leg: LegRole,
    base_amount: Decimal,
    quote_amount: Decimal,
) -> [Cashflow; 2] {
    let pair = trade.pair();
    [
        Cashflow::new(
            trade.deal_id(),
            pair.base.clone(),
            pair.base.normalize(base_amount),
            date,
            leg,
        ),
        Cashflow::new(
            trade.deal_id(),
            pair.quote.clone(),
            pair.quote.normalize(quote_amount),
            date,
            leg,
        ),
    ]
}

fn attach_pnl(
    trade: &TradeRecord,
    cashflow: Cashflow,
    revaluation: Result<Revaluation, CurveError>,
    issues: &mut Vec<RunIssue>,
) -> Cashflow {
    match revaluation {
        Ok(reval) => {
            for point in &reval.lookups {
                let side = match point.clamped {
                    Some(ClampSide::First) => "first",
                    Some(ClampSide::Last) => "last",
                    None => continue,
                };
                issues.push(RunIssue::clamped(
                    trade.deal_id(),
                    format!(
                        "{} on {} is outside the quoted tenors, {} quote used",
                        point.pair, point.date, side
                    ),
                ));
            }
            cashflow.with_pnl(reval.pnl)
        }
        Err(e) => {
            warn!("deal {}: {}", trade.deal_id(), e);
            issues.push(RunIssue::pnl_omitted(trade.deal_id(), &e));
            cashflow
        }
    }
}
