use crate::curve::tenor::Tenor;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a forward-points table.
///
/// Points are in pips of the pair (see
/// [`CurrencyPair::points_divisor`](crate::core::currency::CurrencyPair::points_divisor)).
/// Outrights are optional: most tables only carry them for the spot row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardPointQuote {
    pub tenor: Tenor,
    pub settlement_date: NaiveDate,
    pub bid_points: Decimal,
    pub ask_points: Decimal,
    pub bid_outright: Option<Decimal>,
    pub ask_outright: Option<Decimal>,
}

impl ForwardPointQuote {
    pub fn new(
        tenor: Tenor,
        settlement_date: NaiveDate,
        bid_points: Decimal,
        ask_points: Decimal,
    ) -> Self {
        Self {
            tenor,
            settlement_date,
            bid_points,
            ask_points,
            bid_outright: None,
            ask_outright: None,
        }
    }

    pub fn with_outrights(mut self, bid: Decimal, ask: Decimal) -> Self {
        self.bid_outright = Some(bid);
        self.ask_outright = Some(ask);
        self
    }

    pub fn mid_points(&self) -> Decimal {
        (self.bid_points + self.ask_points) / Decimal::TWO
    }

    /// Mid of the quoted outrights, if both sides are present.
    pub fn mid_outright(&self) -> Option<Decimal> {
        match (self.bid_outright, self.ask_outright) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Largest decimal scale used by the points of this quote.
    pub fn points_scale(&self) -> u32 {
        self.bid_points.scale().max(self.ask_points.scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spot_quote() -> ForwardPointQuote {
        ForwardPointQuote::new(
            Tenor::Spot,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            dec!(0),
            dec!(0),
        )
        .with_outrights(dec!(1.0998), dec!(1.1002))
    }

    #[test]
    fn test_mid_outright() {
        assert_eq!(spot_quote().mid_outright(), Some(dec!(1.1000)));
    }

    #[test]
    fn test_mid_outright_requires_both_sides() {
        let mut quote = spot_quote();
        quote.ask_outright = None;
        assert_eq!(quote.mid_outright(), None);
    }

    #[test]
    fn test_mid_points_and_scale() {
        let quote = ForwardPointQuote::new(
            Tenor::Months(1),
            NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            dec!(20.25),
            dec!(25.5),
        );
        assert_eq!(quote.mid_points(), dec!(22.875));
        assert_eq!(quote.points_scale(), 2);
    }
}
