//! Synthetic trade books and forward curves.
//!
//! Used by the benchmarks and the integration tests to exercise the
//! pipeline with realistic volumes.

use crate::core::currency::CurrencyPair;
use crate::core::trade::{DealType, TradeRecord};
use crate::curve::quote::ForwardPointQuote;
use crate::curve::store::{ForwardCurve, ForwardCurveStore};
use crate::curve::tenor::Tenor;
use crate::error::CurveError;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// Tenors quoted on every generated curve, after the spot row.
const CURVE_TENORS: [Tenor; 8] = [
    Tenor::Weeks(1),
    Tenor::Weeks(2),
    Tenor::Months(1),
    Tenor::Months(2),
    Tenor::Months(3),
    Tenor::Months(6),
    Tenor::Months(9),
    Tenor::Years(1),
];

/// Configuration for generating a random trade book.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Number of trades to generate.
    pub trade_count: usize,
    /// Pairs traded, each with its spot rate.
    pub pairs: Vec<(CurrencyPair, Decimal)>,
    /// Trade date of every deal; spot settles two days later.
    pub trade_date: NaiveDate,
    /// Longest forward or swap maturity, in days after spot.
    pub max_tenor_days: i64,
    /// Minimum base notional.
    pub min_notional: i64,
    /// Maximum base notional.
    pub max_notional: i64,
    /// Folders trades are booked into.
    pub folders: Vec<String>,
}

impl Default for BookConfig {
    fn default() -> Self {
        let pair = |s: &str| s.parse::<CurrencyPair>().ok();
        Self {
            trade_count: 100,
            pairs: [
                (pair("EUR/USD"), Decimal::new(11000, 4)),
                (pair("USD/JPY"), Decimal::new(14112, 2)),
                (pair("GBP/USD"), Decimal::new(12700, 4)),
            ]
            .into_iter()
            .filter_map(|(p, rate)| p.map(|p| (p, rate)))
            .collect(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default(),
            max_tenor_days: 365,
            min_notional: 100_000,
            max_notional: 10_000_000,
            folders: vec!["FX-DESK".to_string(), "TREASURY".to_string()],
        }
    }
}

impl BookConfig {
    pub fn spot_date(&self) -> NaiveDate {
        self.trade_date + Duration::days(2)
    }
}

/// Generate a random trade book with the thread-local RNG.
pub fn generate_trade_book(config: &BookConfig) -> Vec<TradeRecord> {
    generate_trade_book_with(config, &mut rand::thread_rng())
}

/// Generate a random trade book from the given RNG.
///
/// Deal types are drawn uniformly. Quote amounts are dealt at the pair's
/// spot rate, so amount1 and amount2 always have opposite signs.
pub fn generate_trade_book_with<R: Rng>(config: &BookConfig, rng: &mut R) -> Vec<TradeRecord> {
    if config.pairs.is_empty() || config.max_notional <= config.min_notional {
        return Vec::new();
    }

    let spot_date = config.spot_date();
    (0..config.trade_count)
        .map(|i| {
            let (pair, rate) = &config.pairs[rng.gen_range(0..config.pairs.len())];
            let notional = Decimal::from(rng.gen_range(config.min_notional..config.max_notional));
            let amount1 = if rng.gen_bool(0.5) { notional } else { -notional };
            let amount2 = pair.quote.normalize((-amount1 * *rate).round_dp(2));

            let deal_type = match rng.gen_range(0..3) {
                0 => DealType::Spot,
                1 => DealType::FxSwap,
                _ => DealType::OutrightForward,
            };

            let mut trade = TradeRecord::new(
                format!("SYN-{:05}", i),
                deal_type,
                pair.clone(),
                amount1,
                amount2,
                spot_date,
            )
            .with_counterparty(format!("CPTY-{:02}", rng.gen_range(0..20)))
            .with_trade_date(config.trade_date);

            if let Some(folder) = config.folders.get(rng.gen_range(0..config.folders.len().max(1))) {
                trade = trade.with_folder(folder.as_str());
            }
            if deal_type != DealType::Spot {
                let days = rng.gen_range(1..=config.max_tenor_days.max(1));
                trade = trade.with_maturity_date(spot_date + Duration::days(days));
            }
            if deal_type == DealType::FxSwap {
                trade = trade.with_contract_points(Decimal::from(rng.gen_range(-50..150)));
            }
            trade
        })
        .collect()
}

/// Build a monotone forward curve for `pair` starting at `spot_date`.
///
/// Mid points grow by `points_per_day` per calendar day; bid and ask sit
/// half a point either side. The spot row carries outrights around `spot`.
pub fn generate_curve(
    pair: &CurrencyPair,
    spot: Decimal,
    spot_date: NaiveDate,
    points_per_day: Decimal,
) -> Result<ForwardCurve, CurveError> {
    let half_spread = Decimal::new(5, 1);
    let outright_spread = pair.points_to_rate(Decimal::TWO);

    let mut quotes = vec![ForwardPointQuote::new(
        Tenor::Spot,
        spot_date,
        Decimal::ZERO,
        Decimal::ZERO,
    )
    .with_outrights(spot - outright_spread, spot + outright_spread)];

    for tenor in CURVE_TENORS {
        let days = tenor.approx_days().unwrap_or_default();
        let mid = (points_per_day * Decimal::from(days)).round_dp(2);
        quotes.push(ForwardPointQuote::new(
            tenor,
            spot_date + Duration::days(days),
            mid - half_spread,
            mid + half_spread,
        ));
    }

    ForwardCurve::new(pair.clone(), quotes)
}

/// One generated curve per pair of the book.
pub fn generate_curve_store(config: &BookConfig) -> Result<ForwardCurveStore, CurveError> {
    let mut store = ForwardCurveStore::new();
    for (pair, spot) in &config.pairs {
        let slope = if pair.quote.as_str() == "JPY" {
            Decimal::new(-15, 2)
        } else {
            Decimal::new(2, 1)
        };
        store.insert(generate_curve(pair, *spot, config.spot_date(), slope)?);
    }
    Ok(store)
}
