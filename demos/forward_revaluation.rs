//! Mark-to-market of forwards and swaps against a forward-points curve.
//!
//! Builds a EUR/USD curve by hand, looks up interpolated points and
//! shows the P&L attached to the quote-currency legs.

use chrono::NaiveDate;
use fx_cashflow_engine::curve::quote::ForwardPointQuote;
use fx_cashflow_engine::curve::tenor::Tenor;
use fx_cashflow_engine::prelude::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn main() {
    println!("=== fx-cashflow-engine: Forward Revaluation Example ===\n");

    let eurusd: CurrencyPair = "EUR/USD".parse().unwrap();
    let curve = ForwardCurve::new(
        eurusd.clone(),
        vec![
            ForwardPointQuote::new(Tenor::Spot, date(2024, 1, 4), dec!(0), dec!(0))
                .with_outrights(dec!(1.0998), dec!(1.1002)),
            ForwardPointQuote::new(Tenor::Months(1), date(2024, 2, 5), dec!(12.1), dec!(12.9)),
            ForwardPointQuote::new(Tenor::Months(3), date(2024, 4, 4), dec!(38.5), dec!(39.5)),
            ForwardPointQuote::new(Tenor::Months(6), date(2024, 7, 4), dec!(77.0), dec!(79.0)),
        ],
    )
    .unwrap();
    let store: ForwardCurveStore = std::iter::once(curve).collect();

    // --- Interpolated points ---
    println!("--- Interpolated points ---\n");
    let interpolator = PointsInterpolator::new(&store);
    for target in [date(2024, 1, 4), date(2024, 3, 1), date(2024, 5, 15), date(2024, 12, 31)] {
        match interpolator.interpolate(&eurusd, target) {
            Ok(point) => println!(
                "  {}  bid {:>8}  ask {:>8}  mid {:>8}{}",
                target,
                point.bid,
                point.ask,
                point.mid(),
                if point.clamped.is_some() { "  (clamped)" } else { "" }
            ),
            Err(e) => println!("  {}  {}", target, e),
        }
    }
    println!();

    let trades = vec![
        TradeRecord::new(
            "FW-100",
            DealType::OutrightForward,
            eurusd.clone(),
            dec!(1_000_000),
            dec!(-1_100_000),
            date(2024, 1, 4),
        )
        .with_maturity_date(date(2024, 4, 4)),
        TradeRecord::new(
            "SW-100",
            DealType::FxSwap,
            eurusd,
            dec!(2_000_000),
            dec!(-2_200_000),
            date(2024, 1, 4),
        )
        .with_maturity_date(date(2024, 2, 5))
        .with_contract_points(dec!(10)),
    ];

    // --- Revalued legs ---
    println!("--- Revalued legs ---\n");
    let generator = CashflowGenerator::with_interpolator(interpolator);
    for trade in &trades {
        if let Ok(flows) = generator.generate(trade) {
            for cf in &flows.cashflows {
                match cf.pnl() {
                    Some(pnl) => println!("  {}  P&L {}", cf, pnl),
                    None => println!("  {}", cf),
                }
            }
        }
    }
    println!();

    // --- Full run under each boundary policy ---
    for policy in [BoundaryPolicy::Clamp, BoundaryPolicy::Reject] {
        let config = RunConfig::new(date(2024, 1, 2)).with_boundary_policy(policy);
        let report = Pipeline::new(config).run(&trades, Some(&store));
        println!("--- Policy {:?} ---\n", policy);
        for (ccy, pnl) in &report.pnl {
            println!("  P&L {:<4} {:>14}", ccy, pnl);
        }
        for issue in report.issues.as_slice() {
            println!("  {}", issue);
        }
        println!();
    }
}
