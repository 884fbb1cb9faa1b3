//! Principal cashflows for a small book, without forward points.
//!
//! Shows how spot, swap and outright deals expand into dated legs and
//! how those legs roll up by settlement date and horizon bucket.

use chrono::NaiveDate;
use fx_cashflow_engine::prelude::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn main() {
    println!("=== fx-cashflow-engine: Spot and Swap Example ===\n");

    let eurusd: CurrencyPair = "EUR/USD".parse().unwrap();
    let usdjpy: CurrencyPair = "USD/JPY".parse().unwrap();

    let trades = vec![
        TradeRecord::new(
            "SP-001",
            DealType::Spot,
            eurusd.clone(),
            dec!(1_000_000),
            dec!(-1_100_000),
            date(2024, 1, 4),
        )
        .with_counterparty("BANK-A")
        .with_folder("FX-DESK"),
        TradeRecord::new(
            "SW-001",
            DealType::FxSwap,
            usdjpy.clone(),
            dec!(-2_000_000),
            dec!(282_240_000),
            date(2024, 1, 4),
        )
        .with_counterparty("BANK-B")
        .with_folder("TREASURY")
        .with_maturity_date(date(2024, 2, 5)),
        TradeRecord::new(
            "FW-001",
            DealType::OutrightForward,
            eurusd,
            dec!(-500_000),
            dec!(552_500),
            date(2024, 1, 4),
        )
        .with_counterparty("BANK-A")
        .with_folder("FX-DESK")
        .with_maturity_date(date(2024, 4, 4)),
        TradeRecord::new(
            "SW-002",
            DealType::FxSwap,
            usdjpy,
            dec!(1_000_000),
            dec!(-141_000_000),
            date(2024, 1, 4),
        )
        .with_folder("TEST"),
    ];

    // --- Per-trade legs ---
    println!("--- Generated legs ---\n");
    let generator = CashflowGenerator::new();
    for trade in &trades {
        match generator.generate(trade) {
            Ok(flows) => {
                for cf in &flows.cashflows {
                    println!("  {}", cf);
                }
            }
            Err(e) => println!("  rejected: {}", e),
        }
    }
    println!();

    // --- Full run, ignoring the TEST folder ---
    let filter = TradeFilter::accept_all().with_ignored_folders(["TEST"]);
    let config = RunConfig::new(date(2024, 1, 2)).with_filter(filter);
    let report = Pipeline::new(config).run(&trades, None);

    println!("{}", report);

    println!("--- Totals by currency and date ---\n");
    for row in report.totals.rows() {
        println!("  {}  {:<4} {:>18}", row.value_date, row.currency, row.amount);
    }
    println!();

    println!("--- Horizon buckets ---\n");
    for (bucket, totals) in report.horizon.buckets() {
        for (ccy, amount) in totals {
            println!("  {:<12} {:<4} {:>18}", bucket, ccy, amount);
        }
    }
}
