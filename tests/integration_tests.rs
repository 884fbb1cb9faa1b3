use chrono::NaiveDate;
use fx_cashflow_engine::aggregation::horizon::HorizonBucket;
use fx_cashflow_engine::core::cashflow::LegRole;
use fx_cashflow_engine::core::currency::CurrencyCode;
use fx_cashflow_engine::curve::interpolator::{BoundaryPolicy, PointsInterpolator};
use fx_cashflow_engine::error::{IssueKind, PipelineError, Severity, TradeError};
use fx_cashflow_engine::io::filter::{FilterConfig, TradeFilter};
use fx_cashflow_engine::io::points_loader::{load_points, parse_points};
use fx_cashflow_engine::io::report::ReportWriter;
use fx_cashflow_engine::io::trade_loader::{load_trades, read_trades};
use fx_cashflow_engine::pipeline::{Pipeline, RunConfig};
use fx_cashflow_engine::simulation::synthetic::{generate_curve_store, generate_trade_book, BookConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs;

const HEADER: &str =
    "Deal Id,Cpty.,Type of Deal,Folder,Security,Amount1,Amount2,Trade Date,Value Date,Mat. Date,Rate/Price";

const POINTS: &str = "\
EURUSD Tenor,SettlementDate,BidPoints,AskPoints,BidOutright,AskOutright
SP,2024-01-02,0,0,1.0998,1.1002
1M,2024-02-02,20,25,,
3M,2024-04-02,60,70,,
";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn table(rows: &[&str]) -> String {
    let mut csv = String::from(HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

/// Spot EUR/USD trade: two flows at value date, aggregated as-is.
#[test]
fn spot_trade_end_to_end() {
    let csv = table(&["D-1,BANK A,Spot,FX,EUR/USD,1000000,-1100000,29/12/2023,02/01/2024,,"]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1))).run_loaded(&trades, None);

    assert_eq!(report.cashflows.len(), 2);
    let eur = &report.cashflows[0];
    let usd = &report.cashflows[1];
    assert_eq!(eur.currency(), &CurrencyCode::new("EUR"));
    assert_eq!(eur.amount(), dec!(1_000_000));
    assert_eq!(eur.value_date(), d(2024, 1, 2));
    assert_eq!(usd.currency(), &CurrencyCode::new("USD"));
    assert_eq!(usd.amount(), dec!(-1_100_000));
    assert!(eur.pnl().is_none() && usd.pnl().is_none());

    let rows = report.totals.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].currency.as_str(), rows[0].amount), ("EUR", dec!(1000000)));
    assert_eq!((rows[1].currency.as_str(), rows[1].amount), ("USD", dec!(-1100000)));
}

/// A swap without a maturity date is rejected on its own; the batch goes on.
#[test]
fn missing_maturity_only_rejects_that_swap() {
    let csv = table(&[
        "D-1,BANK A,Spot,FX,EUR/USD,1000000,-1100000,,02/01/2024,,",
        "S-1,BANK B,FX Swap,FX,EUR/USD,500000,-550000,,02/01/2024,,60",
        "F-1,BANK C,Outright Forward,FX,USD/JPY,1000000,-141000000,,02/01/2024,02/04/2024,",
    ]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1))).run_loaded(&trades, None);

    assert_eq!(report.counts.read, 3);
    assert_eq!(report.counts.converted, 2);
    assert_eq!(report.counts.rejected, 1);
    assert_eq!(report.cashflows.len(), 4);
    assert!(report.cashflows.iter().all(|cf| cf.deal_id() != "S-1"));

    let issue = report.issues.for_deal("S-1").next().unwrap();
    assert_eq!(issue.kind, IssueKind::TradeValidation);
    assert_eq!(issue.severity, Severity::Error);

    let jpy = CurrencyCode::new("JPY");
    assert_eq!(report.totals.total(&jpy, d(2024, 4, 2)), dec!(-141_000_000));
}

/// Swap with a curve: four flows, far legs reverse the near legs, P&L on
/// the far quote leg.
#[test]
fn swap_with_curve() {
    let csv = table(&["S-1,BANK B,FX Swap,FX,EUR/USD,1000000,-1100000,,02/01/2024,02/04/2024,60"]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    let curves = parse_points(POINTS).unwrap();

    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1))).run_loaded(&trades, Some(&curves));
    assert_eq!(report.cashflows.len(), 4);

    let near: Decimal = report
        .cashflows
        .iter()
        .filter(|cf| cf.leg() == LegRole::Near && cf.currency().as_str() == "EUR")
        .map(|cf| cf.amount())
        .sum();
    let far: Decimal = report
        .cashflows
        .iter()
        .filter(|cf| cf.leg() == LegRole::Far && cf.currency().as_str() == "EUR")
        .map(|cf| cf.amount())
        .sum();
    assert_eq!(near, -far);

    // Market swap points 65 vs 60 dealt.
    assert_eq!(report.pnl[&CurrencyCode::new("USD")], dec!(-500));
    assert_eq!(report.spot_rates["EUR/USD"], dec!(1.1000));
}

/// A forward beyond the last quote is clamped by default and reported.
#[test]
fn clamped_forward_reports_info_issue() {
    let csv = table(&["F-1,BANK,Outright Forward,FX,EUR/USD,1000000,-1100000,,02/01/2024,02/07/2024,"]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    let curves = parse_points(POINTS).unwrap();

    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1))).run_loaded(&trades, Some(&curves));
    assert_eq!(report.pnl[&CurrencyCode::new("USD")], dec!(6500));

    let issues: Vec<_> = report.issues.for_deal("F-1").collect();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::InterpolationRange);
    assert_eq!(issues[0].severity, Severity::Info);

    let strict = RunConfig::new(d(2024, 1, 1)).with_boundary_policy(BoundaryPolicy::Reject);
    let report = Pipeline::new(strict).run_loaded(&trades, Some(&curves));
    assert_eq!(report.cashflows.len(), 2);
    assert!(report.pnl.is_empty());
    assert_eq!(report.issues.for_deal("F-1").next().unwrap().kind, IssueKind::CurveLookup);
}

/// Unknown pair on the curve: principal flows kept, P&L dropped with a warning.
#[test]
fn missing_curve_keeps_principal() {
    let csv = table(&["F-1,BANK,Outright Forward,FX,GBP/USD,1000000,-1270000,,02/01/2024,02/04/2024,"]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    let curves = parse_points(POINTS).unwrap();

    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1))).run_loaded(&trades, Some(&curves));
    assert_eq!(report.counts.converted, 1);
    assert_eq!(report.cashflows.len(), 2);
    assert_eq!(report.issues.count(Severity::Warning), 1);
}

#[test]
fn interpolation_example_between_spot_and_one_month() {
    let curves = parse_points(POINTS).unwrap();
    let interpolator = PointsInterpolator::new(&curves.store);
    let point = interpolator
        .interpolate(&"EUR/USD".parse().unwrap(), d(2024, 1, 17))
        .unwrap();

    assert!(point.bid > dec!(0) && point.bid < dec!(20));
    assert_eq!(point.bid, dec!(9.6774));
    assert!(point.clamped.is_none());
}

#[test]
fn folder_filter_and_cli_override() {
    let csv = table(&[
        "D-1,X,Spot,FX-DESK,EUR/USD,1,-1.1,,02/01/2024,,",
        "D-2,X,Spot,TEST,EUR/USD,1,-1.1,,02/01/2024,,",
        "D-3,X,Spot,LEGACY,EUR/USD,1,-1.1,,02/01/2024,,",
    ]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    let config = FilterConfig::from_json(r#"{"ignore_folders": ["TEST"]}"#).unwrap();

    let from_file = TradeFilter::from_config(&config);
    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1)).with_filter(from_file.clone()))
        .run_loaded(&trades, None);
    assert_eq!(report.counts.filtered_out, 1);
    assert_eq!(report.counts.converted, 2);

    let overridden = from_file.with_ignored_folders(["LEGACY", "FX-DESK"]);
    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1)).with_filter(overridden))
        .run_loaded(&trades, None);
    assert_eq!(report.counts.filtered_out, 2);
    assert_eq!(report.cashflows[0].deal_id(), "D-2");
}

#[test]
fn horizon_summary_buckets() {
    let csv = table(&[
        "D-1,X,Spot,F,EUR/USD,100,-110,,02/01/2024,,",
        "F-1,X,Outright Forward,F,EUR/USD,200,-220,,02/01/2024,02/03/2024,",
        "F-2,X,Outright Forward,F,EUR/USD,300,-330,,02/01/2024,02/01/2026,",
    ]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    let report = Pipeline::new(RunConfig::new(d(2024, 1, 2))).run_loaded(&trades, None);

    let eur = CurrencyCode::new("EUR");
    assert_eq!(report.horizon.total(HorizonBucket::Today, &eur), dec!(100));
    assert_eq!(report.horizon.total(HorizonBucket::ThreeMonths, &eur), dec!(200));
    assert_eq!(report.horizon.total(HorizonBucket::BeyondOneYear, &eur), dec!(300));
}

#[test]
fn files_round_trip_through_cli_components() {
    let dir = tempfile::tempdir().unwrap();
    let trades_path = dir.path().join("trades.csv");
    let points_path = dir.path().join("points.csv");
    fs::write(
        &trades_path,
        table(&[
            "D-1,BANK A,Spot,FX,EUR/USD,\"1,000,000\",\"-1,100,000\",29/12/2023,02/01/2024,,",
            "F-1,BANK B,Outright Forward,FX,EUR/USD,1000000,-1100000,29/12/2023,02/01/2024,02/04/2024,",
        ]),
    )
    .unwrap();
    fs::write(&points_path, POINTS).unwrap();

    let trades = load_trades(&trades_path).unwrap();
    let curves = load_points(&points_path).unwrap();
    let report = Pipeline::new(RunConfig::new(d(2024, 1, 1))).run_loaded(&trades, Some(&curves));

    let writer = ReportWriter::new(dir.path().join("generatedFile")).unwrap();
    let csv_path = writer.write_csv("cashflows_agg.csv", &report).unwrap();
    let html_path = writer.write_cashflow_html("cashflows.html", &report).unwrap();
    let summary_path = writer
        .write_summary_html("cashflows_horizon_summary.html", &report)
        .unwrap();

    let csv = fs::read_to_string(csv_path).unwrap();
    assert!(csv.starts_with("Date,Currency,Cashflow"));
    assert!(csv.contains("02/01/2024,EUR,1000000"));
    assert!(csv.contains("02/04/2024,USD,-1100000"));

    let html = fs::read_to_string(html_path).unwrap();
    assert!(html.contains("6,500.00"));
    assert!(html.contains("EUR/USD"));

    let summary = fs::read_to_string(summary_path).unwrap();
    assert!(summary.contains(r#"const pnlItems = [["USD", 6500.00]];"#));
}

#[test]
fn missing_input_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_trades(dir.path().join("nope.csv"));
    assert!(matches!(result, Err(PipelineError::InputFile { .. })));
}

#[test]
fn missing_column_is_fatal_before_any_trade() {
    let csv = "Deal Id,Type of Deal,Security,Amount1,Amount2,Value Date\nD-1,Spot,EUR/USD,1,-1,02/01/2024\n";
    match read_trades(csv.as_bytes()) {
        Err(PipelineError::Schema { column, .. }) => assert_eq!(column, "Cpty."),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn unparseable_amount_rejects_the_trade() {
    let csv = table(&["D-1,X,Spot,F,EUR/USD,1.000.000,-1,,02/01/2024,,"]);
    let trades = read_trades(csv.as_bytes()).unwrap();
    assert!(trades.trades.is_empty());
    assert!(matches!(
        trades.rejected[0],
        TradeError::InvalidAmount { field: "Amount1", .. }
    ));
}

#[test]
fn synthetic_book_runs_cleanly() {
    let config = BookConfig {
        trade_count: 500,
        ..Default::default()
    };
    let trades = generate_trade_book(&config);
    let store = generate_curve_store(&config).unwrap();

    let report = Pipeline::new(RunConfig::new(config.trade_date)).run(&trades, Some(&store));
    assert_eq!(report.counts.converted, 500);
    assert_eq!(report.counts.rejected, 0);
    assert!(!report.has_errors());
}
