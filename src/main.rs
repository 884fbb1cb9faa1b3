//! fx-cashflow CLI
//!
//! Convert a trade-detail export into aggregated cashflow reports.
//!
//! # Usage
//!
//! ```bash
//! # Principal cashflows only
//! fx-cashflow --input trades.csv
//!
//! # With forward-points revaluation and a folder filter
//! fx-cashflow --input trades.csv --points-csv points.csv --filter-config filter.json
//!
//! # Command-line folders replace the config's ignore list
//! fx-cashflow --input trades.csv --ignore-folders TEST,ARCHIVE --out-json run.json
//! ```
//!
//! Set `RUST_LOG=debug` for per-trade logging.

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use fx_cashflow_engine::curve::interpolator::BoundaryPolicy;
use fx_cashflow_engine::error::PipelineError;
use fx_cashflow_engine::io::filter::{FilterConfig, TradeFilter};
use fx_cashflow_engine::io::points_loader::load_points;
use fx_cashflow_engine::io::report::{load_template, ReportWriter};
use fx_cashflow_engine::io::trade_loader::load_trades;
use fx_cashflow_engine::pipeline::{Pipeline, RunConfig};
use log::info;
use std::path::PathBuf;
use std::process;

/// Convert FX trades into dated, aggregated cashflows
#[derive(Parser, Debug)]
#[command(name = "fx-cashflow", version, about)]
struct Cli {
    /// Trade-detail CSV file
    #[arg(long)]
    input: PathBuf,

    /// Forward-points CSV file (enables P&L revaluation)
    #[arg(long = "points-csv")]
    points_csv: Option<PathBuf>,

    /// Comma-separated folders to ignore (overrides the filter config list)
    #[arg(long = "ignore-folders", value_delimiter = ',')]
    ignore_folders: Option<Vec<String>>,

    /// JSON filter configuration file
    #[arg(long = "filter-config")]
    filter_config: Option<PathBuf>,

    /// Output directory
    #[arg(long = "out-dir", default_value = "generatedFile")]
    out_dir: PathBuf,

    /// Aggregated cashflow CSV file name
    #[arg(long = "out-csv", default_value = "cashflows_agg.csv")]
    out_csv: String,

    /// Cashflow HTML report file name
    #[arg(long = "out-html", default_value = "cashflows.html")]
    out_html: String,

    /// Horizon summary HTML file name
    #[arg(long = "out-html-summary", default_value = "cashflows_horizon_summary.html")]
    out_html_summary: String,

    /// JSON run summary file name (not written unless given)
    #[arg(long = "out-json")]
    out_json: Option<String>,

    /// Custom cashflow HTML template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Custom horizon summary HTML template
    #[arg(long = "template-summary")]
    template_summary: Option<PathBuf>,

    /// Horizon reference date, YYYY-MM-DD (default: today)
    #[arg(long = "reference-date")]
    reference_date: Option<NaiveDate>,

    /// Handling of dates outside the quoted forward-points range
    #[arg(long = "boundary-policy", value_enum, default_value = "clamp")]
    boundary_policy: PolicyArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Clamp,
    Reject,
}

impl From<PolicyArg> for BoundaryPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Clamp => BoundaryPolicy::Clamp,
            PolicyArg::Reject => BoundaryPolicy::Reject,
        }
    }
}

fn build_config(cli: &Cli) -> Result<RunConfig, PipelineError> {
    let mut filter = match &cli.filter_config {
        Some(path) => TradeFilter::from_config(&FilterConfig::load(path)?),
        None => TradeFilter::accept_all(),
    };
    if let Some(folders) = &cli.ignore_folders {
        filter = filter.with_ignored_folders(folders);
    }

    let reference_date = cli
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());

    Ok(RunConfig::new(reference_date)
        .with_filter(filter)
        .with_boundary_policy(cli.boundary_policy.into()))
}

fn run(cli: &Cli) -> Result<(), PipelineError> {
    let config = build_config(cli)?;

    let trades = load_trades(&cli.input)?;
    let curves = cli.points_csv.as_ref().map(load_points).transpose()?;

    let report = Pipeline::new(config).run_loaded(&trades, curves.as_ref());

    let mut writer = ReportWriter::new(&cli.out_dir)?;
    if let Some(path) = &cli.template {
        writer = writer.with_cashflow_template(load_template(path)?);
    }
    if let Some(path) = &cli.template_summary {
        writer = writer.with_summary_template(load_template(path)?);
    }

    let csv_path = writer.write_csv(&cli.out_csv, &report)?;
    let html_path = writer.write_cashflow_html(&cli.out_html, &report)?;
    let summary_path = writer.write_summary_html(&cli.out_html_summary, &report)?;
    if let Some(name) = &cli.out_json {
        writer.write_json(name, &report)?;
    }

    info!("run complete: {} issues", report.issues.len());
    println!("{}", report);
    println!("Aggregated cashflow CSV: {}", csv_path.display());
    println!("Cashflow HTML:           {}", html_path.display());
    println!("Horizon summary HTML:    {}", summary_path.display());
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
