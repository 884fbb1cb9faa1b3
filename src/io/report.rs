//! Report output: aggregated CSV, HTML pages and the JSON run summary.
//!
//! HTML pages are produced by substituting `{{PLACEHOLDER}}` markers in a
//! template. Built-in templates are compiled into the binary; a custom
//! template only needs to contain the markers it wants filled.

use crate::aggregation::aggregator::CashflowTotals;
use crate::aggregation::horizon::HorizonBucket;
use crate::error::PipelineError;
use crate::pipeline::RunReport;
use log::info;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_CASHFLOW_TEMPLATE: &str = include_str!("../../templates/cashflows.html");
pub const DEFAULT_SUMMARY_TEMPLATE: &str = include_str!("../../templates/horizon_summary.html");

/// Write the aggregated totals as `Date,Currency,Cashflow` rows.
pub fn write_cashflow_csv<W: Write>(writer: W, totals: &CashflowTotals) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Date", "Currency", "Cashflow"])?;
    for row in totals.rows() {
        wtr.write_record([
            row.value_date.format("%d/%m/%Y").to_string(),
            row.currency.to_string(),
            row.amount.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Fill the cashflow report template.
pub fn render_cashflow_html(template: &str, report: &RunReport) -> String {
    let cashflow_rows: String = report
        .totals
        .rows()
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td>{}</tr>\n",
                row.value_date.format("%Y-%m-%d"),
                escape_html(row.currency.as_str()),
                amount_cell(row.amount)
            )
        })
        .collect();

    let pnl_rows: String = report
        .pnl
        .iter()
        .map(|(currency, pnl)| {
            format!(
                "<tr><td>{}</td>{}</tr>\n",
                escape_html(currency.as_str()),
                amount_cell(*pnl)
            )
        })
        .collect();

    let fx_rows: String = report
        .spot_rates
        .iter()
        .map(|(pair, rate)| {
            format!(
                "<tr><td>{}</td><td class=\"amount\">{}</td></tr>\n",
                escape_html(pair),
                format_rate(*rate)
            )
        })
        .collect();

    let issue_rows: String = report
        .issues
        .as_slice()
        .iter()
        .map(|issue| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                issue.severity,
                escape_html(issue.deal_id.as_deref().unwrap_or("-")),
                escape_html(&issue.message)
            )
        })
        .collect();

    template
        .replace("{{CASHFLOW_TABLE}}", &or_empty(cashflow_rows, 3, "No cashflows"))
        .replace("{{PNL_TABLE}}", &or_empty(pnl_rows, 2, "No P&amp;L computed"))
        .replace("{{FX_RATES_TABLE}}", &or_empty(fx_rows, 2, "No spot rates loaded"))
        .replace("{{ISSUES_TABLE}}", &or_empty(issue_rows, 3, "No issues"))
}

/// Fill the horizon summary template.
pub fn render_horizon_html(template: &str, report: &RunReport) -> String {
    let horizon = &report.horizon;
    let currencies = horizon.currencies();

    let mut table = String::from("<tr><th>Period</th>");
    for currency in &currencies {
        table.push_str(&format!("<th>{}</th>", escape_html(currency.as_str())));
    }
    table.push_str("</tr>\n");

    for bucket in HorizonBucket::ALL {
        table.push_str(&format!("<tr><td>{}</td>", bucket.label()));
        for currency in &currencies {
            table.push_str(&amount_cell(horizon.total(bucket, currency)));
        }
        table.push_str("</tr>\n");
    }

    let pnl_items = js_pairs(
        report
            .pnl
            .iter()
            .map(|(ccy, pnl)| (ccy.as_str(), round2(*pnl))),
    );
    let fx_rates = js_pairs(report.spot_rates.iter().map(|(pair, rate)| (pair.as_str(), *rate)));

    template
        .replace("{{PERIOD_TABLE}}", &table)
        .replace("{{PNL_ITEMS}}", &pnl_items)
        .replace("{{FX_RATES}}", &fx_rates)
        .replace(
            "{{REFERENCE_DATE}}",
            &horizon.reference_date().format("%Y-%m-%d").to_string(),
        )
}

/// Writes report files into one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    out_dir: PathBuf,
    cashflow_template: String,
    summary_template: String,
}

impl ReportWriter {
    /// Create the writer, creating `out_dir` if needed.
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir).map_err(|source| PipelineError::Output {
            path: out_dir.clone(),
            source,
        })?;
        Ok(Self {
            out_dir,
            cashflow_template: DEFAULT_CASHFLOW_TEMPLATE.to_string(),
            summary_template: DEFAULT_SUMMARY_TEMPLATE.to_string(),
        })
    }

    pub fn with_cashflow_template(mut self, template: String) -> Self {
        self.cashflow_template = template;
        self
    }

    pub fn with_summary_template(mut self, template: String) -> Self {
        self.summary_template = template;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn write_csv(&self, name: &str, report: &RunReport) -> Result<PathBuf, PipelineError> {
        let path = self.out_dir.join(name);
        let file = fs::File::create(&path).map_err(|source| PipelineError::Output {
            path: path.clone(),
            source,
        })?;
        write_cashflow_csv(file, &report.totals).map_err(|e| PipelineError::Output {
            path: path.clone(),
            source: e.into(),
        })?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    pub fn write_cashflow_html(&self, name: &str, report: &RunReport) -> Result<PathBuf, PipelineError> {
        self.write_text(name, &render_cashflow_html(&self.cashflow_template, report))
    }

    pub fn write_summary_html(&self, name: &str, report: &RunReport) -> Result<PathBuf, PipelineError> {
        self.write_text(name, &render_horizon_html(&self.summary_template, report))
    }

    pub fn write_json(&self, name: &str, report: &RunReport) -> Result<PathBuf, PipelineError> {
        let json = report.to_json().map_err(|e| PipelineError::Output {
            path: self.out_dir.join(name),
            source: e.into(),
        })?;
        self.write_text(name, &json)
    }

    fn write_text(&self, name: &str, content: &str) -> Result<PathBuf, PipelineError> {
        let path = self.out_dir.join(name);
        fs::write(&path, content).map_err(|source| PipelineError::Output {
            path: path.clone(),
            source,
        })?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}

/// Read a user-supplied template.
pub fn load_template(path: impl AsRef<Path>) -> Result<String, PipelineError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| PipelineError::InputFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Format an amount with thousands separators and two decimals.
///
/// ```
/// use fx_cashflow_engine::io::report::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(-1234567.005)), "-1,234,567.01");
/// assert_eq!(format_amount(dec!(12)), "12.00");
/// ```
pub fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", round2(amount).abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !round2(amount).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn format_rate(rate: Decimal) -> String {
    format!(
        "{:.6}",
        rate.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn amount_cell(amount: Decimal) -> String {
    let class = if amount.is_sign_negative() && !amount.is_zero() {
        "amount negative"
    } else {
        "amount"
    };
    format!("<td class=\"{}\">{}</td>", class, format_amount(amount))
}

fn or_empty(rows: String, colspan: usize, message: &str) -> String {
    if rows.is_empty() {
        format!("<tr><td colspan=\"{}\">{}</td></tr>", colspan, message)
    } else {
        rows
    }
}

/// `[["label", value], ...]` for embedding in a script block.
fn js_pairs<'a>(items: impl Iterator<Item = (&'a str, Decimal)>) -> String {
    let entries: Vec<String> = items
        .map(|(label, value)| {
            let label = serde_json::to_string(label).unwrap_or_else(|_| "\"\"".to_string());
            format!("[{}, {}]", label.replace("</", "<\\/"), value)
        })
        .collect();
    format!("[{}]", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trade::{DealType, TradeRecord};
    use crate::pipeline::{Pipeline, RunConfig};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn report() -> RunReport {
        let trades = vec![
            TradeRecord::new(
                "D-1",
                DealType::Spot,
                "EUR/USD".parse().unwrap(),
                dec!(1_000_000),
                dec!(-1_100_000),
                d(1, 2),
            ),
            TradeRecord::new(
                "<S-1>",
                DealType::FxSwap,
                "EUR/USD".parse().unwrap(),
                dec!(1),
                dec!(-1),
                d(1, 2),
            ),
        ];
        Pipeline::new(RunConfig::new(d(1, 1))).run(&trades, None)
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(999.999)), "1,000.00");
        assert_eq!(format_amount(dec!(1000000)), "1,000,000.00");
        assert_eq!(format_amount(dec!(-1100000)), "-1,100,000.00");
        assert_eq!(format_amount(dec!(123456.5)), "123,456.50");
        assert_eq!(format_amount(dec!(-0.001)), "0.00");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_cashflow_csv(&mut buf, &report().totals).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Currency,Cashflow");
        assert_eq!(lines[1], "02/01/2024,EUR,1000000");
        assert_eq!(lines[2], "02/01/2024,USD,-1100000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_cashflow_html() {
        let html = render_cashflow_html(DEFAULT_CASHFLOW_TEMPLATE, &report());
        assert!(!html.contains("{{"));
        assert!(html.contains("<td class=\"amount\">1,000,000.00</td>"));
        assert!(html.contains("<td class=\"amount negative\">-1,100,000.00</td>"));
        assert!(html.contains("No P&amp;L computed"));
        assert!(html.contains("&lt;S-1&gt;"));
        assert!(!html.contains("<S-1>"));
    }

    #[test]
    fn test_custom_template_only_fills_its_markers() {
        let html = render_cashflow_html("<table>{{PNL_TABLE}}</table>", &report());
        assert_eq!(
            html,
            "<table><tr><td colspan=\"2\">No P&amp;L computed</td></tr></table>"
        );
    }

    #[test]
    fn test_horizon_html() {
        let html = render_horizon_html(DEFAULT_SUMMARY_TEMPLATE, &report());
        assert!(!html.contains("{{"));
        assert!(html.contains("<tr><th>Period</th><th>EUR</th><th>USD</th></tr>"));
        assert!(html.contains("<td>Next 1W</td><td class=\"amount\">1,000,000.00</td>"));
        assert!(html.contains("const pnlItems = [];"));
        assert!(html.contains("Reference date: 2024-01-01"));
    }

    #[test]
    fn test_js_pairs() {
        let items = vec![("USD", dec!(6500.00)), ("EUR", dec!(-1.5))];
        assert_eq!(
            js_pairs(items.into_iter()),
            r#"[["USD", 6500.00], ["EUR", -1.5]]"#
        );
    }

    #[test]
    fn test_writer_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("out")).unwrap();
        let report = report();

        let csv = writer.write_csv("agg.csv", &report).unwrap();
        let json = writer.write_json("run.json", &report).unwrap();
        assert!(csv.exists());

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(value["counts"]["rejected"], 1);
    }
}
