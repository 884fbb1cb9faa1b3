//! Forward-points table loader.
//!
//! Two layouts are accepted. A single table whose first header cell names
//! the pair:
//!
//! ```text
//! EUR/USD Tenor,SettlementDate,BidPoints,AskPoints,BidOutright,AskOutright
//! SP,2024-01-02,0,0,1.0998,1.1002
//! 1M,2024-02-02,20,25,,
//! ```
//!
//! or several blank-line separated sections, each headed by a pair line:
//!
//! ```text
//! EUR/USD
//! Tenor,SettlementDate,BidPoints,AskPoints,BidOutright,AskOutright
//! SP,2024/01/02,0,0,1.0998,1.1002
//!
//! USD/JPY
//! Tenor,SettlementDate,BidPoints,AskPoints,BidOutright,AskOutright
//! SP,2024/01/02,0,0,141.10,141.14
//! ```

use crate::core::currency::CurrencyPair;
use crate::curve::quote::ForwardPointQuote;
use crate::curve::store::{ForwardCurve, ForwardCurveStore};
use crate::curve::tenor::Tenor;
use crate::error::{PipelineError, RunIssue};
use crate::io::trade_loader::parse_amount;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const TABLE: &str = "forward points";

/// Curves built from a points table plus the rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedCurves {
    pub store: ForwardCurveStore,
    pub issues: Vec<RunIssue>,
}

pub fn load_points(path: impl AsRef<Path>) -> Result<LoadedCurves, PipelineError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| PipelineError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse_points(&content)?;
    info!(
        "loaded {} forward curves from {}",
        loaded.store.len(),
        path.display()
    );
    Ok(loaded)
}

/// Parse a points table from its text content.
pub fn parse_points(content: &str) -> Result<LoadedCurves, PipelineError> {
    let content = content.trim_start_matches('\u{feff}');
    let sections = split_sections(content);

    let mut quotes: BTreeMap<CurrencyPair, Vec<ForwardPointQuote>> = BTreeMap::new();
    let mut issues = Vec::new();

    let single_table = sections
        .first()
        .and_then(|s| s.first())
        .map_or(false, |line| line.contains("Tenor") && line.contains("SettlementDate"));

    if single_table {
        let lines = sections.concat();
        let header = lines.first().copied().unwrap_or_default();
        let pair = infer_pair(header).ok_or_else(|| PipelineError::Schema {
            table: TABLE,
            column: "<PAIR> Tenor".to_string(),
        })?;
        let rows = parse_section(&pair, &lines, &mut issues)?;
        quotes.entry(pair).or_default().extend(rows);
    } else {
        for section in &sections {
            let Some((pair_line, table)) = section.split_first() else {
                continue;
            };
            let label = pair_line.trim().trim_matches(',').trim();
            let pair = match CurrencyPair::from_str(label) {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("skipping points section '{}': {}", label, e);
                    issues.push(RunIssue::curve_row_skipped(format!(
                        "section '{}' skipped: {}",
                        label, e
                    )));
                    continue;
                }
            };
            if table.is_empty() {
                continue;
            }
            let rows = parse_section(&pair, table, &mut issues)?;
            quotes.entry(pair).or_default().extend(rows);
        }
    }

    let mut store = ForwardCurveStore::new();
    for (pair, rows) in quotes {
        if rows.is_empty() {
            issues.push(RunIssue::curve_row_skipped(format!(
                "no usable quotes for {}",
                pair
            )));
            continue;
        }
        debug!("{}: {} quotes", pair, rows.len());
        store.insert(ForwardCurve::new(pair, rows)?);
    }

    Ok(LoadedCurves { store, issues })
}

/// Split text into non-empty line groups separated by blank lines.
fn split_sections(content: &str) -> Vec<Vec<&str>> {
    let mut sections = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        if line.trim().trim_matches(',').trim().is_empty() {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

/// Pair named in the first header cell, e.g. `EURUSD Tenor` or `USD/CAD Tenor`.
fn infer_pair(header: &str) -> Option<CurrencyPair> {
    let first = header.split(',').next()?.trim().trim_matches('"');
    let label = first.strip_suffix("Tenor")?.trim();
    CurrencyPair::from_str(label).ok()
}

struct Columns {
    tenor: usize,
    settlement: usize,
    bid_points: Option<usize>,
    ask_points: Option<usize>,
    bid_outright: Option<usize>,
    ask_outright: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, PipelineError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let missing = |column: &str| PipelineError::Schema {
            table: TABLE,
            column: column.to_string(),
        };

        let columns = Self {
            tenor: headers
                .iter()
                .position(|h| h.ends_with("Tenor"))
                .ok_or_else(|| missing("Tenor"))?,
            settlement: find("SettlementDate").ok_or_else(|| missing("SettlementDate"))?,
            bid_points: find("BidPoints"),
            ask_points: find("AskPoints"),
            bid_outright: find("BidOutright"),
            ask_outright: find("AskOutright"),
        };
        if columns.bid_points.is_none() && columns.ask_points.is_none() {
            return Err(missing("BidPoints"));
        }
        Ok(columns)
    }
}

fn parse_section(
    pair: &CurrencyPair,
    lines: &[&str],
    issues: &mut Vec<RunIssue>,
) -> Result<Vec<ForwardPointQuote>, PipelineError> {
    let text = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| PipelineError::Csv { table: TABLE, source })?
        .clone();
    let columns = Columns::locate(&headers)?;

    let mut quotes = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| PipelineError::Csv { table: TABLE, source })?;
        match parse_quote(&record, &columns) {
            Ok(quote) => quotes.push(quote),
            Err(reason) => {
                warn!("{}: skipping points row {:?}: {}", pair, record, reason);
                issues.push(RunIssue::curve_row_skipped(format!(
                    "{} row skipped: {}",
                    pair, reason
                )));
            }
        }
    }
    Ok(quotes)
}

fn parse_quote(record: &csv::StringRecord, columns: &Columns) -> Result<ForwardPointQuote, String> {
    let cell = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let number = |idx: Option<usize>| cell(idx).and_then(parse_amount);

    let raw_date = cell(Some(columns.settlement)).unwrap_or_default();
    let settlement = parse_settlement_date(raw_date)
        .ok_or_else(|| format!("unparseable settlement date '{}'", raw_date))?;

    let (bid, ask) = match (number(columns.bid_points), number(columns.ask_points)) {
        (Some(bid), Some(ask)) => (bid, ask),
        (Some(one), None) | (None, Some(one)) => (one, one),
        (None, None) => return Err(format!("no points quoted for {}", settlement)),
    };

    let tenor = cell(Some(columns.tenor))
        .and_then(|raw| Tenor::from_str(raw).ok())
        .unwrap_or(Tenor::Date(settlement));

    let mut quote = ForwardPointQuote::new(tenor, settlement, bid, ask);
    let (bid_outright, ask_outright) =
        both_sides(number(columns.bid_outright), number(columns.ask_outright));
    quote.bid_outright = bid_outright;
    quote.ask_outright = ask_outright;
    Ok(quote)
}

fn both_sides(bid: Option<Decimal>, ask: Option<Decimal>) -> (Option<Decimal>, Option<Decimal>) {
    match (bid, ask) {
        (Some(b), None) => (Some(b), Some(b)),
        (None, Some(a)) => (Some(a), Some(a)),
        sides => sides,
    }
}

/// Settlement dates are `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_settlement_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .ok()
}
