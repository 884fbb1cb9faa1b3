//! Trade-detail table loader.
//!
//! The table is header driven: columns may appear in any order and
//! unknown columns are ignored. A missing required column aborts the load
//! before any row is read. Problems inside a row reject only that trade,
//! including rows with too few fields or cells that are not valid UTF-8.

use crate::core::currency::CurrencyPair;
use crate::core::trade::{DealType, TradeRecord};
use crate::error::{PipelineError, TradeError};
use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Deal Id",
    "Cpty.",
    "Type of Deal",
    "Folder",
    "Security",
    "Amount1",
    "Amount2",
    "Trade Date",
    "Value Date",
];

const TABLE: &str = "trade";

/// Cells absent from a short row deserialize as empty and are reported
/// by [`parse_row`] as missing fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TradeRow {
    #[serde(rename = "Deal Id")]
    deal_id: String,
    #[serde(rename = "Cpty.")]
    counterparty: String,
    #[serde(rename = "Type of Deal")]
    deal_type: String,
    #[serde(rename = "Folder")]
    folder: String,
    #[serde(rename = "Security")]
    security: String,
    #[serde(rename = "Amount1")]
    amount1: String,
    #[serde(rename = "Amount2")]
    amount2: String,
    #[serde(rename = "Trade Date")]
    trade_date: String,
    #[serde(rename = "Value Date")]
    value_date: String,
    #[serde(rename = "Mat. Date", default)]
    maturity_date: Option<String>,
    #[serde(rename = "Rate/Price", default)]
    rate_price: Option<String>,
}

/// Result of loading a trade table: the valid trades and the rejected rows.
#[derive(Debug, Clone, Default)]
pub struct LoadedTrades {
    pub trades: Vec<TradeRecord>,
    pub rejected: Vec<TradeError>,
}

impl LoadedTrades {
    /// Rows read, valid or not.
    pub fn rows_read(&self) -> usize {
        self.trades.len() + self.rejected.len()
    }
}

pub fn load_trades(path: impl AsRef<Path>) -> Result<LoadedTrades, PipelineError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = read_trades(file)?;
    info!(
        "loaded {} trades from {} ({} rejected)",
        loaded.trades.len(),
        path.display(),
        loaded.rejected.len()
    );
    Ok(loaded)
}

pub fn read_trades<R: Read>(reader: R) -> Result<LoadedTrades, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| PipelineError::Csv { table: TABLE, source })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(PipelineError::Schema {
                table: TABLE,
                column: column.to_string(),
            });
        }
    }
    let byte_headers = csv_reader
        .byte_headers()
        .map_err(|source| PipelineError::Csv { table: TABLE, source })?
        .clone();
    let deal_id_index = headers.iter().position(|h| h == "Deal Id");

    let mut loaded = LoadedTrades::default();
    for result in csv_reader.byte_records() {
        let record = result.map_err(|source| PipelineError::Csv { table: TABLE, source })?;
        let parsed = record
            .deserialize::<TradeRow>(Some(&byte_headers))
            .map_err(|e| TradeError::UnreadableRow {
                deal_id: deal_id_index
                    .and_then(|i| record.get(i))
                    .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
                    .unwrap_or_default(),
                reason: e.to_string(),
            })
            .and_then(parse_row);

        match parsed {
            Ok(trade) => {
                debug!("parsed deal {}", trade.deal_id());
                loaded.trades.push(trade);
            }
            Err(e) => {
                warn!("{}", e);
                loaded.rejected.push(e);
            }
        }
    }
    Ok(loaded)
}

fn parse_row(row: TradeRow) -> Result<TradeRecord, TradeError> {
    let deal_id = row.deal_id.trim().to_string();
    if deal_id.is_empty() {
        return Err(TradeError::MissingField {
            deal_id,
            field: "Deal Id",
        });
    }

    let deal_type = DealType::from_str(&row.deal_type).map_err(|value| {
        TradeError::UnknownDealType {
            deal_id: deal_id.clone(),
            value,
        }
    })?;

    let security = non_empty(&row.security).ok_or_else(|| TradeError::MissingField {
        deal_id: deal_id.clone(),
        field: "Security",
    })?;
    let pair = CurrencyPair::from_str(security).map_err(|source| TradeError::InvalidPair {
        deal_id: deal_id.clone(),
        source,
    })?;

    let amount1 = required_amount(&deal_id, "Amount1", &row.amount1)?;
    let amount2 = required_amount(&deal_id, "Amount2", &row.amount2)?;

    let value_date = non_empty(&row.value_date).ok_or_else(|| TradeError::MissingField {
        deal_id: deal_id.clone(),
        field: "Value Date",
    })?;
    let value_date = date(&deal_id, "Value Date", value_date)?;

    let mut trade = TradeRecord::new(deal_id.as_str(), deal_type, pair, amount1, amount2, value_date)
        .with_counterparty(row.counterparty.trim())
        .with_folder(row.folder.trim());

    if let Some(raw) = non_empty(&row.trade_date) {
        trade = trade.with_trade_date(date(&deal_id, "Trade Date", raw)?);
    }
    if let Some(raw) = row.maturity_date.as_deref().and_then(non_empty) {
        trade = trade.with_maturity_date(date(&deal_id, "Mat. Date", raw)?);
    }
    // Rate/Price holds swap points on swaps and the outright rate otherwise.
    if deal_type == DealType::FxSwap {
        if let Some(raw) = row.rate_price.as_deref().and_then(non_empty) {
            let points = parse_amount(raw).ok_or_else(|| TradeError::InvalidAmount {
                deal_id: deal_id.clone(),
                field: "Rate/Price",
                value: raw.to_string(),
            })?;
            trade = trade.with_contract_points(points);
        }
    }

    Ok(trade)
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn required_amount(deal_id: &str, field: &'static str, raw: &str) -> Result<Decimal, TradeError> {
    let value = non_empty(raw).ok_or_else(|| TradeError::MissingField {
        deal_id: deal_id.to_string(),
        field,
    })?;
    parse_amount(value).ok_or_else(|| TradeError::InvalidAmount {
        deal_id: deal_id.to_string(),
        field,
        value: value.to_string(),
    })
}

fn date(deal_id: &str, field: &'static str, raw: &str) -> Result<NaiveDate, TradeError> {
    parse_date(raw).ok_or_else(|| TradeError::InvalidDate {
        deal_id: deal_id.to_string(),
        field,
        value: raw.to_string(),
    })
}

/// Parse an amount, accepting thousands separators and scientific notation.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parse a trade date: `DD/MM/YYYY`, falling back to `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str =
        "Deal Id,Cpty.,Type of Deal,Folder,Security,Amount1,Amount2,Trade Date,Value Date,Mat. Date,Rate/Price";

    fn load(rows: &[&str]) -> LoadedTrades {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        read_trades(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,000,000.50"), Some(dec!(1000000.50)));
        assert_eq!(parse_amount(" -1100000 "), Some(dec!(-1100000)));
        assert_eq!(parse_amount("1.5e3"), Some(dec!(1500)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2);
        assert_eq!(parse_date("02/01/2024"), expected);
        assert_eq!(parse_date("2024-01-02"), expected);
        assert_eq!(parse_date("2024/01/02"), None);
    }

    #[test]
    fn test_spot_row() {
        let loaded = load(&[
            r#"D-1,BANK A,Spot,FX-DESK,EUR/USD,"1,000,000","-1,100,000",29/12/2023,02/01/2024,,"#,
        ]);
        assert!(loaded.rejected.is_empty());
        let trade = &loaded.trades[0];
        assert_eq!(trade.deal_id(), "D-1");
        assert_eq!(trade.counterparty(), "BANK A");
        assert_eq!(trade.deal_type(), DealType::Spot);
        assert_eq!(trade.amount1(), dec!(1_000_000));
        assert_eq!(trade.amount2(), dec!(-1_100_000));
        assert_eq!(trade.value_date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(trade.trade_date(), NaiveDate::from_ymd_opt(2023, 12, 29));
        assert!(trade.maturity_date().is_none());
    }

    #[test]
    fn test_swap_row_reads_contract_points() {
        let loaded = load(&["S-1,BANK B,FX Swap,FX-DESK,EURUSD,1000000,-1100000,29/12/2023,02/01/2024,02/04/2024,60"]);
        let trade = &loaded.trades[0];
        assert_eq!(trade.deal_type(), DealType::FxSwap);
        assert_eq!(trade.contract_points(), Some(dec!(60)));
        assert_eq!(trade.maturity_date(), NaiveDate::from_ymd_opt(2024, 4, 2));
    }

    #[test]
    fn test_outright_rate_is_not_contract_points() {
        let loaded = load(&["F-1,BANK,Outright Forward,FX,EUR/USD,1,-1.1,,02/01/2024,02/04/2024,1.1"]);
        assert_eq!(loaded.trades[0].contract_points(), None);
        assert_eq!(loaded.trades[0].trade_date(), None);
    }

    #[test]
    fn test_bad_rows_are_rejected_individually() {
        let loaded = load(&[
            "A,X,Spot,F,EUR/USD,abc,-1,,02/01/2024,,",
            "B,X,Option,F,EUR/USD,1,-1,,02/01/2024,,",
            "C,X,Spot,F,EUR,1,-1,,02/01/2024,,",
            "D,X,Spot,F,EUR/USD,1,-1,,31/02/2024,,",
            ",X,Spot,F,EUR/USD,1,-1,,02/01/2024,,",
            "E,X,Spot,F,EUR/USD,1,-1,,02/01/2024,,",
        ]);
        assert_eq!(loaded.trades.len(), 1);
        assert_eq!(loaded.trades[0].deal_id(), "E");
        assert_eq!(loaded.rows_read(), 6);

        assert!(matches!(loaded.rejected[0], TradeError::InvalidAmount { field: "Amount1", .. }));
        assert!(matches!(loaded.rejected[1], TradeError::UnknownDealType { .. }));
        assert!(matches!(loaded.rejected[2], TradeError::InvalidPair { .. }));
        assert!(matches!(loaded.rejected[3], TradeError::InvalidDate { field: "Value Date", .. }));
        assert!(matches!(loaded.rejected[4], TradeError::MissingField { field: "Deal Id", .. }));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let csv = "Value Date,Deal Id,Cpty.,Type of Deal,Folder,Security,Amount1,Amount2,Trade Date,Extra\n\
                   02/01/2024,D-1,X,Spot,F,EUR/USD,1,-1,,ignored";
        let loaded = read_trades(csv.as_bytes()).unwrap();
        assert_eq!(loaded.trades.len(), 1);
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let csv = "Deal Id,Cpty.,Type of Deal,Folder,Security,Amount1,Trade Date,Value Date\n";
        match read_trades(csv.as_bytes()) {
            Err(PipelineError::Schema { column, .. }) => assert_eq!(column, "Amount2"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_rejects_only_that_trade() {
        let loaded = load(&[
            "D-1,X,Spot,F,EUR/USD,1,-1,,02/01/2024,,",
            "D-2,X,Spot,F,EUR/USD,1,-1",
            "D-3,X,Spot,F,EUR/USD,1,-1,,02/01/2024",
            "D-4,X,Spot,F,EUR/USD,1,-1,,02/01/2024,,",
        ]);
        let ids: Vec<_> = loaded.trades.iter().map(|t| t.deal_id()).collect();
        assert_eq!(ids, vec!["D-1", "D-3", "D-4"]);
        assert_eq!(
            loaded.rejected,
            vec![TradeError::MissingField {
                deal_id: "D-2".to_string(),
                field: "Value Date",
            }]
        );
    }

    #[test]
    fn test_invalid_utf8_rejects_only_that_trade() {
        let mut csv = format!("{}\nD-1,X,Spot,F,EUR/USD,1,-1,,02/01/2024,,\nD-2,", HEADER).into_bytes();
        csv.extend_from_slice(b"BANK \xFF,Spot,F,EUR/USD,1,-1,,02/01/2024,,\n");
        csv.extend_from_slice(b"D-3,X,Spot,F,EUR/USD,1,-1,,02/01/2024,,\n");

        let loaded = read_trades(csv.as_slice()).unwrap();
        assert_eq!(loaded.trades.len(), 2);
        assert_eq!(loaded.rejected.len(), 1);
        assert!(matches!(
            &loaded.rejected[0],
            TradeError::UnreadableRow { deal_id, .. } if deal_id == "D-2"
        ));
    }
}
