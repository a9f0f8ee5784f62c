//! CSV transaction import
//!
//! Accepts a CSV file with a header row. Column mapping is by
//! case-insensitive substring match on the Portuguese header keywords the
//! template documents, so minor header variations still import. Rows missing
//! a description, with a non-positive amount, or with an unparseable date are
//! silently dropped and counted as skipped. Duplicates — identical
//! (title, amount, date) against the store or earlier file rows — are counted
//! but not inserted.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashSet;
use uuid::Uuid;
use vendio_common::{Error, Result};

use crate::db;
use crate::models::{Transaction, TxType};

/// Category applied when the file has no category column or an empty cell
const DEFAULT_CATEGORY: &str = "Outros";

/// Outcome counts of one import
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Column indexes resolved from the header row
#[derive(Debug, Default)]
struct ColumnMap {
    date: Option<usize>,
    description: Option<usize>,
    category: Option<usize>,
    tx_type: Option<usize>,
    amount: Option<usize>,
    status: Option<usize>,
    payment_method: Option<usize>,
    source: Option<usize>,
    customer_name: Option<usize>,
}

fn map_headers(headers: &csv::StringRecord) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (idx, header) in headers.iter().enumerate() {
        let h = header.trim().to_lowercase();
        if map.date.is_none() && h.contains("data") {
            map.date = Some(idx);
        } else if map.description.is_none() && h.contains("descri") {
            map.description = Some(idx);
        } else if map.category.is_none() && h.contains("categor") {
            map.category = Some(idx);
        } else if map.tx_type.is_none() && h.contains("tipo") {
            map.tx_type = Some(idx);
        } else if map.amount.is_none() && h.contains("valor") {
            map.amount = Some(idx);
        } else if map.status.is_none() && h.contains("status") {
            map.status = Some(idx);
        } else if map.payment_method.is_none() && (h.contains("pagamento") || h.contains("forma")) {
            map.payment_method = Some(idx);
        } else if map.source.is_none() && (h.contains("fonte") || h.contains("origem")) {
            map.source = Some(idx);
        } else if map.customer_name.is_none() && h.contains("cliente") {
            map.customer_name = Some(idx);
        }
    }
    map
}

/// One row that survived parsing
#[derive(Debug, Clone)]
pub(crate) struct ParsedRow {
    pub occurred_on: NaiveDate,
    pub title: String,
    pub category: String,
    pub tx_type: TxType,
    pub amount: f64,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub source: Option<String>,
    pub customer_name: Option<String>,
}

#[derive(Debug)]
pub(crate) struct ParseOutcome {
    pub rows: Vec<ParsedRow>,
    pub total_rows: usize,
    pub skipped: usize,
}

fn cell<'a>(record: &'a csv::StringRecord, idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Strip currency decoration and normalize the decimal separator
///
/// `1.500,00` and `R$ 1500.00` both come out as 1500.0.
pub(crate) fn normalize_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains('.') && cleaned.contains(',') {
        // Brazilian format: '.' thousands, ',' decimal
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.contains(',') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    normalized.parse().ok()
}

/// Accept `DD/MM/YYYY` or `YYYY-MM-DD`
pub(crate) fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Parse the CSV text into importable rows
pub(crate) fn parse_csv(text: &str) -> Result<ParseOutcome> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::InvalidInput(format!("Invalid CSV header: {}", e)))?
        .clone();
    let map = map_headers(&headers);

    let mut rows = Vec::new();
    let mut total_rows = 0usize;
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                total_rows += 1;
                skipped += 1;
                continue;
            }
        };
        total_rows += 1;

        let title = match cell(&record, map.description) {
            Some(t) => t.to_string(),
            None => {
                skipped += 1;
                continue;
            }
        };
        let amount = match cell(&record, map.amount).and_then(normalize_amount) {
            Some(a) if a > 0.0 => a,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let occurred_on = match cell(&record, map.date).and_then(parse_flexible_date) {
            Some(d) => d,
            None => {
                skipped += 1;
                continue;
            }
        };

        rows.push(ParsedRow {
            occurred_on,
            title,
            category: cell(&record, map.category)
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string(),
            tx_type: TxType::from_cell(cell(&record, map.tx_type).unwrap_or("")),
            amount,
            status: cell(&record, map.status).map(String::from),
            payment_method: cell(&record, map.payment_method).map(String::from),
            source: cell(&record, map.source).map(String::from),
            customer_name: cell(&record, map.customer_name).map(String::from),
        });
    }

    Ok(ParseOutcome {
        rows,
        total_rows,
        skipped,
    })
}

fn dedup_key(title: &str, amount: f64, date: NaiveDate) -> String {
    format!("{}|{:.2}|{}", title.trim().to_lowercase(), amount, date)
}

/// Import transactions from CSV text
pub async fn import_transactions_csv(pool: &SqlitePool, text: &str) -> Result<ImportReport> {
    let parsed = parse_csv(text)?;

    // Seed the dedup set with what the store already holds
    let mut seen: HashSet<String> = db::transactions::fetch_all(pool)
        .await?
        .iter()
        .map(|t| dedup_key(&t.title, t.amount, t.occurred_on))
        .collect();

    let mut imported = 0usize;
    let mut duplicates = 0usize;

    for row in parsed.rows {
        let key = dedup_key(&row.title, row.amount, row.occurred_on);
        if !seen.insert(key) {
            duplicates += 1;
            continue;
        }

        let tx = Transaction {
            id: Uuid::new_v4(),
            title: row.title,
            description: None,
            category: row.category,
            tx_type: row.tx_type,
            amount: row.amount,
            occurred_on: row.occurred_on,
            status: row.status,
            payment_method: row.payment_method,
            source: row.source,
            customer_name: row.customer_name,
            data_quality_score: None,
            validation_errors: Vec::new(),
            created_at: Utc::now(),
        };
        db::transactions::insert(pool, &tx).await?;
        imported += 1;
    }

    Ok(ImportReport {
        total_rows: parsed.total_rows,
        imported,
        duplicates,
        skipped: parsed.skipped,
    })
}

/// Downloadable template documenting the expected columns
pub fn template_csv() -> String {
    let mut template = String::new();
    template.push_str("data,descricao,categoria,tipo,valor,status,forma_pagamento,fonte,cliente\n");
    template.push_str("02/01/2024,Venda Produto,Receita,receita,1500.00,pago,PIX,site,Cliente ABC\n");
    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_amount_formats() {
        assert_eq!(normalize_amount("1500.00"), Some(1500.0));
        assert_eq!(normalize_amount("1.500,00"), Some(1500.0));
        assert_eq!(normalize_amount("1500,50"), Some(1500.5));
        assert_eq!(normalize_amount("R$ 1.234,56"), Some(1234.56));
        assert_eq!(normalize_amount("-300"), Some(-300.0));
        assert_eq!(normalize_amount("abc"), None);
        assert_eq!(normalize_amount(""), None);
    }

    #[test]
    fn test_parse_flexible_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_flexible_date("2024-01-02"), Some(expected));
        assert_eq!(parse_flexible_date("02/01/2024"), Some(expected));
        assert_eq!(parse_flexible_date("01/02/2024"), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(parse_flexible_date("not a date"), None);
    }

    #[test]
    fn test_template_row_parses() {
        let outcome = parse_csv(&template_csv()).unwrap();
        assert_eq!(outcome.total_rows, 1);
        assert_eq!(outcome.rows.len(), 1);

        let row = &outcome.rows[0];
        assert_eq!(row.occurred_on, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(row.title, "Venda Produto");
        assert_eq!(row.category, "Receita");
        assert_eq!(row.tx_type, TxType::Receita);
        assert_eq!(row.amount, 1500.0);
        assert_eq!(row.status.as_deref(), Some("pago"));
        assert_eq!(row.payment_method.as_deref(), Some("PIX"));
        assert_eq!(row.source.as_deref(), Some("site"));
        assert_eq!(row.customer_name.as_deref(), Some("Cliente ABC"));
    }

    #[test]
    fn test_rows_without_description_are_dropped() {
        let csv = "data,descricao,valor\n02/01/2024,,100.00\n03/01/2024,Venda,200.00\n";
        let outcome = parse_csv(csv).unwrap();
        assert_eq!(outcome.total_rows, 2);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.rows[0].title, "Venda");
    }

    #[test]
    fn test_nonpositive_amounts_are_dropped() {
        let csv = "data,descricao,valor\n\
                   02/01/2024,Estorno,-50.00\n\
                   02/01/2024,Gratuito,0\n\
                   02/01/2024,Venda,10.00\n";
        let outcome = parse_csv(csv).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn test_header_mapping_is_order_independent() {
        let csv = "valor,cliente,descricao,data\n250,Empresa X,Consultoria,2024-03-10\n";
        let outcome = parse_csv(csv).unwrap();
        assert_eq!(outcome.rows.len(), 1);

        let row = &outcome.rows[0];
        assert_eq!(row.amount, 250.0);
        assert_eq!(row.title, "Consultoria");
        assert_eq!(row.customer_name.as_deref(), Some("Empresa X"));
        assert_eq!(row.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_despesa_type_detection() {
        let csv = "data,descricao,tipo,valor\n02/01/2024,Aluguel,Despesa,800\n";
        let outcome = parse_csv(csv).unwrap();
        assert_eq!(outcome.rows[0].tx_type, TxType::Despesa);
    }

    #[test]
    fn test_unparseable_date_is_dropped() {
        let csv = "data,descricao,valor\n2024/13/99,Venda,100\n";
        let outcome = parse_csv(csv).unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.skipped, 1);
    }
}
