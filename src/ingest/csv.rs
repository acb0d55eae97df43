//! Canonical CSV format: `date,kind,quantity,amount_cad[,reference][,memo]`.
//!
//! Column names are fixed and kinds must already be `acquire` or `dispose`; mapping other
//! exports onto this shape happens before the file reaches this loader.

use super::IngestError;
use crate::domain::{sort_chronological, Decimal, Transaction, TxDate, TxKind};
use std::path::Path;

/// Read and parse a canonical CSV file, optionally applying a stable by-date sort.
pub fn load_transactions(path: &Path, sort_by_date: bool) -> Result<Vec<Transaction>, IngestError> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut transactions = parse_transactions_csv(&bytes)?;
    if sort_by_date {
        sort_chronological(&mut transactions);
    }

    tracing::info!(
        path = %path.display(),
        count = transactions.len(),
        sorted = sort_by_date,
        "Loaded transactions"
    );
    Ok(transactions)
}

pub fn parse_transactions_csv(csv_bytes: &[u8]) -> Result<Vec<Transaction>, IngestError> {
    #[derive(Debug, serde::Deserialize)]
    struct Row {
        date: String,
        kind: String,
        quantity: String,
        amount_cad: String,
        #[serde(default)]
        reference: Option<String>,
        #[serde(default)]
        memo: Option<String>,
    }

    fn parse_kind(s: &str) -> Option<TxKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acquire" => Some(TxKind::Acquire),
            "dispose" => Some(TxKind::Dispose),
            _ => None,
        }
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(csv_bytes);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Csv(e.to_string()))?
        .clone();

    let mut transactions = Vec::new();
    let mut record = ::csv::StringRecord::new();
    let mut seq = 0;
    while reader
        .read_record(&mut record)
        .map_err(|e| IngestError::Csv(e.to_string()))?
    {
        // Line the record starts on, so quoted newlines are counted.
        let row_number = record
            .position()
            .map_or(seq + 2, |pos| pos.line() as usize);
        let invalid = |reason: String| IngestError::InvalidRow {
            row: row_number,
            reason,
        };

        let row: Row = record
            .deserialize(Some(&headers))
            .map_err(|e| invalid(e.to_string()))?;
        let date = row
            .date
            .parse::<TxDate>()
            .map_err(|e| invalid(e.to_string()))?;
        let kind = parse_kind(&row.kind)
            .ok_or_else(|| invalid(format!("invalid kind: {}", row.kind)))?;
        let quantity = Decimal::from_str_canonical(&row.quantity)
            .map_err(|e| invalid(format!("invalid quantity: {}", e)))?;
        let amount_cad = Decimal::from_str_canonical(&row.amount_cad)
            .map_err(|e| invalid(format!("invalid amount_cad: {}", e)))?;

        let mut tx = Transaction::new(date, kind, quantity, amount_cad, row.reference.as_deref(), seq);
        if let Some(memo) = row.memo.filter(|m| !m.is_empty()) {
            tx = tx.with_memo(memo);
        }
        transactions.push(tx);
        seq += 1;
    }

    Ok(transactions)
}
