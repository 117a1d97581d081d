//! CSV import of transaction history
//!
//! Expected header: `uid,type,amount,date,wallet_id,description`. The
//! `uid`, `wallet_id` and `description` columns are optional; a default
//! owner can be supplied for files exported from a single account.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::forecast::parse_record_date;
use crate::models::{NewTransaction, TransactionType};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    uid: Option<String>,
    #[serde(rename = "type")]
    tx_type: String,
    amount: String,
    date: String,
    #[serde(default, alias = "walletId")]
    wallet_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the file (header is line 1)
    pub line: u64,
    pub reason: String,
}

/// Parsed CSV contents
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub transactions: Vec<NewTransaction>,
    pub skipped: Vec<SkippedRow>,
}

/// Counts from writing an import to the database
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Parse a transaction CSV
///
/// `owner` fills in rows with no `uid` and overrides rows that have one.
/// Invalid rows are reported in `skipped`; a malformed file (bad header,
/// broken quoting) is an error.
pub fn parse_csv<R: Read>(reader: R, owner: Option<&str>) -> Result<ParsedImport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut parsed = ParsedImport::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let converted = record
            .deserialize::<CsvRow>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(|row| row_to_transaction(row, owner));

        match converted {
            Ok(mut tx) => {
                // Identical rows within one file are distinct purchases; number them
                let content = content_key(&tx);
                let occurrence = seen.entry(content.clone()).or_insert(0);
                tx.import_hash = Some(generate_hash(&content, *occurrence));
                *occurrence += 1;
                parsed.transactions.push(tx);
            }
            Err(reason) => {
                debug!(line, reason = %reason, "Skipping CSV row");
                parsed.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    if !parsed.skipped.is_empty() {
        warn!(
            skipped = parsed.skipped.len(),
            parsed = parsed.transactions.len(),
            "Some CSV rows could not be imported"
        );
    }

    Ok(parsed)
}

/// Parse a CSV and write its transactions in one batch, skipping previously imported rows
pub fn import_csv<R: Read>(db: &Database, reader: R, owner: Option<&str>) -> Result<ImportStats> {
    let parsed = parse_csv(reader, owner)?;
    let mut stats = ImportStats {
        skipped: parsed.skipped.len(),
        ..Default::default()
    };

    let (imported, duplicates) = db.insert_transactions(&parsed.transactions)?;
    stats.imported = imported;
    stats.duplicates = duplicates;

    Ok(stats)
}

fn row_to_transaction(row: CsvRow, owner: Option<&str>) -> std::result::Result<NewTransaction, String> {
    let uid = owner
        .map(str::to_string)
        .or(row.uid)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| "missing uid".to_string())?;

    let tx_type: TransactionType = row.tx_type.parse()?;

    let amount: f64 = row
        .amount
        .replace(['$', ','], "")
        .parse()
        .map_err(|_| format!("invalid amount: {}", row.amount))?;

    let date: NaiveDate =
        parse_record_date(&row.date).ok_or_else(|| format!("invalid date: {}", row.date))?;

    let tx = NewTransaction {
        uid,
        tx_type,
        amount,
        date,
        wallet_id: row.wallet_id.filter(|w| !w.is_empty()),
        description: row.description.filter(|d| !d.is_empty()),
        import_hash: None,
    };
    tx.validate().map_err(|e| match e {
        Error::InvalidData(msg) => msg,
        other => other.to_string(),
    })?;

    Ok(tx)
}

fn content_key(tx: &NewTransaction) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        tx.uid,
        tx.tx_type,
        tx.date,
        tx.amount,
        tx.wallet_id.as_deref().unwrap_or(""),
        tx.description.as_deref().unwrap_or("")
    )
}

/// Generate a unique hash for deduplication
fn generate_hash(content: &str, occurrence: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}
