//! Transaction operations

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::forecast::TransactionSource;
use crate::models::{NewTransaction, RawTransaction, StoredTransaction, TransactionType};

const SELECT_COLUMNS: &str =
    "SELECT id, uid, type, amount, date, wallet_id, description, created_at FROM transactions";

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    ///
    /// Returns the new row id, or `None` when an identical import already exists.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        tx.validate()?;
        let conn = self.conn()?;
        insert_row(&conn, tx)
    }

    /// Insert a batch of transactions atomically
    ///
    /// Every row is validated before anything is written, and the batch is
    /// committed as one SQL transaction: a failure leaves the table untouched.
    /// Returns `(inserted, duplicates)`.
    pub fn insert_transactions(&self, txs: &[NewTransaction]) -> Result<(usize, usize)> {
        for tx in txs {
            tx.validate()?;
        }

        let mut conn = self.conn()?;
        let batch = conn.transaction()?;

        let mut inserted = 0;
        let mut duplicates = 0;
        for tx in txs {
            match insert_row(&batch, tx)? {
                Some(_) => inserted += 1,
                None => duplicates += 1,
            }
        }

        batch.commit()?;
        debug!(inserted, duplicates, "Committed transaction batch");

        Ok((inserted, duplicates))
    }

    /// List a user's transactions, newest first
    pub fn list_transactions(&self, uid: &str, limit: i64) -> Result<Vec<StoredTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE uid = ? ORDER BY date DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![uid, limit], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<StoredTransaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                Self::row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Count a user's transactions
    pub fn count_transactions(&self, uid: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE uid = ?",
            params![uid],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }

    /// All of a user's expense rows, exactly as stored
    ///
    /// The type label must equal `expense` exactly.
    pub fn list_expense_records(&self, uid: &str) -> Result<Vec<RawTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT uid, type, amount, date, wallet_id
            FROM transactions
            WHERE uid = ? AND type = ?
            ORDER BY date, id
            "#,
        )?;

        let records = stmt
            .query_map(params![uid, TransactionType::Expense.as_str()], |row| {
                Ok(RawTransaction {
                    uid: row.get(0)?,
                    tx_type: row.get(1)?,
                    amount: row.get(2)?,
                    date: row.get(3)?,
                    wallet_id: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(uid, count = records.len(), "Fetched expense records");
        Ok(records)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<StoredTransaction> {
        let created_at_str: String = row.get(7)?;
        Ok(StoredTransaction {
            id: row.get(0)?,
            uid: row.get(1)?,
            tx_type: row.get(2)?,
            amount: row.get(3)?,
            date: row.get(4)?,
            wallet_id: row.get(5)?,
            description: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

impl TransactionSource for Database {
    fn fetch_expenses(&self, uid: &str) -> Result<Vec<RawTransaction>> {
        self.list_expense_records(uid)
    }
}

/// Write one validated row unless its import hash is already present
fn insert_row(conn: &Connection, tx: &NewTransaction) -> Result<Option<i64>> {
    if let Some(hash) = &tx.import_hash {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            debug!(hash = %hash, "Skipping duplicate transaction");
            return Ok(None);
        }
    }

    conn.execute(
        r#"
        INSERT INTO transactions (uid, type, amount, date, wallet_id, description, import_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            tx.uid,
            tx.tx_type.as_str(),
            tx.amount,
            tx.date.to_string(),
            tx.wallet_id,
            tx.description,
            tx.import_hash,
        ],
    )?;

    Ok(Some(conn.last_insert_rowid()))
}
