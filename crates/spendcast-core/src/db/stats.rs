//! Monthly income/expense totals

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rusqlite::params;
use tracing::debug;

use super::Database;
use crate::error::{Error, Result};
use crate::forecast::{parse_record_date, round2};
use crate::models::{MonthlyStats, TransactionType};

/// Longest window `monthly_stats` will report
pub const MAX_STATS_MONTHS: u32 = 120;

impl Database {
    /// Income and expense totals for the `months` calendar months ending with `as_of`'s month
    ///
    /// Every month in the window is present (zero-filled), oldest first. Only
    /// rows labelled exactly `income` or `expense` count; rows whose date
    /// cannot be parsed are skipped.
    pub fn monthly_stats(
        &self,
        uid: &str,
        months: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<MonthlyStats>> {
        if months == 0 || months > MAX_STATS_MONTHS {
            return Err(Error::InvalidData(format!(
                "months must be between 1 and {}",
                MAX_STATS_MONTHS
            )));
        }

        let mut window: BTreeMap<(i32, u32), MonthlyStats> = month_window(as_of, months)
            .into_iter()
            .map(|(year, month)| {
                let stats = MonthlyStats {
                    month: format!("{:04}-{:02}", year, month),
                    income: 0.0,
                    expense: 0.0,
                };
                ((year, month), stats)
            })
            .collect();

        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT type, amount, date FROM transactions WHERE uid = ? AND type IN (?, ?)")?;
        let rows = stmt
            .query_map(
                params![
                    uid,
                    TransactionType::Income.as_str(),
                    TransactionType::Expense.as_str()
                ],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut unparsed = 0usize;
        for (tx_type, amount, date) in rows {
            let Some(date) = parse_record_date(&date) else {
                unparsed += 1;
                continue;
            };
            let Some(bucket) = window.get_mut(&(date.year(), date.month())) else {
                continue;
            };
            if tx_type == TransactionType::Income.as_str() {
                bucket.income += amount;
            } else {
                bucket.expense += amount;
            }
        }

        if unparsed > 0 {
            debug!(uid, unparsed, "Skipped rows with unreadable dates");
        }

        Ok(window
            .into_values()
            .map(|stats| MonthlyStats {
                income: round2(stats.income),
                expense: round2(stats.expense),
                ..stats
            })
            .collect())
    }
}

/// The `months` (year, month) pairs ending with `as_of`'s month, oldest first
fn month_window(as_of: NaiveDate, months: u32) -> Vec<(i32, u32)> {
    let last = as_of.year() * 12 + as_of.month0() as i32;
    (0..months as i32)
        .rev()
        .map(|back| {
            let index = last - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTransaction;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn add(db: &Database, uid: &str, tx_type: TransactionType, amount: f64, on: &str) {
        db.insert_transaction(&NewTransaction {
            uid: uid.to_string(),
            tx_type,
            amount,
            date: date(on),
            wallet_id: None,
            description: None,
            import_hash: None,
        })
        .unwrap();
    }

    #[test]
    fn test_month_window_crosses_year() {
        assert_eq!(
            month_window(date("2024-02-10"), 4),
            vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]
        );
        assert_eq!(month_window(date("2024-02-10"), 1), vec![(2024, 2)]);
    }

    #[test]
    fn test_monthly_stats_zero_filled() {
        let db = Database::in_memory().unwrap();
        add(&db, "alice", TransactionType::Expense, 40.0, "2024-01-05");
        add(&db, "alice", TransactionType::Expense, 2.5, "2024-01-20");
        add(&db, "alice", TransactionType::Income, 1000.0, "2024-03-31");

        let stats = db.monthly_stats("alice", 3, date("2024-03-15")).unwrap();
        let months: Vec<&str> = stats.iter().map(|s| s.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

        assert_eq!(stats[0].expense, 42.5);
        assert_eq!(stats[0].income, 0.0);
        assert_eq!(stats[1].expense, 0.0);
        assert_eq!(stats[2].income, 1000.0);
    }

    #[test]
    fn test_monthly_stats_ignores_outside_window_and_other_users() {
        let db = Database::in_memory().unwrap();
        add(&db, "alice", TransactionType::Expense, 10.0, "2023-12-31");
        add(&db, "alice", TransactionType::Expense, 20.0, "2024-04-01");
        add(&db, "bob", TransactionType::Expense, 30.0, "2024-02-01");

        let stats = db.monthly_stats("alice", 3, date("2024-03-15")).unwrap();
        assert!(stats.iter().all(|s| s.income == 0.0 && s.expense == 0.0));
    }

    #[test]
    fn test_monthly_stats_exact_labels_and_bad_dates() {
        let db = Database::in_memory().unwrap();
        add(&db, "alice", TransactionType::Expense, 5.0, "2024-03-02");
        {
            let conn = db.conn().unwrap();
            for (tx_type, on) in [
                ("Expense", "2024-03-03"),
                ("INCOME", "2024-03-03"),
                ("expense", "not a date"),
            ] {
                conn.execute(
                    "INSERT INTO transactions (uid, type, amount, date) VALUES ('alice', ?, 100.0, ?)",
                    params![tx_type, on],
                )
                .unwrap();
            }
        }

        let stats = db.monthly_stats("alice", 1, date("2024-03-31")).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].expense, 5.0);
        assert_eq!(stats[0].income, 0.0);
    }

    #[test]
    fn test_monthly_stats_rounds_sums() {
        let db = Database::in_memory().unwrap();
        add(&db, "alice", TransactionType::Expense, 0.1, "2024-03-01");
        add(&db, "alice", TransactionType::Expense, 0.2, "2024-03-02");

        let stats = db.monthly_stats("alice", 1, date("2024-03-31")).unwrap();
        assert_eq!(stats[0].expense, 0.3);
    }

    #[test]
    fn test_monthly_stats_rejects_bad_window() {
        let db = Database::in_memory().unwrap();
        let today = date("2024-03-31");
        assert!(matches!(
            db.monthly_stats("alice", 0, today),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.monthly_stats("alice", MAX_STATS_MONTHS + 1, today),
            Err(Error::InvalidData(_))
        ));
    }
}
