//! Record filter: raw store rows to typed expense records

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::models::{RawTransaction, TransactionRecord, TransactionType};

/// Keep one user's expense records, typed
///
/// Records owned by someone else are skipped, as is any record whose type
/// label is not exactly `expense` (no case folding or trimming). A record whose date or amount cannot be used is dropped on its
/// own; the rest of the batch is unaffected.
pub fn filter_records(raw: &[RawTransaction], uid: &str) -> Vec<TransactionRecord> {
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for tx in raw {
        if tx.uid != uid {
            continue;
        }
        if tx.tx_type != TransactionType::Expense.as_str() {
            continue;
        }

        let Some(date) = parse_record_date(&tx.date) else {
            debug!(uid, date = %tx.date, "Dropping record with unparseable date");
            dropped += 1;
            continue;
        };

        if !tx.amount.is_finite() {
            debug!(uid, amount = tx.amount, "Dropping record with non-finite amount");
            dropped += 1;
            continue;
        }

        records.push(TransactionRecord {
            amount: tx.amount,
            date,
            tx_type: TransactionType::Expense,
            wallet_id: tx.wallet_id.clone(),
            uid: tx.uid.clone(),
        });
    }

    if dropped > 0 {
        warn!(uid, dropped, kept = records.len(), "Dropped malformed expense records");
    }

    records
}

/// Parse the date forms a store may hand back
///
/// Accepts plain dates, RFC 3339 timestamps (the offset is kept, so the
/// calendar day is the one the timestamp was written in), and naive
/// date-times with either a space or a `T` separator.
pub fn parse_record_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(uid: &str, tx_type: &str, amount: f64, date: &str) -> RawTransaction {
        RawTransaction {
            uid: uid.to_string(),
            tx_type: tx_type.to_string(),
            amount,
            date: date.to_string(),
            wallet_id: None,
        }
    }

    #[test]
    fn test_keeps_only_matching_user_expenses() {
        let input = vec![
            raw("alice", "expense", 10.0, "2024-01-01"),
            raw("bob", "expense", 20.0, "2024-01-01"),
            raw("alice", "income", 30.0, "2024-01-01"),
            raw("alice", "expense", 40.0, "2024-01-02"),
        ];

        let records = filter_records(&input, "alice");

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.uid == "alice"));
        assert_eq!(records[0].amount, 10.0);
        assert_eq!(records[1].amount, 40.0);
    }

    #[test]
    fn test_type_label_must_match_exactly() {
        let input = vec![
            raw("alice", "expense", 10.0, "2024-01-01"),
            raw("alice", "Expense", 900.0, "2024-01-20"),
            raw("alice", " EXPENSE ", 50.0, "2024-02-20"),
            raw("alice", "expense ", 7.0, "2024-02-21"),
            raw("alice", "expenses", 3.0, "2024-02-22"),
        ];

        let records = filter_records(&input, "alice");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 10.0);
    }

    #[test]
    fn test_uid_must_match_exactly() {
        let input = vec![
            raw("alice", "expense", 10.0, "2024-01-01"),
            raw(" alice", "expense", 20.0, "2024-01-01"),
            raw("Alice", "expense", 30.0, "2024-01-01"),
        ];

        let records = filter_records(&input, "alice");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 10.0);
    }

    #[test]
    fn test_malformed_dates_are_dropped_individually() {
        let input = vec![
            raw("alice", "expense", 10.0, "not a date"),
            raw("alice", "expense", 20.0, ""),
            raw("alice", "expense", 30.0, "2024-02-30"),
            raw("alice", "expense", 40.0, "2024-03-05"),
        ];

        let records = filter_records(&input, "alice");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 40.0);
    }

    #[test]
    fn test_non_finite_amounts_are_dropped() {
        let input = vec![
            raw("alice", "expense", f64::NAN, "2024-03-05"),
            raw("alice", "expense", f64::INFINITY, "2024-03-05"),
            raw("alice", "expense", 5.0, "2024-03-05"),
        ];

        assert_eq!(filter_records(&input, "alice").len(), 1);
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(filter_records(&[], "alice").is_empty());
    }

    #[test]
    fn test_parse_record_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_record_date("2024-01-15"), Some(expected));
        assert_eq!(parse_record_date(" 2024-01-15 "), Some(expected));
        assert_eq!(parse_record_date("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_record_date("2024-01-15T23:30:00-05:00"), Some(expected));
        assert_eq!(parse_record_date("2024-01-15 08:00:00"), Some(expected));
        assert_eq!(parse_record_date("2024-01-15T08:00:00.250"), Some(expected));
        assert_eq!(parse_record_date("15/01/2024"), None);
    }
}
