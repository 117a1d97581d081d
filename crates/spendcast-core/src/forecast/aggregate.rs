//! Monthly aggregation of expense records

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::{MonthlyAggregate, TransactionRecord};

/// Sum records per calendar (year, month), oldest month first
///
/// Returns `None` for an empty input so callers cannot mistake "no history"
/// for a zero total. Each aggregate's `month_ordinal` is the calendar month
/// alone: January 2023 and January 2024 produce two aggregates that share
/// ordinal 1.
pub fn aggregate_monthly(records: &[TransactionRecord]) -> Option<Vec<MonthlyAggregate>> {
    if records.is_empty() {
        return None;
    }

    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in records {
        *totals
            .entry((record.date.year(), record.date.month()))
            .or_insert(0.0) += record.amount;
    }

    Some(
        totals
            .into_iter()
            .map(|((year, month), total)| MonthlyAggregate {
                month: format!("{:04}-{:02}", year, month),
                total,
                month_ordinal: month,
            })
            .collect(),
    )
}
