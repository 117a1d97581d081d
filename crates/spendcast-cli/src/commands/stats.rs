//! Stats command implementation

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use spendcast_core::db::Database;
use spendcast_core::MonthlyStats;

pub fn cmd_stats(
    db: &Database,
    uid: &str,
    months: u32,
    as_of: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let stats = db
        .monthly_stats(uid, months, as_of)
        .with_context(|| format!("Failed to load stats for {}", uid))?;
    println!("{}", render_stats(&stats, uid, json)?);
    Ok(())
}

/// Format monthly totals as a table or as JSON
pub fn render_stats(stats: &[MonthlyStats], uid: &str, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(stats)?);
    }

    let mut lines = vec![
        String::new(),
        format!("📊 Monthly totals for {}", uid),
        "   ─────────────────────────────────────────".to_string(),
        format!("   {:<8} │ {:>12} │ {:>12}", "Month", "Income", "Expense"),
    ];
    for month in stats {
        lines.push(format!(
            "   {:<8} │ {:>12} │ {:>12}",
            month.month,
            format!("${:.2}", month.income),
            format!("${:.2}", month.expense)
        ));
    }

    let income: f64 = stats.iter().map(|m| m.income).sum();
    let expense: f64 = stats.iter().map(|m| m.expense).sum();
    lines.push("   ─────────────────────────────────────────".to_string());
    lines.push(format!(
        "   {:<8} │ {:>12} │ {:>12}",
        "Total",
        format!("${:.2}", income),
        format!("${:.2}", expense)
    ));

    Ok(lines.join("\n"))
}
