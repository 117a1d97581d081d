//! Transaction command implementations

use anyhow::{Context, Result};
use spendcast_core::db::Database;
use spendcast_core::forecast::parse_record_date;
use spendcast_core::{NewTransaction, TransactionType};
use tracing::debug;

use super::truncate;

pub fn cmd_transactions_list(db: &Database, uid: &str, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(uid, limit.max(1))?;

    if transactions.is_empty() {
        println!("No transactions found for {}. Add some with:", uid);
        println!("  spendcast import --file history.csv");
        println!("  spendcast add --uid {} --amount 12.50 --date 2024-01-15", uid);
        return Ok(());
    }

    let total = db.count_transactions(uid)?;

    println!();
    println!("📝 Recent Transactions for {} ({} total)", uid, total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.tx_type.eq_ignore_ascii_case("income") {
            format!("\x1b[32m+${:.2}\x1b[0m", tx.amount) // Green for income
        } else {
            format!("\x1b[31m-${:.2}\x1b[0m", tx.amount) // Red for expenses
        };

        println!(
            "   [{}] {} │ {:>10} │ {}",
            tx.id,
            tx.date,
            amount_str,
            truncate(tx.description.as_deref().unwrap_or(""), 35)
        );
    }

    Ok(())
}

/// Record a single transaction, returning its id
pub fn cmd_add(
    db: &Database,
    uid: &str,
    amount: f64,
    date: &str,
    tx_type: &str,
    wallet: Option<&str>,
    description: Option<&str>,
) -> Result<i64> {
    let tx_type: TransactionType = tx_type.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let date = parse_record_date(date).with_context(|| format!("Invalid date: {}", date))?;

    let tx = NewTransaction {
        uid: uid.to_string(),
        tx_type,
        amount,
        date,
        wallet_id: wallet.map(str::to_string),
        description: description.map(str::to_string),
        import_hash: None,
    };

    let id = db
        .insert_transaction(&tx)
        .context("Failed to save transaction")?
        .context("Transaction was not stored")?;
    debug!(id, uid = %tx.uid, tx_type = %tx.tx_type, "Transaction recorded");

    println!(
        "✅ Recorded {} of ${:.2} on {} for {} (id {})",
        tx.tx_type, tx.amount, tx.date, tx.uid, id
    );

    Ok(id)
}
