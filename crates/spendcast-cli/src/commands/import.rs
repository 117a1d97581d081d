//! Import command implementation

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{db::Database, import::import_csv, ImportStats};
use tracing::info;

pub fn cmd_import(db: &Database, file: &Path, uid: Option<&str>) -> Result<()> {
    println!("📥 Importing transactions from {}...", file.display());
    if let Some(owner) = uid {
        println!("   Owner: {}", owner);
    }

    let stats = import_file(db, file, uid)?;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {} transactions", stats.imported);
    if stats.duplicates > 0 {
        println!("   Skipped:  {} duplicates", stats.duplicates);
    }
    if stats.skipped > 0 {
        println!(
            "   ⚠️  Invalid: {} rows (run with --verbose for details)",
            stats.skipped
        );
    }

    Ok(())
}

/// Import a CSV file into the database
pub fn import_file(db: &Database, file: &Path, uid: Option<&str>) -> Result<ImportStats> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let stats = import_csv(db, csv_file, uid)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    info!(
        file = %file.display(),
        imported = stats.imported,
        duplicates = stats.duplicates,
        skipped = stats.skipped,
        "CSV import committed"
    );
    Ok(stats)
}
