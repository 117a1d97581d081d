//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::NaiveDate;
use spendcast_core::db::Database;
use spendcast_core::{ForecastConfig, ForecastOutcome, ForecastStatus, ModelKind};

use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ========== Init Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendcast.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.count_transactions("anyone").unwrap(), 0);
}

// ========== Import Command Tests ==========

#[test]
fn test_cmd_import() {
    let db = setup_test_db();
    let file = write_csv(
        "uid,type,amount,date\n\
         alice,expense,100,2024-01-15\n\
         alice,expense,200,2024-02-10\n\
         alice,expense,oops,2024-02-11\n",
    );

    let stats = commands::import_file(&db, file.path(), None).unwrap();
    assert_eq!(stats.imported, 2);
    assert_eq!(stats.skipped, 1);

    // Second run only finds duplicates
    commands::cmd_import(&db, file.path(), None).unwrap();
    assert_eq!(db.count_transactions("alice").unwrap(), 2);
}

#[test]
fn test_cmd_import_with_owner() {
    let db = setup_test_db();
    let file = write_csv("type,amount,date\nexpense,9.99,2024-05-05\n");

    let stats = commands::import_file(&db, file.path(), Some("carol")).unwrap();
    assert_eq!(stats.imported, 1);
    assert_eq!(db.count_transactions("carol").unwrap(), 1);
}

#[test]
fn test_cmd_import_missing_file() {
    let db = setup_test_db();
    let dir = tempfile::tempdir().unwrap();

    let result = commands::cmd_import(&db, &dir.path().join("missing.csv"), None);
    assert!(result.is_err());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_add_and_list() {
    let db = setup_test_db();

    let id = commands::cmd_add(
        &db,
        "alice",
        42.0,
        "2024-03-09",
        "expense",
        Some("cash"),
        Some("Lunch"),
    )
    .unwrap();

    let tx = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(tx.tx_type, "expense");
    assert_eq!(tx.wallet_id.as_deref(), Some("cash"));

    assert!(commands::cmd_transactions_list(&db, "alice", 20).is_ok());
    assert!(commands::cmd_transactions_list(&db, "nobody", 20).is_ok());
}

#[test]
fn test_cmd_add_rejects_bad_input() {
    let db = setup_test_db();

    assert!(commands::cmd_add(&db, "alice", 0.0, "2024-03-09", "expense", None, None).is_err());
    assert!(commands::cmd_add(&db, "alice", 5.0, "tomorrow", "expense", None, None).is_err());
    assert!(commands::cmd_add(&db, "alice", 5.0, "2024-03-09", "refund", None, None).is_err());
    assert_eq!(db.count_transactions("alice").unwrap(), 0);
}

// ========== Forecast Command Tests ==========

#[test]
fn test_run_forecast() {
    let db = setup_test_db();
    commands::cmd_add(&db, "alice", 100.0, "2024-01-15", "expense", None, None).unwrap();
    commands::cmd_add(&db, "alice", 200.0, "2024-02-10", "expense", None, None).unwrap();
    commands::cmd_add(&db, "alice", 900.0, "2024-02-20", "income", None, None).unwrap();

    let outcome = commands::run_forecast(&db, &ForecastConfig::default(), "alice").unwrap();
    let result = outcome.forecast().unwrap();
    assert_eq!(result.next_month, 3);
    assert_eq!(result.mean, 150.0);
    assert_eq!(result.status, ForecastStatus::HigherExpense);

    assert!(commands::cmd_forecast(&db, &ForecastConfig::default(), "alice", false).is_ok());
}

#[test]
fn test_run_forecast_linear() {
    let db = setup_test_db();
    commands::cmd_add(&db, "alice", 300.0, "2024-01-15", "expense", None, None).unwrap();
    commands::cmd_add(&db, "alice", 100.0, "2024-02-10", "expense", None, None).unwrap();

    let config = ForecastConfig {
        model: ModelKind::Linear,
        ..Default::default()
    };
    let outcome = commands::run_forecast(&db, &config, "alice").unwrap();
    let result = outcome.forecast().unwrap();
    // Falling trend: 300, 100 -> -100 in March
    assert_eq!(result.prediction, -100.0);
    assert_eq!(result.status, ForecastStatus::Stable);
}

#[test]
fn test_render_forecast_json() {
    let db = setup_test_db();
    commands::cmd_add(&db, "alice", 50.0, "2024-06-01", "expense", None, None).unwrap();
    let outcome = commands::run_forecast(&db, &ForecastConfig::default(), "alice").unwrap();

    let rendered = commands::render_forecast(&outcome, "alice", true).unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(json["next_month"], 7);
    assert_eq!(json["prediction"], 50.0);
    assert_eq!(json["mean"], 50.0);
    assert_eq!(json["status"], "stable");
}

#[test]
fn test_render_no_data() {
    let rendered = commands::render_forecast(&ForecastOutcome::NoData, "bob", true).unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(json["error"], "No transactions for analysis");

    let text = commands::render_forecast(&ForecastOutcome::NoData, "bob", false).unwrap();
    assert!(text.contains("No transactions for analysis"));
}

#[test]
fn test_render_forecast_text() {
    let db = setup_test_db();
    commands::cmd_add(&db, "alice", 80.0, "2024-12-03", "expense", None, None).unwrap();
    let outcome = commands::run_forecast(&db, &ForecastConfig::default(), "alice").unwrap();

    let text = commands::render_forecast(&outcome, "alice", false).unwrap();
    assert!(text.contains("January"));
    assert!(text.contains("$80.00"));
    assert!(text.contains("Stable"));
}

// ========== Stats Command Tests ==========

#[test]
fn test_cmd_stats() {
    let db = setup_test_db();
    commands::cmd_add(&db, "alice", 40.0, "2024-02-03", "expense", None, None).unwrap();
    commands::cmd_add(&db, "alice", 900.0, "2024-03-01", "income", None, None).unwrap();

    let as_of = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    let stats = db.monthly_stats("alice", 2, as_of).unwrap();

    let rendered = commands::render_stats(&stats, "alice", true).unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(json[0]["month"], "2024-02");
    assert_eq!(json[0]["expense"], 40.0);
    assert_eq!(json[1]["income"], 900.0);

    let text = commands::render_stats(&stats, "alice", false).unwrap();
    assert!(text.contains("2024-03"));
    assert!(text.contains("$900.00"));
    assert!(text.contains("$40.00"));

    assert!(commands::cmd_stats(&db, "alice", 6, Some(as_of), false).is_ok());
    assert!(commands::cmd_stats(&db, "alice", 0, Some(as_of), false).is_err());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long description", 10), "a long ...");
    assert_eq!(truncate("café au lait", 7), "café...");
}
