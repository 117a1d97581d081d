//! Spendcast Core Library
//!
//! Shared functionality for the Spendcast expense forecaster:
//! - Forecast pipeline (filter, monthly aggregation, regression, status)
//! - Single-feature regressors (gradient-boosted trees, least squares)
//! - Forecast configuration
//! - Transaction store, monthly income/expense stats and CSV import

pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;

pub use config::{BoostingParams, ForecastConfig, ModelKind};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{ForecastPipeline, TransactionSource, NO_DATA_MESSAGE};
pub use import::{ImportStats, ParsedImport, SkippedRow};
pub use models::{
    ForecastOutcome, ForecastResult, ForecastStatus, MonthlyAggregate, MonthlyStats, NewTransaction,
    RawTransaction, StoredTransaction, TransactionRecord, TransactionType,
};
