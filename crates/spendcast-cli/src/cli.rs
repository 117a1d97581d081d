//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Spendcast - Forecast next month's spending
#[derive(Parser)]
#[command(name = "spendcast")]
#[command(about = "Next-month expense forecaster", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "spendcast.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SPENDCAST_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Forecast model config file (TOML)
    ///
    /// Falls back to the data directory override, then built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import transactions from CSV
    ///
    /// Columns: uid,type,amount,date,wallet_id,description
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Owner for every row (fills in or replaces the uid column)
        #[arg(short, long)]
        uid: Option<String>,
    },

    /// Record a single transaction
    Add {
        /// Owner of the transaction
        #[arg(short, long)]
        uid: String,

        /// Amount (positive)
        #[arg(short, long)]
        amount: f64,

        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Transaction type: expense or income
        #[arg(short = 't', long = "type", default_value = "expense")]
        tx_type: String,

        /// Wallet the money came from
        #[arg(short, long)]
        wallet: Option<String>,

        /// Free-text note
        #[arg(long)]
        description: Option<String>,
    },

    /// List a user's transactions
    Transactions {
        /// Owner to list
        #[arg(short, long)]
        uid: String,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Forecast next month's expenses for a user
    Forecast {
        /// Owner to forecast for
        #[arg(short, long)]
        uid: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show monthly income and expense totals for a user
    Stats {
        /// Owner to summarize
        #[arg(short, long)]
        uid: String,

        /// Number of months to show, ending with the current one
        #[arg(short, long, default_value = "12")]
        months: u32,

        /// Last day of the window (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable; defaults to http://localhost:8081)
        #[arg(long = "allowed-origin")]
        allowed_origins: Vec<String>,
    },
}
