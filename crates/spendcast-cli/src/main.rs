//! Spendcast CLI - Next-month expense forecaster
//!
//! Usage:
//!   spendcast init                          Initialize database
//!   spendcast import --file CSV             Import transactions
//!   spendcast forecast --uid ID             Forecast next month
//!   spendcast stats --uid ID                Monthly income/expense totals
//!   spendcast serve --port 8000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use spendcast_core::ForecastConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let load_config = || {
        ForecastConfig::load(cli.config.as_deref()).context("Failed to load forecast config")
    };

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Import { ref file, ref uid } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, file, uid.as_deref())
        }
        Commands::Add {
            ref uid,
            amount,
            ref date,
            ref tx_type,
            ref wallet,
            ref description,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_add(
                &db,
                uid,
                amount,
                date,
                tx_type,
                wallet.as_deref(),
                description.as_deref(),
            )
            .map(|_| ())
        }
        Commands::Transactions { ref uid, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_transactions_list(&db, uid, limit)
        }
        Commands::Forecast { ref uid, json } => {
            let config = load_config()?;
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_forecast(&db, &config, uid, json)
        }
        Commands::Stats {
            ref uid,
            months,
            as_of,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_stats(&db, uid, months, as_of, json)
        }
        Commands::Serve {
            port,
            ref host,
            ref allowed_origins,
        } => {
            let config = load_config()?;
            commands::cmd_serve(
                &cli.db,
                host,
                port,
                cli.no_encrypt,
                config,
                allowed_origins.clone(),
            )
            .await
        }
    }
}
