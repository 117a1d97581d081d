//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::ForecastConfig;
use spendcast_server::{ServerConfig, DEFAULT_ALLOWED_ORIGIN};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    forecast: ForecastConfig,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Spendcast API server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Model: {}", forecast.model.as_str());

    let allowed_origins = if allowed_origins.is_empty() {
        vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
    } else {
        allowed_origins
    };
    println!("   CORS origins: {}", allowed_origins.join(", "));

    let db = open_db(db_path, no_encrypt)?;

    let config = ServerConfig {
        allowed_origins,
        forecast,
    };

    spendcast_server::serve_with_config(db, host, port, config)
        .await
        .context("Server error")
}
