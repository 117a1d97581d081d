//! Forecast command implementation

use anyhow::{Context, Result};
use spendcast_core::db::Database;
use spendcast_core::{
    ForecastConfig, ForecastOutcome, ForecastPipeline, ForecastStatus, NO_DATA_MESSAGE,
};
use tracing::{debug, warn};

pub fn cmd_forecast(db: &Database, config: &ForecastConfig, uid: &str, json: bool) -> Result<()> {
    let outcome = run_forecast(db, config, uid)?;
    println!("{}", render_forecast(&outcome, uid, json)?);
    Ok(())
}

/// Run the forecast pipeline against the store
pub fn run_forecast(db: &Database, config: &ForecastConfig, uid: &str) -> Result<ForecastOutcome> {
    let pipeline = ForecastPipeline::new(config);
    debug!(uid, model = pipeline.regressor_name(), "Running forecast");

    let outcome = pipeline
        .forecast_for_user(db, uid)
        .with_context(|| format!("Forecast failed for {}", uid))?;
    if outcome == ForecastOutcome::NoData {
        warn!(uid, "No usable expense records");
    }
    Ok(outcome)
}

/// Format a forecast outcome for the terminal or as JSON
pub fn render_forecast(outcome: &ForecastOutcome, uid: &str, json: bool) -> Result<String> {
    if json {
        let value = match outcome {
            ForecastOutcome::Forecast(result) => serde_json::to_value(result)?,
            ForecastOutcome::NoData => serde_json::json!({ "error": NO_DATA_MESSAGE }),
        };
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let result = match outcome {
        ForecastOutcome::Forecast(result) => result,
        ForecastOutcome::NoData => return Ok(format!("ℹ️  {} ({})", NO_DATA_MESSAGE, uid)),
    };

    let verdict = match result.status {
        ForecastStatus::Stable => "✅ Stable - at or below your monthly average",
        ForecastStatus::HigherExpense => "📈 Higher expense - above your monthly average",
    };

    let lines = [
        String::new(),
        format!("🔮 Forecast for {}", uid),
        "   ─────────────────────────────".to_string(),
        format!("   Next month:    {}", month_name(result.next_month)),
        format!("   Predicted:     ${:.2}", result.prediction),
        format!("   Monthly mean:  ${:.2}", result.mean),
        format!("   {}", verdict),
    ];

    Ok(lines.join("\n"))
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}
