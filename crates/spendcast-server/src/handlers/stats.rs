//! Monthly income/expense stats handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use spendcast_core::{Error, MonthlyStats};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub uid: String,
    #[serde(default = "default_months")]
    pub months: u32,
    /// Last day of the window (defaults to today)
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

fn default_months() -> u32 {
    12
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub uid: String,
    pub months: Vec<MonthlyStats>,
}

/// GET /api/stats/monthly - Per-month income and expense totals, oldest first
pub async fn monthly_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    if params.uid.trim().is_empty() {
        return Err(AppError::bad_request("uid is required"));
    }

    let as_of = params.as_of.unwrap_or_else(|| Local::now().date_naive());

    let months = match state.db.monthly_stats(&params.uid, params.months, as_of) {
        Ok(months) => months,
        Err(Error::InvalidData(msg)) => return Err(AppError::bad_request(&msg)),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(StatsResponse {
        uid: params.uid,
        months,
    }))
}
