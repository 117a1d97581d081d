//! Forecast handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState};
use spendcast_core::{Error, ForecastOutcome, ForecastResult, NO_DATA_MESSAGE};

/// Message returned when the regressor cannot be fitted
pub const MODEL_FAILED_MESSAGE: &str = "Forecast model failed";

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub uid: String,
}

/// Either a forecast or the no-data body; both are sent with 200
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ForecastResponse {
    Forecast(ForecastResult),
    NoData { error: String },
}

impl From<ForecastOutcome> for ForecastResponse {
    fn from(outcome: ForecastOutcome) -> Self {
        match outcome {
            ForecastOutcome::Forecast(result) => Self::Forecast(result),
            ForecastOutcome::NoData => Self::NoData {
                error: NO_DATA_MESSAGE.to_string(),
            },
        }
    }
}

/// POST /forecast - Predict next month's expense total for a user
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, AppError> {
    // Owner ids are matched verbatim; only a blank id is rejected
    if req.uid.trim().is_empty() {
        return Err(AppError::bad_request("uid is required"));
    }
    let uid = req.uid;

    debug!(uid = %uid, "Forecast requested");

    // SQLite reads and model fitting are blocking work
    let outcome = tokio::task::spawn_blocking(move || {
        state.pipeline.forecast_for_user(&state.db, &uid)
    })
    .await?;

    match outcome {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(err @ Error::Model(_)) => Err(AppError::unprocessable(
            MODEL_FAILED_MESSAGE,
            err.into(),
        )),
        Err(err) => Err(err.into()),
    }
}
