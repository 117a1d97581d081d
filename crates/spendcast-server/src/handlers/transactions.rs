//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use spendcast_core::forecast::parse_record_date;
use spendcast_core::{Error, NewTransaction, StoredTransaction, TransactionType};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub uid: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<StoredTransaction>,
    pub total: i64,
    pub limit: i64,
}

/// GET /api/transactions - List a user's transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    if params.uid.trim().is_empty() {
        return Err(AppError::bad_request("uid is required"));
    }
    let uid = params.uid.as_str();

    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let transactions = state.db.list_transactions(uid, limit)?;
    let total = state.db.count_transactions(uid)?;

    Ok(Json(TransactionResponse {
        transactions,
        total,
        limit,
    }))
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub uid: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    pub date: String,
    #[serde(default, alias = "walletId")]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateTransactionRequest {
    fn into_new_transaction(self) -> Result<NewTransaction, AppError> {
        let tx_type: TransactionType = self
            .tx_type
            .parse()
            .map_err(|e: String| AppError::bad_request(&e))?;

        let date = parse_record_date(&self.date)
            .ok_or_else(|| AppError::bad_request(&format!("Invalid date: {}", self.date)))?;

        let tx = NewTransaction {
            uid: self.uid,
            tx_type,
            amount: self.amount,
            date,
            wallet_id: self.wallet_id.filter(|w| !w.trim().is_empty()),
            description: self.description.filter(|d| !d.trim().is_empty()),
            import_hash: None,
        };

        tx.validate().map_err(|e| match e {
            Error::InvalidData(msg) => AppError::bad_request(&msg),
            other => other.into(),
        })?;

        Ok(tx)
    }
}

/// POST /api/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<StoredTransaction>), AppError> {
    let tx = req.into_new_transaction()?;

    let id = state
        .db
        .insert_transaction(&tx)?
        .ok_or_else(|| AppError::internal("Transaction was not stored"))?;
    let stored = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::internal("Transaction was not stored"))?;

    info!(id, uid = %stored.uid, tx_type = %stored.tx_type, "Transaction created");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StoredTransaction>, AppError> {
    let tx = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;
    Ok(Json(tx))
}

/// DELETE /api/transactions/:id - Delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    match state.db.delete_transaction(id) {
        Ok(()) => Ok(Json(SuccessResponse { success: true })),
        Err(Error::NotFound(_)) => Err(AppError::not_found("Transaction not found")),
        Err(e) => Err(e.into()),
    }
}
