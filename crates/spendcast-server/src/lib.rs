//! Spendcast Web Server
//!
//! Axum-based REST API for the Spendcast expense forecaster.
//!
//! - `POST /forecast` - next-month expense forecast for one user
//! - `/api/*` - health check, transaction entry/listing and monthly stats
//!
//! There is no authentication layer; bind to localhost unless the network
//! in front of the server handles access control.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use spendcast_core::db::Database;
use spendcast_core::{ForecastConfig, ForecastPipeline};

mod handlers;

/// Origin of the mobile development client
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8081";

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = any origin)
    pub allowed_origins: Vec<String>,
    /// Forecast model selection and hyperparameters
    pub forecast: ForecastConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            forecast: ForecastConfig::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub pipeline: ForecastPipeline,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let pipeline = ForecastPipeline::new(&config.forecast);
    create_router_with_pipeline(db, config, pipeline)
}

/// Create the application router around an already-built pipeline (for testing)
pub fn create_router_with_pipeline(
    db: Database,
    config: ServerConfig,
    pipeline: ForecastPipeline,
) -> Router {
    info!(model = pipeline.regressor_name(), "Forecast model configured");

    let cors = build_cors(&config.allowed_origins);

    let state = Arc::new(AppState { db, pipeline });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/stats/monthly", get(handlers::monthly_stats))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction).delete(handlers::delete_transaction),
        );

    Router::new()
        .route("/forecast", post(handlers::forecast))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Wildcards are rejected alongside credentials, so echo the request instead
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if host != "127.0.0.1" && host != "localhost" {
        warn!("⚠️  No authentication - do not expose {} to an untrusted network!", host);
    }

    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unprocessable(msg: &str, internal: anyhow::Error) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: Some(internal),
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, status = %self.status, "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
