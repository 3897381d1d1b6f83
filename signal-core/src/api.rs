//! HTTP endpoint server using Axum

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use signal_common::{BacktestRecord, PriceBar, Signal};

use crate::error::StrategyError;
use crate::service::{BacktestRequest, GenerationSummary, ServiceError, StrategyService};

pub type AppState = Arc<StrategyService>;

/// Error body returned by every endpoint: `{"message": ...}`
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ServiceError::Strategy(StrategyError::RangeTooSmall { .. }) => {
                (StatusCode::BAD_REQUEST, "Range too small".to_string())
            }
            err if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
            err => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/api/prices", get(list_prices))
        .route("/api/signals", get(list_signals))
        .route("/api/signals/generate", post(generate_signals))
        .route("/api/backtest", post(run_backtest))
        .route("/api/backtests", get(list_backtests))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(service)
}

/// Serve the API until Ctrl+C
pub async fn serve(addr: SocketAddr, service: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on {}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down API server...");
        })
        .await
}

async fn list_prices(State(service): State<AppState>) -> Result<Json<Vec<PriceBar>>, ApiError> {
    Ok(Json(service.list_prices().await?))
}

async fn list_signals(State(service): State<AppState>) -> Result<Json<Vec<Signal>>, ApiError> {
    Ok(Json(service.list_signals().await?))
}

async fn generate_signals(
    State(service): State<AppState>,
) -> Result<Json<GenerationSummary>, ApiError> {
    Ok(Json(service.generate_signals().await?))
}

async fn run_backtest(
    State(service): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> Result<Json<BacktestRecord>, ApiError> {
    Ok(Json(service.run_backtest(request).await?))
}

async fn list_backtests(
    State(service): State<AppState>,
) -> Result<Json<Vec<BacktestRecord>>, ApiError> {
    Ok(Json(service.list_backtests().await?))
}
