//! HTTP Request Boundary
//!
//! Routes:
//! - `GET /health`
//! - `POST /gather_osint`
//! - `POST /generate_phishing`
//!
//! Each request gets its own cancellation token. If the client goes away
//! axum drops the handler future, the drop guard fires, and the session's
//! subprocesses and oracle calls are abandoned.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;

use crate::commands;
use crate::models::phishing::PhishingArtifact;
use crate::models::response::{
    ErrorResponse, GatherOsintRequest, GatherOsintResponse, GeneratePhishingRequest,
};
use crate::state::AppState;
use crate::utils::error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/gather_osint", post(gather_osint))
        .route("/generate_phishing", post(generate_phishing))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn gather_osint(
    State(state): State<AppState>,
    Json(request): Json<GatherOsintRequest>,
) -> Result<Json<GatherOsintResponse>, AppError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    tracing::info!("[Server] gather_osint for domain {}", request.domain.trim());

    let response = commands::gather_osint(&state, request, &cancel).await?;
    Ok(Json(response))
}

async fn generate_phishing(
    State(state): State<AppState>,
    Json(request): Json<GeneratePhishingRequest>,
) -> Result<Json<PhishingArtifact>, AppError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    tracing::info!("[Server] generate_phishing ({} chars of findings)", request.osint_data.len());

    let artifact = commands::generate_phishing(&state, request, &cancel).await?;
    Ok(Json(artifact))
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Llm(_) | AppError::Extraction { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!("[Server] request failed: {}", self);
        } else {
            tracing::warn!("[Server] request failed: {}", self);
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
