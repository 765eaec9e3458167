use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::config;
use crate::services::embed_service::EmbedService;
use crate::AppState;

/// GET /api/embed-token - embed token and URL for the configured
/// workspace/report pair.
///
/// Always answers with a well-formed result body; the HTTP status line
/// mirrors the payload's `status` field so plain clients see failures
/// without parsing it.
pub async fn embed_token(State(state): State<AppState>) -> impl IntoResponse {
    let service = EmbedService::new(state.http.clone(), state.pool.clone(), config::config());
    let result = service.embed_info().await;

    let status =
        StatusCode::from_u16(result.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(result))
}
