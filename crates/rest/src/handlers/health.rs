//! Health check endpoint handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomwiki_persistence::store::WikiStore;
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for `GET /health`.
///
/// Returns a simple health status, useful for load balancers and
/// monitoring systems.
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: WikiStore,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "backend": state.store().backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}
