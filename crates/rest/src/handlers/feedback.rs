//! Platform feedback handlers.
//!
//! Feedback is tied to a room by name only (a weak reference), so
//! submissions survive room deletion. Submission is open; reading a
//! room's feedback requires Admin there.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomwiki_persistence::access::Role;
use roomwiki_persistence::store::WikiStore;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::room_ctx;
use crate::error::{RestError, RestResult};
use crate::extractors::RequireIdentity;
use crate::state::AppState;

/// Request body for feedback submission.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// Room the feedback concerns.
    pub room_name: String,
    /// Free-text message.
    pub message: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_org: Option<String>,
}

/// Handler for `POST /feedback`.
///
/// Appends a feedback entry. No authentication required; public room
/// visitors are the main audience.
pub async fn feedback_submit_handler<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<FeedbackRequest>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    if body.message.trim().is_empty() {
        return Err(RestError::bad_request("feedback message must not be empty"));
    }

    let feedback = state
        .store()
        .add_feedback(
            &body.room_name,
            &body.message,
            body.author_name.as_deref(),
            body.author_org.as_deref(),
        )
        .await?;
    debug!(room = %feedback.room_name, "Recorded feedback");
    Ok((StatusCode::CREATED, Json(feedback)).into_response())
}

/// Handler for `GET /feedback/{room}`.
///
/// Lists a room's feedback, newest first. Requires Admin.
pub async fn feedback_list_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state
        .store()
        .authorize(Some(&identity), &ctx, Role::Admin)
        .await?;

    let entries = state.store().list_feedback(ctx.room().as_str()).await?;
    Ok(Json(entries).into_response())
}

/// Handler for `GET /feedback/{room}/count`.
pub async fn feedback_count_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state
        .store()
        .authorize(Some(&identity), &ctx, Role::Admin)
        .await?;

    let count = state.store().feedback_count(ctx.room().as_str()).await?;
    Ok(Json(json!({ "count": count })).into_response())
}
