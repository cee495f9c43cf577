//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AcceptedResponse, AnimationPlayedRequest, ConversationSnapshot, DraftRequest, ErrorResponse,
    SubmitRequest,
};
use super::AppState;
use crate::records::{HistoryView, ProfileView, HISTORY_LOAD_ERROR, PROFILE_LOAD_ERROR};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Local;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Compose surface
        .route("/api/reflection", get(get_conversation))
        .route("/api/reflection/stream", get(stream_conversation))
        .route("/api/reflection/submit", post(submit))
        .route("/api/reflection/draft", put(update_draft))
        .route("/api/reflection/reset", post(reset))
        .route(
            "/api/reflection/turns/:index/animated",
            post(animation_played),
        )
        // Read-only records
        .route("/api/history", get(get_history))
        .route("/api/profile", get(get_profile))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Compose surface
// ============================================================

async fn get_conversation(State(state): State<AppState>) -> Json<ConversationSnapshot> {
    let snapshot = state.conversation.snapshot();
    Json(ConversationSnapshot::from_state(&snapshot, &Local::now()))
}

async fn stream_conversation(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before reading the snapshot so no update falls in between
    let broadcast_rx = state.conversation.subscribe();
    let snapshot = state.conversation.snapshot();
    sse_stream(
        ConversationSnapshot::from_state(&snapshot, &Local::now()),
        broadcast_rx,
    )
}

/// Queued, never answered inline: rejected submissions are silently dropped
/// and the outcome arrives on the stream.
async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let sent = match req.text {
        Some(text) => state.conversation.submit(text).await,
        None => state.conversation.submit_draft().await,
    };
    sent.map_err(AppError::Internal)?;

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse::yes())))
}

async fn update_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    state
        .conversation
        .set_draft(req.text)
        .await
        .map_err(AppError::Internal)?;

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse::yes())))
}

async fn reset(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    state
        .conversation
        .reset()
        .await
        .map_err(AppError::Internal)?;

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse::yes())))
}

async fn animation_played(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<AnimationPlayedRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    state
        .conversation
        .animation_played(req.session, index)
        .await
        .map_err(AppError::Internal)?;

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse::yes())))
}

// ============================================================
// Records
// ============================================================

async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryView>, AppError> {
    let records = state.service.history(&state.user_id).await.map_err(|e| {
        tracing::warn!(error = %e, kind = e.kind.as_str(), "History load failed");
        AppError::Upstream(HISTORY_LOAD_ERROR)
    })?;

    Ok(Json(HistoryView::project(&records, &Local::now())))
}

async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileView>, AppError> {
    let (profile, history) = tokio::join!(
        state.service.profile(&state.user_id),
        state.service.history(&state.user_id)
    );

    // The view needs both; either failing fails the load
    let (profile, history) = profile.and_then(|p| history.map(|h| (p, h))).map_err(|e| {
        tracing::warn!(error = %e, kind = e.kind.as_str(), "Profile load failed");
        AppError::Upstream(PROFILE_LOAD_ERROR)
    })?;

    Ok(Json(ProfileView::project(&profile, &history, &Local::now())))
}

async fn get_version() -> &'static str {
    concat!("reflection-client ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    /// The conversation runtime is no longer accepting events
    Internal(String),
    /// Backend failure, carrying the user-facing message
    Upstream(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.to_string()),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
