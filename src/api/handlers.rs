//! HTTP request handlers

use super::types::{
    ErrorResponse, HealthResponse, MessageRequest, MessageResponse, SessionResponse, VerifyQuery,
    WebhookAck,
};
use super::AppState;
use crate::whatsapp::WebhookPayload;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Cloud API webhook
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        // Direct access to the dialogue
        .route("/api/messages", post(send_message))
        .route("/api/sessions/:identity", get(get_session))
        .route("/api/sessions/:identity/reset", post(reset_session))
        .route("/health", get(health))
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<String, AppError> {
    let subscribed = query.mode.as_deref() == Some("subscribe");
    let token_matches = match (&state.verify_token, &query.verify_token) {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    };

    match query.challenge {
        Some(challenge) if subscribed && token_matches => {
            tracing::info!("Webhook verified");
            Ok(challenge)
        }
        _ => {
            tracing::warn!(mode = ?query.mode, "Webhook verification failed");
            Err(AppError::Forbidden("Verification failed".to_string()))
        }
    }
}

/// Acknowledge immediately; turns run on the per-identity inbox workers
async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Json<WebhookAck> {
    let object = payload.object.clone().unwrap_or_default();
    let messages = payload.into_inbound();
    let queued = messages.len();
    tracing::debug!(object = %object, queued, "Webhook delivery received");
    for message in messages {
        tracing::debug!(identity = %message.identity, "Queueing inbound message");
        state.manager.enqueue(message).await;
    }
    Json(WebhookAck { queued })
}

// ============================================================
// Dialogue
// ============================================================

async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let identity = req.identity.trim();
    if identity.is_empty() {
        return Err(AppError::BadRequest("identity is required".to_string()));
    }

    // Detached so a client disconnect cannot cut the turn short
    let runtime = state.manager.runtime().clone();
    let turn = {
        let runtime = runtime.clone();
        let identity = identity.to_string();
        let text = req.text;
        tokio::spawn(async move { runtime.handle(&identity, &text).await })
    };
    let prompts = turn
        .await
        .map_err(|e| AppError::Internal(format!("Turn failed: {e}")))?;
    let session = runtime
        .sessions()
        .get(identity)
        .await
        .ok_or_else(|| AppError::Internal("Session was not saved".to_string()))?;

    Ok(Json(MessageResponse {
        state: session.state,
        prompts,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    state
        .manager
        .runtime()
        .sessions()
        .get(&identity)
        .await
        .map(|session| Json(session.into()))
        .ok_or_else(|| AppError::NotFound(format!("No session for {identity}")))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let sessions = state.manager.runtime().sessions();
    if !sessions.reset(&identity).await {
        return Err(AppError::NotFound(format!("No session for {identity}")));
    }
    tracing::info!(identity = %identity, "Session reset");
    sessions
        .get(&identity)
        .await
        .map(|session| Json(session.into()))
        .ok_or_else(|| AppError::NotFound(format!("No session for {identity}")))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_inboxes: state.manager.active_inboxes().await,
        sessions: state.manager.runtime().sessions().count().await,
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
