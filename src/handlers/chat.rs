use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use std::sync::Arc;
use std::time::Instant;

use crate::error::AppError;
use crate::metrics::{AUTH_FAILURES, MODEL_LATENCY};
use crate::middleware::SESSION_HEADER;
use crate::models::{ChatReply, ChatRequest, Role};
use crate::state::AppState;
use crate::validation::{sanitize_messages, validate_chat_request};

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    if !state.allowed_origins.is_allowed(&headers) {
        tracing::warn!("Chat request from unlisted origin");
        return Err(AppError::ForbiddenOrigin);
    }

    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    validate_chat_request(&request, state.max_message_chars)?;

    // body field first, header as fallback
    let session = request.session_id.clone().or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });
    match session {
        Some(s) if state.sessions.verify_session(&s) => {}
        _ => {
            AUTH_FAILURES.inc();
            return Err(AppError::InvalidSession);
        }
    }

    let messages = sanitize_messages(request.messages);

    let start_time = Instant::now();
    let content = state
        .model
        .complete(state.system_prompt.as_deref(), &messages)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    MODEL_LATENCY.observe(start_time.elapsed().as_secs_f64());

    tracing::debug!(
        turns = messages.len(),
        card = ?request.card_id,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Chat completion served"
    );

    Ok(Json(ChatReply {
        role: Role::Assistant,
        content,
    }))
}
