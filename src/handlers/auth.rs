use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::metrics::{AUTH_FAILURES, SESSIONS_ISSUED};
use crate::models::{LogoutRequest, SessionRequest, SessionResponse};
use crate::state::AppState;

// Exchange the shared access code for a signed session credential
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let Json(payload) = payload.map_err(|_| AppError::BadRequest("Invalid request".to_string()))?;

    // a non-string code is just a wrong code
    let code = payload.code.as_ref().and_then(|c| c.as_str()).unwrap_or_default();
    if code.is_empty() || !state.sessions.verify_access_code(code) {
        AUTH_FAILURES.inc();
        tracing::info!("Rejected access code");
        return Err(AppError::InvalidAccessCode);
    }

    let session_id = state.sessions.create_session();
    SESSIONS_ISSUED.inc();
    tracing::info!("Issued new session");

    Ok(Json(SessionResponse { session_id }))
}

// Sessions are stateless, the client just drops its credential.
// Kept as an endpoint so clients have one place to call on sign-out.
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> StatusCode {
    if let Ok(Json(LogoutRequest {
        session_id: Some(session_id),
    })) = payload
    {
        state.sessions.invalidate_session(&session_id);
    }
    StatusCode::NO_CONTENT
}
