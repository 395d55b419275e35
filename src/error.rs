use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

// Everything a handler or the admission layer can answer with besides success.
// Messages are what the client sees, so they never carry internal detail.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid access code")]
    InvalidAccessCode,

    #[error("Access denied: invalid or expired session.")]
    InvalidSession,

    #[error("Access forbidden: unauthorized domain.")]
    ForbiddenOrigin,

    #[error("Too Many Requests")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream model request failed")]
    Upstream(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidAccessCode | AppError::InvalidSession => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenOrigin => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Upstream(detail) = &self {
            tracing::error!(error = %detail, "Model call failed");
        }

        let status = self.status();
        match self {
            AppError::RateLimited { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                "Too Many Requests",
            )
                .into_response(),
            other => (
                status,
                Json(serde_json::json!({ "error": other.to_string() })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_carries_retry_after() {
        let res = AppError::RateLimited { retry_after_secs: 7 }.into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers()[header::RETRY_AFTER], "7");
    }

    #[test]
    fn upstream_detail_is_not_exposed() {
        let err = AppError::Upstream("connection refused to 10.0.0.3".into());
        assert_eq!(err.to_string(), "Upstream model request failed");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        assert_eq!(AppError::InvalidAccessCode.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidSession.status(), StatusCode::UNAUTHORIZED);
        assert_ne!(
            AppError::InvalidAccessCode.to_string(),
            AppError::InvalidSession.to_string()
        );
    }
}
