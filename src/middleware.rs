use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::AppError;
use crate::metrics::{RATE_LIMITED, REQUEST_TOTAL};
use crate::rate_limit::retry_after_secs;
use crate::session::now_ms;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-id";
pub const ANONYMOUS_KEY: &str = "unauthenticated";

const SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_XSS_PROTECTION, "1; mode=block"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
];

// Who gets charged for this request.
// The session header is taken as-is, without checking its signature: the
// limiter stays independent of session validity, so a client that sends a
// new made-up value each time also gets a new budget each time. Protected
// endpoints still reject such values at session verification.
pub fn rate_limit_key(request: &Request, by_ip: bool) -> String {
    if let Some(session) = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return format!("session:{}", session);
    }

    if by_ip {
        if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
            return format!("ip:{}", addr.ip());
        }
    }

    ANONYMOUS_KEY.to_string()
}

// Runs before every /api handler: rate limit first, then hand over
pub async fn admission(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let key = rate_limit_key(&request, state.rate_limit_by_ip);
    let decision = state.rate_limiter.check(&key, &state.rate_config);

    if !decision.success {
        RATE_LIMITED.inc();
        let retry_after = retry_after_secs(decision.reset_at, now_ms());
        // keep session tokens out of the logs
        let client = if key.starts_with("session:") { "session" } else { key.as_str() };
        tracing::warn!(client, retry_after, path = %request.uri().path(), "Rate limit exceeded");
        return AppError::RateLimited {
            retry_after_secs: retry_after,
        }
        .into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    response
}
