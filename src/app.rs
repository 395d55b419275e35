use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Args;
use crate::handlers::{chat_handler, create_session_handler, health_handler, logout_handler, metrics_handler};
use crate::middleware::admission;
use crate::model::{ModelError, OpenAiCompatible};
use crate::rate_limit::RateLimiter;
use crate::session::SessionCodec;
use crate::state::AppState;

// /api routes go through the rate limiter, health and metrics don't
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/session", post(create_session_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/chat", post(chat_handler))
        .route_layer(from_fn_with_state(state.clone(), admission));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api)
        .with_state(state)
}

// Wire everything from the parsed CLI/env config
pub fn build_state(
    args: &Args,
    limiter: Arc<RateLimiter>,
    system_prompt: Option<String>,
) -> Result<AppState, ModelError> {
    let model = OpenAiCompatible::new(
        &args.model_url,
        args.model.clone(),
        args.model_api_key.clone(),
        Duration::from_secs(args.model_timeout_secs),
    )?;

    Ok(AppState {
        sessions: Arc::new(SessionCodec::new(
            args.access_code.clone(),
            &args.session_secret,
            args.session_ttl(),
        )),
        rate_limiter: limiter,
        rate_config: args.rate_limit_config(),
        rate_limit_by_ip: args.rate_limit_by_ip,
        allowed_origins: args.allowed_origins(),
        model: Arc::new(model),
        system_prompt,
        max_message_chars: args.max_message_chars,
    })
}
