use std::sync::Arc;

use crate::model::ChatModel;
use crate::origin::AllowedOrigins;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::session::SessionStore;

// app's shared state, built once in main and handed to every request
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub rate_limiter: Arc<RateLimiter>,
    pub rate_config: RateLimitConfig,
    pub rate_limit_by_ip: bool, // key anonymous traffic by peer IP
    pub allowed_origins: AllowedOrigins,
    pub model: Arc<dyn ChatModel>,
    pub system_prompt: Option<String>,
    pub max_message_chars: usize,
}
