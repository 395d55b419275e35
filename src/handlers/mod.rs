mod auth;
mod chat;
mod health;
mod metrics;

pub use auth::{create_session_handler, logout_handler};
pub use chat::chat_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
