use clap::Parser;
use std::time::Duration;
use thiserror::Error;

use crate::origin::AllowedOrigins;
use crate::rate_limit::{RateLimitConfig, SweepConfig};

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-gateway")]
#[command(about = "Access-code gated chat proxy for hosted LLM completion APIs")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Shared code handed out to users, exchanged once for a session
    #[arg(long, env = "ACCESS_CODE", hide_env_values = true)]
    pub access_code: String,

    // Key used to sign session credentials
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: String,

    // How long a session stays valid (ms)
    #[arg(long, env = "SESSION_TTL_MS", default_value_t = 24 * 60 * 60 * 1000)]
    pub session_ttl_ms: u64,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 20)]
    pub rate_limit: u32,

    // Rate limit window in milliseconds
    #[arg(long, env = "RATE_WINDOW_MS", default_value_t = 60_000)]
    pub rate_window_ms: u64,

    // Entries idle longer than this get swept
    #[arg(long, env = "CLEANUP_IDLE_MS", default_value_t = 60_000)]
    pub cleanup_idle_ms: u64,

    // How often the sweeper runs
    #[arg(long, env = "CLEANUP_INTERVAL_MS", default_value_t = 60_000)]
    pub cleanup_interval_ms: u64,

    // Hostnames allowed to call /api/chat (comma-separated)
    // Example: "localhost,chat.example.com"
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "localhost")]
    pub allowed_origins: String,

    // Key anonymous traffic by peer IP instead of one shared bucket
    #[arg(long, env = "RATE_LIMIT_BY_IP", default_value_t = false)]
    pub rate_limit_by_ip: bool,

    // Max characters in the last user message
    #[arg(long, env = "MAX_MESSAGE_CHARS", default_value_t = 3500)]
    pub max_message_chars: usize,

    // OpenAI compatible base url
    #[arg(long, env = "MODEL_URL", default_value = "https://api.openai.com/v1")]
    pub model_url: String,

    #[arg(long, env = "MODEL", default_value = "gpt-4.1")]
    pub model: String,

    #[arg(long, env = "MODEL_API_KEY", hide_env_values = true)]
    pub model_api_key: Option<String>,

    // File holding the system prompt sent with every conversation
    #[arg(long, env = "SYSTEM_PROMPT_FILE")]
    pub system_prompt_file: Option<String>,

    // Upstream request timeout in seconds
    #[arg(long, env = "MODEL_TIMEOUT_SECS", default_value_t = 30)]
    pub model_timeout_secs: u64,
}

// Longest accepted rate window / sweep idle threshold (one week)
pub const MAX_WINDOW_MS: u64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("access code must not be empty")]
    EmptyAccessCode,
    #[error("session secret must not be empty")]
    EmptySecret,
    #[error("rate limit must be at least 1")]
    ZeroLimit,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("{0} must not exceed {MAX_WINDOW_MS} ms")]
    TooLong(&'static str),
}

impl Args {
    // Reject settings that would make the gateway useless or open
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_code.is_empty() {
            return Err(ConfigError::EmptyAccessCode);
        }
        if self.session_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.rate_limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.rate_window_ms == 0 {
            return Err(ConfigError::ZeroDuration("rate window"));
        }
        if self.rate_window_ms > MAX_WINDOW_MS {
            return Err(ConfigError::TooLong("rate window"));
        }
        if self.cleanup_idle_ms > MAX_WINDOW_MS {
            return Err(ConfigError::TooLong("cleanup idle threshold"));
        }
        if self.session_ttl_ms == 0 {
            return Err(ConfigError::ZeroDuration("session ttl"));
        }
        if self.cleanup_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("cleanup interval"));
        }
        Ok(())
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            limit: self.rate_limit,
            window_ms: self.rate_window_ms,
        }
    }

    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            idle_ms: self.cleanup_idle_ms,
            interval: Duration::from_millis(self.cleanup_interval_ms),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_millis(self.session_ttl_ms)
    }

    pub fn allowed_origins(&self) -> AllowedOrigins {
        AllowedOrigins::from_list(&self.allowed_origins)
    }
}
