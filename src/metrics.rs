use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("chat_requests_total", "Total number of API requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("chat_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref AUTH_FAILURES: Counter =
        register_counter!("chat_auth_failures_total", "Rejected access codes and sessions").unwrap();
    pub static ref SESSIONS_ISSUED: Counter =
        register_counter!("chat_sessions_issued_total", "Session credentials handed out").unwrap();
    pub static ref MODEL_LATENCY: Histogram = register_histogram!(
        "chat_model_latency_seconds",
        "Model completion latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("chat_rate_limit_entries", "Identifiers tracked by the rate limiter").unwrap();
}
