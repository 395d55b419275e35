pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod model;
pub mod models;
pub mod origin;
pub mod rate_limit;
pub mod session;
pub mod state;
pub mod validation;
