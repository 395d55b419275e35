use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_gateway::app::{build_router, build_state};
use chat_gateway::config::Args;
use chat_gateway::rate_limit::{RateLimiter, Sweeper};

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments / env
    let args = Args::parse();
    args.validate()?;

    let system_prompt = match &args.system_prompt_file {
        Some(path) => Some(tokio::fs::read_to_string(path).await?),
        None => None,
    };

    // limiter and its sweeper share one lifecycle
    let limiter = Arc::new(RateLimiter::new());
    let sweeper = Sweeper::spawn(limiter.clone(), args.sweep_config());

    let state = Arc::new(build_state(&args, limiter, system_prompt)?);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(address = %listener.local_addr()?, "Gateway listening");
    tracing::info!(url = %args.model_url, model = %args.model, "Forwarding chats");
    tracing::info!(
        limit = args.rate_limit,
        window_ms = args.rate_window_ms,
        origins = %args.allowed_origins,
        "Rate limit configured"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
