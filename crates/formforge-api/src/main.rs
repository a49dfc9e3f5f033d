//! FormForge API server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use formforge_api::{build_router, ApiConfig, AppState};
use formforge_core::{Engine, InMemoryRecordStore, SystemClock, TokenBucketThrottle, TracingEventPublisher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::load().context("loading configuration")?;

    let clock = Arc::new(SystemClock);
    let engine = Engine::builder(Arc::new(InMemoryRecordStore::new()))
        .config(config.engine.clone())
        .clock(clock.clone())
        .throttle(Arc::new(TokenBucketThrottle::new(
            config.rate_limit.submissions_per_hour,
            config.rate_limit.burst,
            clock,
        )))
        .events(Arc::new(TracingEventPublisher))
        .build();

    let app = build_router(AppState { engine });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "FormForge API listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("serving HTTP")?;
    Ok(())
}
