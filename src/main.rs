//! Wellness pricing HTTP server.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wellness_pricing::config::Config;
use wellness_pricing::{app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellness_pricing=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Cache {} (ttl {}s, capacity {})",
        if config.cache_enabled { "enabled" } else { "disabled" },
        config.cache_ttl.as_secs(),
        config.cache_capacity
    );

    let state = AppState::from_config(&config);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app(state))
        .await
        .context("server error")?;
    Ok(())
}
