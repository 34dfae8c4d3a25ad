// API server binary entry point
//
// Serves the lookup form, the JSON lookup endpoint and the webhook sink.
// Usage: cargo run --bin api_server

use insta_lookup::{create_router, telemetry, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    tracing::info!("Starting API server...");

    // Configuration from environment variables, config.yaml as fallback
    let config = AppConfig::load()?;
    let addr = config.bind_addr().await?;

    tracing::info!("Configuration:");
    tracing::info!("  INSTA_BASE_URL: {}", config.base_url);
    tracing::info!("  INSTA_API_KEY: {}", if config.api_key.is_some() { "set" } else { "missing" });
    tracing::info!("  WEBHOOK_URL: {}", config.webhook_url.as_deref().unwrap_or("(none)"));
    tracing::info!("  WEBHOOK_DIR: {}", config.webhook_dir.display());
    tracing::info!("  STRIP_PREFIXES: {:?}", config.strip_prefixes);

    let state = AppState::new(config)?;
    state.webhooks.ensure_dir().await?;

    // Create router with all endpoints and middleware
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
