// Standalone webhook receiver
//
// Accepts provider callbacks on POST /webhook/insta and stores each payload.
// Listens on WEBHOOK_PORT (default 5000).
// Usage: cargo run --bin webhook_server

use insta_lookup::{telemetry, webhook_router, AppConfig, WebhookStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const DEFAULT_WEBHOOK_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = AppConfig::load()?;
    let port: u16 = match std::env::var("WEBHOOK_PORT") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid WEBHOOK_PORT '{}'", raw))?,
        Err(_) => DEFAULT_WEBHOOK_PORT,
    };

    let store = Arc::new(WebhookStore::new(config.webhook_dir.clone()));
    store.ensure_dir().await?;
    tracing::info!("Storing webhook payloads in {}", store.dir().display());

    let app = webhook_router(store).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Webhook server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
