// Axum server module
//
// Routes:
//   GET  /                 lookup form
//   POST /                 lookup by CIN, rendered as HTML
//   GET  /api/lookup/:cin  lookup by CIN, JSON
//   POST /webhook/insta    provider callback sink
//   GET  /health           liveness

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::error::LookupError;
use crate::pipeline::{lookup_company, CompanyReport};
use crate::provider::{CompanyLookup, InstaFinancialsClient};
use crate::transform::FlattenOptions;
use crate::web::handlers::pages;
use crate::webhook::{WebhookError, WebhookStore};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn CompanyLookup>,
    pub webhooks: Arc<WebhookStore>,
    pub flatten_options: Arc<FlattenOptions>,
}

impl AppState {
    /// State backed by the real InstaFinancials client
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing InstaFinancials client...");
        let provider = InstaFinancialsClient::from_config(&config)?;
        if config.api_key.is_none() {
            tracing::warn!("INSTA_API_KEY is not set; lookups will fail until it is configured");
        }
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// State backed by any lookup implementation
    pub fn with_provider(config: AppConfig, provider: Arc<dyn CompanyLookup>) -> Self {
        let webhooks = Arc::new(WebhookStore::new(config.webhook_dir.clone()));
        let flatten_options = Arc::new(config.flatten_options());
        Self {
            config: Arc::new(config),
            provider,
            webhooks,
            flatten_options,
        }
    }

    pub async fn lookup(&self, cin: &str) -> Result<CompanyReport, LookupError> {
        let result = lookup_company(
            self.provider.as_ref(),
            cin,
            self.config.webhook_url.as_deref(),
            &self.flatten_options,
        )
        .await;

        if let Err(e) = &result {
            tracing::warn!("Lookup for '{}' failed ({:?}): {}", cin.trim(), e.kind(), e);
        }
        result
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let webhooks = state.webhooks.clone();

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // HTML form
        .route("/", get(pages::index_page).post(pages::lookup_page))

        // JSON lookup
        .route("/api/lookup/:cin", get(get_lookup))
        .with_state(state)

        // Provider callbacks
        .merge(webhook_router(webhooks))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Router with only the webhook endpoint
pub fn webhook_router(store: Arc<WebhookStore>) -> Router {
    Router::new()
        .route("/webhook/insta", post(receive_webhook))
        .with_state(store)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_lookup(
    State(state): State<AppState>,
    Path(cin): Path<String>,
) -> Result<Json<CompanyReport>, AppError> {
    let report = state.lookup(&cin).await?;
    Ok(Json(report))
}

async fn receive_webhook(
    State(store): State<Arc<WebhookStore>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let path = store.persist(&body).await?;
    tracing::info!("Webhook received: {} bytes stored at {}", body.len(), path.display());

    Ok(Json(serde_json::json!({
        "status": "received"
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Lookup(LookupError),
    Webhook(WebhookError),
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        AppError::Lookup(err)
    }
}

impl From<WebhookError> for AppError {
    fn from(err: WebhookError) -> Self {
        AppError::Webhook(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, message) = match self {
            AppError::Lookup(err) => {
                let status = match &err {
                    LookupError::MissingCin => StatusCode::BAD_REQUEST,
                    LookupError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
                    LookupError::Upstream { .. } | LookupError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
                    LookupError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    LookupError::Network(_) => StatusCode::BAD_GATEWAY,
                };
                (status, serde_json::json!(err.kind()), err.to_string())
            }
            AppError::Webhook(err) => {
                tracing::error!("Failed to store webhook payload: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!("storage"),
                    err.to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind
        }));

        (status, body).into_response()
    }
}
