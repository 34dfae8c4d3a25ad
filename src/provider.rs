//! InstaFinancials HTTP client
//!
//! One authenticated GET per lookup:
//! `GET {base_url}/{lookup_type}/{lookup_value}/{scope}` with `user-key` auth and an
//! optional `Webhook` header asking the provider to deliver results asynchronously.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::LookupError;

pub const DEFAULT_BASE_URL: &str = "https://instafinancials.com/api/InstaBasic/v1/json";
pub const DEFAULT_LOOKUP_TYPE: &str = "CompanyCIN";
pub const DEFAULT_SCOPE: &str = "All";

const USER_KEY_HEADER: &str = "user-key";
const WEBHOOK_HEADER: &str = "Webhook";
const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Longest provider error body carried into a `LookupError::Upstream`
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Parameters of one provider lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub lookup_type: String,
    pub lookup_value: String,
    pub scope: String,
    pub webhook_url: Option<String>,
}

impl LookupRequest {
    /// Full-scope lookup by CIN
    pub fn by_cin(cin: impl Into<String>) -> Self {
        Self {
            lookup_type: DEFAULT_LOOKUP_TYPE.to_string(),
            lookup_value: cin.into(),
            scope: DEFAULT_SCOPE.to_string(),
            webhook_url: None,
        }
    }

    pub fn with_webhook(mut self, webhook_url: Option<&str>) -> Self {
        self.webhook_url = webhook_url
            .filter(|url| !url.trim().is_empty())
            .map(String::from);
        self
    }
}

/// Source of company data. Implemented by [`InstaFinancialsClient`]; tests swap in stubs.
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    async fn fetch_company_data(&self, request: &LookupRequest) -> Result<Value, LookupError>;
}

#[derive(Clone)]
pub struct InstaFinancialsClient {
    base_url: Url,
    api_key: Option<String>,
    http: Client,
}

impl InstaFinancialsClient {
    /// Create a client. A missing API key is reported per request, not here.
    pub fn new(api_key: Option<String>, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| anyhow::anyhow!("Invalid provider base URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Provider base URL '{}' cannot carry a path", base_url);
        }

        Ok(Self {
            base_url,
            api_key,
            http: build_http(Duration::from_secs(REQUEST_TIMEOUT_SECS))?,
        })
    }

    /// Replace the overall request timeout (30 s by default)
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(config.api_key.clone(), &config.base_url)
    }

    /// Endpoint for a lookup; path segments are percent-encoded
    pub fn lookup_url(&self, request: &LookupRequest) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&request.lookup_type)
                .push(&request.lookup_value)
                .push(&request.scope);
        }
        url
    }
}

#[async_trait]
impl CompanyLookup for InstaFinancialsClient {
    async fn fetch_company_data(&self, request: &LookupRequest) -> Result<Value, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;

        let mut builder = self
            .http
            .get(self.lookup_url(request))
            .header(ACCEPT, "application/json")
            .header(USER_KEY_HEADER, api_key);
        if let Some(webhook) = request.webhook_url.as_deref() {
            builder = builder.header(WEBHOOK_HEADER, webhook);
        }

        tracing::debug!(
            lookup_type = %request.lookup_type,
            lookup_value = %request.lookup_value,
            scope = %request.scope,
            webhook = request.webhook_url.is_some(),
            "Requesting company data"
        );

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => truncate_body(body),
                Err(e) => {
                    tracing::debug!("Failed to read provider error body: {}", e);
                    String::new()
                }
            };
            tracing::warn!("Provider returned HTTP {} for {}", status.as_u16(), request.lookup_value);
            return Err(LookupError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| LookupError::InvalidResponse(e.to_string()))
    }
}

fn build_http(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
        .build()
}

fn truncate_body(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body,
    }
}
