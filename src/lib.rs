//! InstaFinancials company lookup
//!
//! Web front-end and HTTP client around the InstaFinancials company-data API.
//!
//! - `provider/`: authenticated lookup client (`CompanyLookup` trait + reqwest client)
//! - `transform/`: flatten / group / summarize of provider responses for display
//! - `pipeline`: fetch-by-CIN and report building
//! - `webhook`: storage for asynchronous provider callbacks
//! - `api_server`, `web/`: axum router, HTML form and JSON endpoints (feature `api`)

pub mod config;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod telemetry;
pub mod transform;
pub mod webhook;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ErrorKind, LookupError};
pub use pipeline::{build_report, fetch_company_by_cin, lookup_company, CompanyRecord, CompanyReport};
pub use provider::{CompanyLookup, InstaFinancialsClient, LookupRequest};
pub use transform::{flatten, group, summarize, FlatEntry, FlatValue, FlattenOptions, SectionMap, Summary};
pub use webhook::WebhookStore;

#[cfg(feature = "api")]
pub use api_server::{create_router, webhook_router, AppState};
