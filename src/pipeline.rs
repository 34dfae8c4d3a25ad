//! Company lookup pipeline
//!
//! `fetch_company_by_cin` performs the provider call; `build_report` reshapes the
//! response for display. `lookup_company` chains the two for the web handlers.

use serde::Serialize;
use serde_json::Value;

use crate::error::LookupError;
use crate::provider::{CompanyLookup, LookupRequest};
use crate::transform::{flatten, group, summarize, FlatEntry, FlattenOptions, SectionMap, Summary};

/// Raw provider answer for one CIN
#[derive(Debug, Clone, Serialize)]
pub struct CompanyRecord {
    pub cin: String,
    pub raw_response: Value,
}

/// Display-ready view of one provider answer
#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    pub cin: String,
    pub summary: Summary,
    pub sections: SectionMap,
    pub entries: Vec<FlatEntry>,
}

/// Trim and validate a user-supplied CIN
pub fn normalize_cin(cin: &str) -> Result<&str, LookupError> {
    let cin = cin.trim();
    if cin.is_empty() {
        return Err(LookupError::MissingCin);
    }
    Ok(cin)
}

/// Fetch full company data by CIN. An empty CIN fails before any network call.
pub async fn fetch_company_by_cin(
    client: &dyn CompanyLookup,
    cin: &str,
    webhook_url: Option<&str>,
) -> Result<CompanyRecord, LookupError> {
    let cin = normalize_cin(cin)?;
    let request = LookupRequest::by_cin(cin).with_webhook(webhook_url);
    let raw_response = client.fetch_company_data(&request).await?;

    Ok(CompanyRecord {
        cin: cin.to_string(),
        raw_response,
    })
}

/// Flatten, group and summarize a provider response.
/// The response must be a JSON object.
pub fn build_report(
    cin: &str,
    raw: &Value,
    options: &FlattenOptions,
) -> Result<CompanyReport, LookupError> {
    if !raw.is_object() {
        return Err(LookupError::InvalidResponse(format!(
            "expected a JSON object, got {}",
            json_type_name(raw)
        )));
    }

    let entries = flatten(raw, options);
    let sections = group(&entries);
    let summary = summarize(&entries);

    tracing::debug!(
        "Built report for {}: {} fields in {} sections",
        cin,
        entries.len(),
        sections.len()
    );

    Ok(CompanyReport {
        cin: cin.to_string(),
        summary,
        sections,
        entries,
    })
}

pub async fn lookup_company(
    client: &dyn CompanyLookup,
    cin: &str,
    webhook_url: Option<&str>,
    options: &FlattenOptions,
) -> Result<CompanyReport, LookupError> {
    let record = fetch_company_by_cin(client, cin, webhook_url).await?;
    build_report(&record.cin, &record.raw_response, options)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
