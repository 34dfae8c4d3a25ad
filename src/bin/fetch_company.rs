//! Fetch one company by CIN and print the result as JSON
//!
//! Usage: cargo run --bin fetch_company -- <CIN> [--report]
//!
//! Prints `{"cin": ..., "raw_response": ...}` by default. With `--report` the
//! response is flattened and printed as summary + sections instead.
//! The configured WEBHOOK_URL, if any, is sent along with the request.

use anyhow::Context;
use insta_lookup::{build_report, fetch_company_by_cin, telemetry, AppConfig, InstaFinancialsClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let report = args.iter().any(|a| a == "--report");
    let cin = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .context("usage: fetch_company <CIN> [--report]")?;

    let config = AppConfig::load()?;
    let client = InstaFinancialsClient::from_config(&config)?;

    let record = fetch_company_by_cin(&client, cin, config.webhook_url.as_deref())
        .await
        .with_context(|| format!("Lookup failed for {}", cin))?;

    let output = if report {
        let report = build_report(&record.cin, &record.raw_response, &config.flatten_options())?;
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(&record)?
    };
    println!("{}", output);

    Ok(())
}
