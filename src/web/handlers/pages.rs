// Page handlers for HTML rendering with Askama

use askama::Template;
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse},
};
use serde::Deserialize;

use crate::api_server::AppState;
use crate::error::LookupError;
use crate::pipeline::CompanyReport;

// ============================================================================
// View models
// ============================================================================

pub struct SummaryField {
    pub label: String,
    pub value: String,
}

pub struct RowView {
    pub key: String,
    pub value: String,
}

pub struct GroupView {
    pub label: String,
    pub rows: Vec<RowView>,
}

pub struct SectionView {
    pub name: String,
    pub groups: Vec<GroupView>,
}

pub struct ErrorView {
    pub title: String,
    pub message: String,
}

// ============================================================================
// Index Page
// ============================================================================

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub cin: String,
    pub summary: Vec<SummaryField>,
    pub sections: Vec<SectionView>,
    pub error: Option<ErrorView>,
}

impl IndexTemplate {
    pub fn empty() -> Self {
        Self {
            title: "InstaFinancials Company Lookup".to_string(),
            cin: String::new(),
            summary: Vec::new(),
            sections: Vec::new(),
            error: None,
        }
    }

    pub fn with_report(report: &CompanyReport) -> Self {
        let summary = report
            .summary
            .iter()
            .map(|(label, value)| SummaryField {
                label: label.clone(),
                value: value.to_string(),
            })
            .collect();

        let sections = report
            .sections
            .iter()
            .map(|(name, section)| SectionView {
                name: name.clone(),
                groups: section
                    .iter()
                    .map(|(subsection, entries)| GroupView {
                        label: subsection.label().to_string(),
                        rows: entries
                            .iter()
                            .map(|entry| RowView {
                                key: entry.key.clone(),
                                value: entry.value.to_string(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            cin: report.cin.clone(),
            summary,
            sections,
            ..Self::empty()
        }
    }

    pub fn with_error(cin: &str, err: &LookupError) -> Self {
        Self {
            cin: cin.trim().to_string(),
            error: Some(ErrorView {
                title: err.kind().title().to_string(),
                message: err.to_string(),
            }),
            ..Self::empty()
        }
    }

    pub fn has_result(&self) -> bool {
        !self.summary.is_empty() || !self.sections.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupForm {
    #[serde(default)]
    pub cin: String,
}

pub async fn index_page() -> impl IntoResponse {
    render(IndexTemplate::empty())
}

pub async fn lookup_page(
    State(state): State<AppState>,
    Form(form): Form<LookupForm>,
) -> impl IntoResponse {
    let template = match state.lookup(&form.cin).await {
        Ok(report) => IndexTemplate::with_report(&report),
        Err(err) => IndexTemplate::with_error(&form.cin, &err),
    };
    render(template)
}

fn render(template: IndexTemplate) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template error: {}", e);
        format!("Template error: {}", e)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::build_report;
    use crate::transform::FlattenOptions;
    use serde_json::json;

    #[test]
    fn test_empty_page_renders_form() {
        let html = IndexTemplate::empty().render().unwrap();
        assert!(html.contains("name=\"cin\""));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_report_page_renders_sections_in_order() {
        let raw = json!({
            "Response": {"Status": "Success"},
            "DirectorSignatoryMasterBasic": {
                "DirectorCurrentMasterBasic": {"Name": "Asha"},
                "DirectorPastMasterBasic": {"Name": "Ravi"}
            },
            "Loose": 1
        });
        let report = build_report("L1", &raw, &FlattenOptions::default()).unwrap();
        let html = IndexTemplate::with_report(&report).render().unwrap();

        let response = html.find("<h2>Response</h2>").unwrap();
        let directors = html.find("<h2>DirectorSignatoryMasterBasic</h2>").unwrap();
        let general = html.find("<h2>General</h2>").unwrap();
        assert!(response < directors && directors < general);

        assert!(html.contains("Current Directors"));
        assert!(html.contains("Past Directors"));
        assert!(html.contains("DirectorPastMasterBasic.Name"));
    }

    #[test]
    fn test_values_are_html_escaped() {
        let raw = json!({"Company": {"Name": "<script>alert(1)</script>"}});
        let report = build_report("L1", &raw, &FlattenOptions::default()).unwrap();
        let html = IndexTemplate::with_report(&report).render().unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_error_page_shows_category() {
        let err = LookupError::Upstream {
            status: 503,
            body: "maintenance".to_string(),
        };
        let html = IndexTemplate::with_error(" L1 ", &err).render().unwrap();
        assert!(html.contains("Provider error"));
        assert!(html.contains("provider returned HTTP 503: maintenance"));
        assert!(html.contains("value=\"L1\""));
    }
}
