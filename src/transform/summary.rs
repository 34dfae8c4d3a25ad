//! Status card fields picked out of a flattened response

use indexmap::IndexMap;
use serde::Serialize;

use super::flatten::{FlatEntry, FlatValue, PATH_SEPARATOR};

/// Dotted paths shown on the summary card
pub const SUMMARY_PATHS: [&str; 4] = [
    "Response.Status",
    "Response.RequestId",
    "CompanyMasterSummary.CompanyStatus",
    "CompanyMasterSummary.LastUpdatedDateTime",
];

/// Summary fields keyed by the last segment of their path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Summary {
    fields: IndexMap<String, FlatValue>,
}

impl Summary {
    pub fn get(&self, field: &str) -> Option<&FlatValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlatValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Extract the allow-listed summary fields. Missing paths are simply absent.
pub fn summarize(entries: &[FlatEntry]) -> Summary {
    let mut fields = IndexMap::new();
    for entry in entries {
        if !SUMMARY_PATHS.contains(&entry.path.as_str()) {
            continue;
        }
        let name = entry
            .path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(entry.path.as_str());
        fields.insert(name.to_string(), entry.value.clone());
    }
    Summary { fields }
}
