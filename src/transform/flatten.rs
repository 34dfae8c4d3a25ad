//! Flattening of provider responses
//!
//! Turns a nested JSON object into an ordered list of `(dotted.path, value)` pairs.
//! Objects are recursed into depth-first in source key order; arrays are kept as a
//! single stringified leaf so the table stays one row per provider field.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Path separator used when joining nested keys
pub const PATH_SEPARATOR: char = '.';

// ============================================================================
// Flat values
// ============================================================================

/// Leaf value of a flattened response
///
/// Scalars are carried through unchanged; arrays are collapsed into their
/// textual form (see [`render_array`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(String),
}

impl FlatValue {
    /// Convert a leaf value. Containers are stringified, which only happens for
    /// arrays in practice since objects are recursed into.
    pub fn from_leaf(value: &Value) -> Self {
        match value {
            Value::Null => FlatValue::Null,
            Value::Bool(b) => FlatValue::Bool(*b),
            Value::Number(n) => FlatValue::Number(n.clone()),
            Value::String(s) => FlatValue::Text(s.clone()),
            Value::Array(items) => FlatValue::List(render_array(items)),
            Value::Object(_) => {
                let mut out = String::new();
                write_value(value, &mut out);
                FlatValue::Text(out)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FlatValue::Null)
    }
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Null renders as an empty cell
            FlatValue::Null => Ok(()),
            FlatValue::Bool(b) => write!(f, "{}", b),
            FlatValue::Number(n) => write!(f, "{}", n),
            FlatValue::Text(s) | FlatValue::List(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FlatValue {
    fn from(s: &str) -> Self {
        FlatValue::Text(s.to_string())
    }
}

impl From<i64> for FlatValue {
    fn from(n: i64) -> Self {
        FlatValue::Number(n.into())
    }
}

impl From<bool> for FlatValue {
    fn from(b: bool) -> Self {
        FlatValue::Bool(b)
    }
}

/// One `(path, value)` pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatEntry {
    pub path: String,
    pub value: FlatValue,
}

impl FlatEntry {
    pub fn new(path: impl Into<String>, value: impl Into<FlatValue>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Flattening options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Provider prefixes removed from keys before they are joined into a path.
    /// Applied in order: `P.rest` becomes `rest`, and a key equal to `P` is
    /// dropped from the path so its children attach to the parent.
    pub strip_prefixes: Vec<String>,
}

impl FlattenOptions {
    pub fn with_strip_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strip_prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    fn clean_key<'a>(&self, key: &'a str) -> &'a str {
        let mut clean = key;
        for prefix in &self.strip_prefixes {
            if let Some(rest) = clean
                .strip_prefix(prefix.as_str())
                .and_then(|r| r.strip_prefix(PATH_SEPARATOR))
            {
                clean = rest;
            } else if clean == prefix.as_str() {
                clean = "";
            }
        }
        clean
    }
}

// ============================================================================
// Flatten
// ============================================================================

/// Flatten a provider response.
///
/// Only objects have fields to flatten; any other top-level value yields no entries.
/// Callers that need to distinguish that case check `Value::is_object` first.
pub fn flatten(tree: &Value, options: &FlattenOptions) -> Vec<FlatEntry> {
    let mut entries = Vec::new();
    if let Value::Object(map) = tree {
        flatten_into(map, "", options, &mut entries);
    }
    entries
}

fn flatten_into(
    map: &Map<String, Value>,
    prefix: &str,
    options: &FlattenOptions,
    out: &mut Vec<FlatEntry>,
) {
    for (key, value) in map {
        let key = options.clean_key(key);
        let path = match (prefix.is_empty(), key.is_empty()) {
            (true, _) => key.to_string(),
            (false, true) => prefix.to_string(),
            (false, false) => format!("{}{}{}", prefix, PATH_SEPARATOR, key),
        };

        match value {
            Value::Object(child) => flatten_into(child, &path, options, out),
            leaf => out.push(FlatEntry {
                path,
                value: FlatValue::from_leaf(leaf),
            }),
        }
    }
}

/// Textual form of an array leaf: `[1, "a", {"k": null}]`
pub fn render_array(items: &[Value]) -> String {
    let mut out = String::with_capacity(items.len() * 8 + 2);
    write_array(items, &mut out);
    out
}

fn write_array(items: &[Value], out: &mut String) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(item, out);
    }
    out.push(']');
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => write_array(items, out),
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                // Value's Display quotes and escapes strings
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push_str(": ");
                write_value(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert_path(node: &mut Value, parts: &[&str], leaf: Value) {
        if let Some(map) = node.as_object_mut() {
            match parts {
                [last] => {
                    map.insert(last.to_string(), leaf);
                }
                [head, rest @ ..] => {
                    let child = map
                        .entry(head.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    insert_path(child, rest, leaf);
                }
                [] => {}
            }
        }
    }

    /// Rebuild a nested object from flat entries (leaves only)
    fn unflatten(entries: &[FlatEntry]) -> Value {
        let mut root = Value::Object(Map::new());
        for entry in entries {
            let leaf = match &entry.value {
                FlatValue::Null => Value::Null,
                FlatValue::Bool(b) => Value::Bool(*b),
                FlatValue::Number(n) => Value::Number(n.clone()),
                FlatValue::Text(s) | FlatValue::List(s) => Value::String(s.clone()),
            };
            let parts: Vec<&str> = entry.path.split(PATH_SEPARATOR).collect();
            insert_path(&mut root, &parts, leaf);
        }
        root
    }

    #[test]
    fn test_flatten_example() {
        let tree = json!({"A": {"B": 1, "C": [1, 2]}, "D": 2});
        let entries = flatten(&tree, &FlattenOptions::default());

        assert_eq!(
            entries,
            vec![
                FlatEntry::new("A.B", 1),
                FlatEntry {
                    path: "A.C".to_string(),
                    value: FlatValue::List("[1, 2]".to_string()),
                },
                FlatEntry::new("D", 2),
            ]
        );
    }

    #[test]
    fn test_flatten_preserves_source_order() {
        let tree = json!({
            "Zeta": {"z": 1, "a": 2},
            "Alpha": {"m": {"y": true, "b": null}},
            "Mid": "x"
        });
        let paths: Vec<String> = flatten(&tree, &FlattenOptions::default())
            .into_iter()
            .map(|e| e.path)
            .collect();

        assert_eq!(paths, vec!["Zeta.z", "Zeta.a", "Alpha.m.y", "Alpha.m.b", "Mid"]);
    }

    #[test]
    fn test_flatten_keeps_scalars_unchanged() {
        let tree = json!({"n": null, "b": false, "f": 1.5, "s": "text"});
        let entries = flatten(&tree, &FlattenOptions::default());

        assert_eq!(entries[0].value, FlatValue::Null);
        assert_eq!(entries[1].value, FlatValue::Bool(false));
        assert_eq!(entries[2].value.to_string(), "1.5");
        assert_eq!(entries[3].value, FlatValue::Text("text".to_string()));
    }

    #[test]
    fn test_arrays_are_not_expanded() {
        let tree = json!({
            "Directors": [{"Name": "A", "DIN": 1}, {"Name": "B", "DIN": null}],
            "Tags": ["x", "y\"z"],
            "Empty": []
        });
        let entries = flatten(&tree, &FlattenOptions::default());

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0].value,
            FlatValue::List(r#"[{"Name": "A", "DIN": 1}, {"Name": "B", "DIN": null}]"#.to_string())
        );
        assert_eq!(entries[1].value, FlatValue::List(r#"["x", "y\"z"]"#.to_string()));
        assert_eq!(entries[2].value, FlatValue::List("[]".to_string()));
    }

    #[test]
    fn test_empty_object_contributes_nothing() {
        let tree = json!({"A": {}, "B": 1});
        let entries = flatten(&tree, &FlattenOptions::default());
        assert_eq!(entries, vec![FlatEntry::new("B", 1)]);
    }

    #[test]
    fn test_non_object_root_yields_nothing() {
        let options = FlattenOptions::default();
        assert!(flatten(&json!([1, 2]), &options).is_empty());
        assert!(flatten(&json!("x"), &options).is_empty());
    }

    #[test]
    fn test_round_trip_on_leaves() {
        let tree = json!({
            "Response": {"Status": "OK", "RequestId": 42},
            "CompanyMasterSummary": {
                "CompanyStatus": "Active",
                "Address": {"City": "Mumbai", "Pin": 400001},
                "Flags": [true, false]
            },
            "Top": null
        });
        let entries = flatten(&tree, &FlattenOptions::default());
        let rebuilt = unflatten(&entries);

        assert_eq!(rebuilt["Response"]["Status"], "OK");
        assert_eq!(rebuilt["Response"]["RequestId"], 42);
        assert_eq!(rebuilt["CompanyMasterSummary"]["Address"]["Pin"], 400001);
        assert_eq!(rebuilt["CompanyMasterSummary"]["Flags"], "[true, false]");
        assert_eq!(rebuilt["Top"], Value::Null);
        assert_eq!(rebuilt.as_object().map(|m| m.len()), Some(3));
    }

    #[test]
    fn test_strip_prefixes_removes_wrapper_keys() {
        let tree = json!({
            "InstaBasic": {
                "CompanyMasterSummary": {"CompanyStatus": "Active"}
            },
            "InstaFinancials.Response": {"Status": "OK"},
            "Other": 1
        });
        let options = FlattenOptions::with_strip_prefixes(["InstaBasic", "InstaFinancials"]);
        let paths: Vec<String> = flatten(&tree, &options).into_iter().map(|e| e.path).collect();

        assert_eq!(
            paths,
            vec!["CompanyMasterSummary.CompanyStatus", "Response.Status", "Other"]
        );
    }

    #[test]
    fn test_stripped_key_leaves_no_dangling_separator() {
        let tree = json!({"Section": {"InstaBasic": {"Field": 1}, "InstaBasic.Other": 2}});
        let options = FlattenOptions::with_strip_prefixes(["InstaBasic"]);
        let paths: Vec<String> = flatten(&tree, &options).into_iter().map(|e| e.path).collect();

        assert_eq!(paths, vec!["Section.Field", "Section.Other"]);
    }

    #[test]
    fn test_no_stripping_by_default() {
        let tree = json!({"InstaBasic": {"Field": 1}});
        let entries = flatten(&tree, &FlattenOptions::default());
        assert_eq!(entries[0].path, "InstaBasic.Field");
    }

    #[test]
    fn test_empty_prefixes_are_ignored() {
        let options = FlattenOptions::with_strip_prefixes(["", "InstaBasic"]);
        assert_eq!(options.strip_prefixes, vec!["InstaBasic".to_string()]);
    }

    #[test]
    fn test_null_displays_as_empty() {
        assert_eq!(FlatValue::Null.to_string(), "");
        assert_eq!(FlatValue::Bool(true).to_string(), "true");
    }
}
