//! Section grouping for display
//!
//! Buckets flattened entries by their first path segment. The director section is
//! further split into current / past directors; every other section has a single
//! `Main` sub-section.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use super::flatten::{FlatEntry, FlatValue, PATH_SEPARATOR};

/// Section used for top-level keys without a separator
pub const GENERAL_SECTION: &str = "General";

/// Section whose entries are split by director status
pub const DIRECTOR_SECTION: &str = "DirectorSignatoryMasterBasic";

const CURRENT_DIRECTORS_PREFIX: &str = "DirectorCurrentMasterBasic";
const PAST_DIRECTORS_PREFIX: &str = "DirectorPastMasterBasic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubSection {
    #[serde(rename = "Main")]
    Main,
    #[serde(rename = "Current Directors")]
    CurrentDirectors,
    #[serde(rename = "Past Directors")]
    PastDirectors,
    #[serde(rename = "Other")]
    Other,
}

impl SubSection {
    pub fn label(&self) -> &'static str {
        match self {
            SubSection::Main => "Main",
            SubSection::CurrentDirectors => "Current Directors",
            SubSection::PastDirectors => "Past Directors",
            SubSection::Other => "Other",
        }
    }

    /// Pick the sub-section for an entry of `section` with remaining path `subkey`
    pub fn classify(section: &str, subkey: &str) -> Self {
        if section != DIRECTOR_SECTION {
            return SubSection::Main;
        }
        if subkey.starts_with(CURRENT_DIRECTORS_PREFIX) {
            SubSection::CurrentDirectors
        } else if subkey.starts_with(PAST_DIRECTORS_PREFIX) {
            SubSection::PastDirectors
        } else {
            SubSection::Other
        }
    }
}

impl fmt::Display for SubSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entry within a section, keyed by the path minus its section segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionEntry {
    pub key: String,
    pub value: FlatValue,
}

/// Sub-sections of one section, in first-seen order
pub type Section = IndexMap<SubSection, Vec<SectionEntry>>;

/// Ordered mapping from section name to its sub-sections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectionMap {
    sections: IndexMap<String, Section>,
}

impl SectionMap {
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Section)> {
        self.sections.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of entries across all sections
    pub fn entry_count(&self) -> usize {
        self.sections
            .values()
            .flat_map(|section| section.values())
            .map(Vec::len)
            .sum()
    }

    fn push(&mut self, section: &str, subsection: SubSection, entry: SectionEntry) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .entry(subsection)
            .or_default()
            .push(entry);
    }
}

/// Split a path on its first separator into `(section, subkey)`.
/// Paths without a separator belong to the general section.
pub fn split_path(path: &str) -> (&str, &str) {
    path.split_once(PATH_SEPARATOR)
        .unwrap_or((GENERAL_SECTION, path))
}

/// Group flattened entries into display sections
pub fn group(entries: &[FlatEntry]) -> SectionMap {
    let mut sections = SectionMap::default();
    for entry in entries {
        let (section, subkey) = split_path(&entry.path);
        let subsection = SubSection::classify(section, subkey);
        sections.push(
            section,
            subsection,
            SectionEntry {
                key: subkey.to_string(),
                value: entry.value.clone(),
            },
        );
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::flatten::{flatten, FlattenOptions};
    use serde_json::json;

    fn keys(section: &Section, sub: SubSection) -> Vec<&str> {
        section
            .get(&sub)
            .map(|entries| entries.iter().map(|e| e.key.as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_group_example() {
        let tree = json!({"A": {"B": 1, "C": [1, 2]}, "D": 2});
        let sections = group(&flatten(&tree, &FlattenOptions::default()));

        assert_eq!(sections.names().collect::<Vec<_>>(), vec!["A", GENERAL_SECTION]);

        let a = sections.get("A").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(keys(a, SubSection::Main), vec!["B", "C"]);
        assert_eq!(a[&SubSection::Main][1].value.to_string(), "[1, 2]");

        let general = sections.get(GENERAL_SECTION).unwrap();
        assert_eq!(general[&SubSection::Main], vec![SectionEntry {
            key: "D".to_string(),
            value: FlatValue::from(2),
        }]);
    }

    #[test]
    fn test_split_on_first_separator_only() {
        assert_eq!(split_path("A.B.C"), ("A", "B.C"));
        assert_eq!(split_path("Plain"), (GENERAL_SECTION, "Plain"));
        assert_eq!(split_path(""), (GENERAL_SECTION, ""));
    }

    #[test]
    fn test_director_subsections() {
        let entries = vec![
            FlatEntry::new("DirectorSignatoryMasterBasic.DirectorCurrentMasterBasic.Name", "Asha"),
            FlatEntry::new("DirectorSignatoryMasterBasic.DirectorPastMasterBasic.Name", "Ravi"),
            FlatEntry::new("DirectorSignatoryMasterBasic.SignatoryCount", 3),
            FlatEntry::new("DirectorSignatoryMasterBasic.DirectorCurrentMasterBasic.DIN", 123),
        ];
        let sections = group(&entries);
        let directors = sections.get(DIRECTOR_SECTION).unwrap();

        assert_eq!(
            directors.keys().copied().collect::<Vec<_>>(),
            vec![SubSection::CurrentDirectors, SubSection::PastDirectors, SubSection::Other]
        );
        assert_eq!(
            keys(directors, SubSection::CurrentDirectors),
            vec!["DirectorCurrentMasterBasic.Name", "DirectorCurrentMasterBasic.DIN"]
        );
        assert_eq!(keys(directors, SubSection::PastDirectors), vec!["DirectorPastMasterBasic.Name"]);
        assert_eq!(keys(directors, SubSection::Other), vec!["SignatoryCount"]);
    }

    #[test]
    fn test_director_prefix_outside_director_section_is_main() {
        let entries = vec![FlatEntry::new("Other.DirectorCurrentMasterBasic.Name", "x")];
        let sections = group(&entries);
        assert_eq!(keys(sections.get("Other").unwrap(), SubSection::Main), vec![
            "DirectorCurrentMasterBasic.Name"
        ]);
    }

    #[test]
    fn test_group_partitions_every_entry_once() {
        let tree = json!({
            "Response": {"Status": "OK", "RequestId": 7},
            "Solo": true,
            "DirectorSignatoryMasterBasic": {
                "DirectorPastMasterBasic": {"Name": "P"},
                "Count": 2,
                "DirectorCurrentMasterBasic": {"Name": "C"}
            },
            "Another": null,
            "Response2": {"X": [1]}
        });
        let flat = flatten(&tree, &FlattenOptions::default());
        let sections = group(&flat);

        assert_eq!(sections.entry_count(), flat.len());

        // Rebuild full paths from buckets and compare as multisets
        let mut rebuilt: Vec<(String, String)> = Vec::new();
        for (name, section) in sections.iter() {
            for entries in section.values() {
                for e in entries {
                    let path = if name == GENERAL_SECTION && !e.key.contains('.') {
                        e.key.clone()
                    } else {
                        format!("{}.{}", name, e.key)
                    };
                    rebuilt.push((path, e.value.to_string()));
                }
            }
        }
        let mut flattened: Vec<(String, String)> =
            flat.iter().map(|e| (e.path.clone(), e.value.to_string())).collect();
        rebuilt.sort();
        flattened.sort();
        assert_eq!(rebuilt, flattened);
    }

    #[test]
    fn test_duplicate_paths_are_kept() {
        let entries = vec![FlatEntry::new("A.B", 1), FlatEntry::new("A.B", 1)];
        let sections = group(&entries);
        assert_eq!(sections.get("A").unwrap()[&SubSection::Main].len(), 2);
    }

    #[test]
    fn test_sections_serialize_with_labels() {
        let entries = vec![FlatEntry::new("DirectorSignatoryMasterBasic.DirectorPastMasterBasic.Name", "R")];
        let value = serde_json::to_value(group(&entries)).unwrap();
        assert_eq!(
            value["DirectorSignatoryMasterBasic"]["Past Directors"][0]["key"],
            "DirectorPastMasterBasic.Name"
        );
    }
}
