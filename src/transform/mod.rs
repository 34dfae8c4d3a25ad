//! Response reshaping for display
//!
//! - `flatten`: nested JSON -> ordered `(dotted.path, value)` pairs
//! - `sections`: flat pairs -> sections and sub-sections keyed by the first segment
//! - `summary`: flat pairs -> the fixed set of status card fields

pub mod flatten;
pub mod sections;
pub mod summary;

pub use flatten::{flatten, render_array, FlatEntry, FlatValue, FlattenOptions};
pub use sections::{group, SectionEntry, SectionMap, SubSection, DIRECTOR_SECTION, GENERAL_SECTION};
pub use summary::{summarize, Summary, SUMMARY_PATHS};
