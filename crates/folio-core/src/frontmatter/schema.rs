//! Required-field checklists for the document kinds that carry frontmatter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Map;

/// A frontmatter schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    Plan,
    Summary,
    Verification,
}

impl Schema {
    /// Fields every document of this kind must define.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Plan => &[
                "phase",
                "plan",
                "type",
                "wave",
                "depends_on",
                "files_modified",
                "autonomous",
                "must_haves",
            ],
            Self::Summary => &["phase", "plan", "subsystem", "tags", "duration", "completed"],
            Self::Verification => &["phase", "verified", "status", "score"],
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plan => "plan",
            Self::Summary => "summary",
            Self::Verification => "verification",
        };
        f.write_str(s)
    }
}

impl FromStr for Schema {
    type Err = SchemaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Self::Plan),
            "summary" => Ok(Self::Summary),
            "verification" => Ok(Self::Verification),
            other => Err(SchemaParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unknown [`Schema`] name.
#[derive(Debug, Clone, Error)]
#[error("unknown schema {0:?} (expected plan, summary, or verification)")]
pub struct SchemaParseError(pub String);

/// Result of checking a map against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub missing: Vec<String>,
    pub present: Vec<String>,
    pub schema: Schema,
}

/// Check that every required field of `schema` is present in `map`.
///
/// Presence is all that is checked; a key with an empty value counts.
pub fn validate(map: &Map, schema: Schema) -> Validation {
    let (present, missing): (Vec<&str>, Vec<&str>) = schema
        .required_fields()
        .iter()
        .copied()
        .partition(|field| map.contains_key(field));

    Validation {
        valid: missing.is_empty(),
        missing: missing.into_iter().map(str::to_owned).collect(),
        present: present.into_iter().map(str::to_owned).collect(),
        schema,
    }
}
