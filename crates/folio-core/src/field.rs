//! Field lookup and rewriting in document bodies.
//!
//! A field is addressed by label, and two forms are recognized (ASCII case
//! ignored):
//!
//! - a bold label, `**Status:** In progress`, whose value is the rest of the
//!   line;
//! - a heading, `## Status`, whose value is the text up to the next heading
//!   of the same or a shallower level.
//!
//! The bold form wins when both exist. Rewrites touch only the value span.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::markdown;

/// Errors from field rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field not found: {0:?}")]
    NotFound(String),
}

/// Byte span of a bold label's value within its line.
struct LabelMatch {
    /// Whitespace run between the closing `**` and the value.
    gap: std::ops::Range<usize>,
    value: std::ops::Range<usize>,
}

/// `label` as a pattern that ignores ASCII case only, like heading lookup.
fn label_pattern(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                format!("[{}{}]", c.to_ascii_lowercase(), c.to_ascii_uppercase())
            } else {
                regex::escape(c.encode_utf8(&mut [0; 4]))
            }
        })
        .collect()
}

fn find_label(content: &str, label: &str) -> Option<LabelMatch> {
    let pattern = format!(r"\*\*{}:\*\*([ \t]*)([^\r\n]*)", label_pattern(label.trim()));
    // Every label character is escaped, so the pattern always compiles.
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(content)?;
    let gap = caps.get(1)?.range();
    let value = caps.get(2)?.range();
    Some(LabelMatch { gap, value })
}

/// Value of a `**Label:**` line, trimmed.
pub fn extract_label(content: &str, label: &str) -> Option<String> {
    let found = find_label(content, label)?;
    Some(content[found.value].trim().to_owned())
}

/// Body of the `# Heading` section titled `heading`, trimmed.
pub fn extract_section(content: &str, heading: &str) -> Option<String> {
    let section = markdown::find_section(content, heading)?;
    Some(content[section.body].trim().to_owned())
}

/// Value of a field in either form.
pub fn extract_field(content: &str, label: &str) -> Option<String> {
    extract_label(content, label).or_else(|| extract_section(content, label))
}

/// Rewrite the value of a field, leaving every other byte alone.
pub fn replace_field(content: &str, label: &str, value: &str) -> Result<String, FieldError> {
    let value = value.trim();

    if let Some(found) = find_label(content, label) {
        let mut out = String::with_capacity(content.len() + value.len());
        out.push_str(&content[..found.value.start]);
        if found.gap.is_empty() {
            out.push(' ');
        }
        out.push_str(value);
        out.push_str(&content[found.value.end..]);
        return Ok(out);
    }

    if let Some(section) = markdown::find_section(content, label) {
        let followed = section.body.end < content.len();
        let mut body = String::new();
        if !section.heading.line.has_terminator() {
            body.push('\n');
        }
        body.push('\n');
        body.push_str(value);
        body.push('\n');
        if followed {
            body.push('\n');
        }

        let mut out = String::with_capacity(content.len() + body.len());
        out.push_str(&content[..section.body.start]);
        out.push_str(&body);
        out.push_str(&content[section.body.end..]);
        return Ok(out);
    }

    debug!(label, "field not found");
    Err(FieldError::NotFound(label.to_owned()))
}

/// Result of a multi-field [`patch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOutcome {
    /// The document after every successful replacement.
    #[serde(skip)]
    pub content: String,
    pub updated: Vec<String>,
    pub failed: Vec<String>,
}

impl PatchOutcome {
    /// Some fields were written and some were not.
    pub fn is_partial(&self) -> bool {
        !self.updated.is_empty() && !self.failed.is_empty()
    }
}

/// Apply several field replacements in order.
///
/// Each replacement runs against the result of the previous one, so when two
/// labels address overlapping text the later one wins. Misses are recorded
/// and skipped; nothing is rolled back.
pub fn patch<'a, I>(content: &str, fields: I) -> PatchOutcome
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut current = content.to_owned();
    let mut updated = Vec::new();
    let mut failed = Vec::new();

    for (label, value) in fields {
        match replace_field(&current, label, value) {
            Ok(next) => {
                current = next;
                updated.push(label.to_owned());
            }
            Err(FieldError::NotFound(_)) => failed.push(label.to_owned()),
        }
    }

    debug!(updated = updated.len(), failed = failed.len(), "patch applied");
    PatchOutcome {
        content: current,
        updated,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATE: &str = "\
# Project State

**Current Phase:** 02
**Status:** Planning
**Last activity:** 2025-01-10

## Current Position

Phase 2 of 5.

## Session Continuity

Stopped at: plan 02-01
";

    #[test]
    fn replaces_only_the_value() {
        assert_eq!(
            replace_field("**Status:** Old", "Status", "New").unwrap(),
            "**Status:** New"
        );
        let out = replace_field(STATE, "status", "Executing").unwrap();
        assert_eq!(out, STATE.replace("**Status:** Planning", "**Status:** Executing"));
    }

    #[test]
    fn label_match_is_exact_up_to_case() {
        assert_eq!(extract_label(STATE, "PHASE"), None);
        assert_eq!(extract_label(STATE, "current phase").as_deref(), Some("02"));
    }

    #[test]
    fn both_forms_fold_ascii_case_only() {
        let doc = "**ÉTAT:** prêt\n\n## ÉTAPE\n\nun\n";
        assert_eq!(extract_label(doc, "ÉTAT").as_deref(), Some("prêt"));
        assert_eq!(extract_label(doc, "état"), None);
        assert_eq!(extract_section(doc, "ÉTAPE").as_deref(), Some("un"));
        assert_eq!(extract_section(doc, "étape"), None);
        // Kelvin sign folds to `k` under Unicode rules.
        assert_eq!(extract_label("**\u{212A}ey:** v", "key"), None);
        assert_eq!(extract_label("**KEY:** v", "key").as_deref(), Some("v"));
    }

    #[test]
    fn missing_field_is_an_error_value() {
        assert_eq!(
            replace_field(STATE, "Owner", "me"),
            Err(FieldError::NotFound("Owner".into()))
        );
        assert_eq!(extract_field(STATE, "Owner"), None);
    }

    #[test]
    fn empty_label_value_gains_a_space() {
        assert_eq!(
            replace_field("**Blocker:**\nnext", "Blocker", "none").unwrap(),
            "**Blocker:** none\nnext"
        );
    }

    #[test]
    fn heading_section_extract_and_replace() {
        assert_eq!(
            extract_field(STATE, "Current Position").as_deref(),
            Some("Phase 2 of 5.")
        );
        let out = replace_field(STATE, "Current Position", "Phase 3 of 5.").unwrap();
        assert!(out.contains("## Current Position\n\nPhase 3 of 5.\n\n## Session Continuity"));
        assert!(out.starts_with("# Project State\n\n**Current Phase:** 02"));
    }

    #[test]
    fn heading_at_end_of_file_without_newline() {
        let once = replace_field("## Notes", "notes", "hello").unwrap();
        assert_eq!(once, "## Notes\n\nhello\n");
        assert_eq!(replace_field(&once, "notes", "hello").unwrap(), once);
    }

    #[test]
    fn crlf_lines_keep_their_terminator() {
        let out = replace_field("**Status:** a\r\nrest", "Status", "b").unwrap();
        assert_eq!(out, "**Status:** b\r\nrest");
    }

    #[test]
    fn patch_reports_partial_success() {
        let outcome = patch(STATE, [("Status", "Executing"), ("Nope", "x"), ("Current Phase", "03")]);
        assert_eq!(outcome.updated, vec!["Status", "Current Phase"]);
        assert_eq!(outcome.failed, vec!["Nope"]);
        assert!(outcome.is_partial());
        assert!(outcome.content.contains("**Current Phase:** 03"));
        assert!(outcome.content.contains("**Status:** Executing"));
    }

    #[test]
    fn patch_applies_in_order_latest_wins() {
        let outcome = patch(STATE, [("Status", "first"), ("Status", "second")]);
        assert!(outcome.content.contains("**Status:** second"));
        assert_eq!(outcome.updated.len(), 2);
    }

    #[test]
    fn repeated_patch_is_a_no_op() {
        let fields = [("Status", "Done"), ("Session Continuity", "Stopped at: end")];
        let once = patch(STATE, fields).content;
        let twice = patch(&once, fields).content;
        assert_eq!(once, twice);
    }
}
