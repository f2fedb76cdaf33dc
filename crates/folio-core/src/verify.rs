//! Checks of must-have artifacts and key links against file contents.
//!
//! Callers read the files; these functions only look at the text they are
//! handed. `None` content means the file does not exist.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::must_haves::{Artifact, KeyLink};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactCheck {
    pub path: String,
    pub exists: bool,
    pub passed: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub all_passed: bool,
    pub passed: usize,
    pub total: usize,
    pub artifacts: Vec<ArtifactCheck>,
}

impl ArtifactReport {
    pub fn from_checks(artifacts: Vec<ArtifactCheck>) -> Self {
        let passed = artifacts.iter().filter(|a| a.passed).count();
        Self {
            all_passed: passed == artifacts.len(),
            passed,
            total: artifacts.len(),
            artifacts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCheck {
    pub from: String,
    pub to: String,
    pub via: Option<String>,
    pub verified: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub all_verified: bool,
    pub verified: usize,
    pub total: usize,
    pub links: Vec<LinkCheck>,
}

impl LinkReport {
    pub fn from_checks(links: Vec<LinkCheck>) -> Self {
        let verified = links.iter().filter(|l| l.verified).count();
        Self {
            all_verified: verified == links.len(),
            verified,
            total: links.len(),
            links,
        }
    }
}

/// Whether `name` appears in `content` as a whole word.
fn mentions_word(content: &str, name: &str) -> bool {
    Regex::new(&format!(r"\b{}\b", regex::escape(name)))
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

/// Check one artifact: it exists, is long enough, contains the required
/// text and mentions every export by name.
pub fn check_artifact(artifact: &Artifact, content: Option<&str>) -> ArtifactCheck {
    let Some(content) = content else {
        return ArtifactCheck {
            path: artifact.path.clone(),
            exists: false,
            passed: false,
            issues: vec!["File not found".to_owned()],
        };
    };

    let mut issues = Vec::new();
    if let Some(min) = artifact.min_lines {
        let lines = content.lines().count() as u64;
        if lines < min {
            issues.push(format!("Only {lines} lines, need {min}"));
        }
    }
    if let Some(needle) = artifact.contains.as_deref() {
        if !content.contains(needle) {
            issues.push(format!("Missing pattern: {needle}"));
        }
    }
    for name in &artifact.exports {
        if !mentions_word(content, name) {
            issues.push(format!("Missing export: {name}"));
        }
    }

    debug!(path = %artifact.path, issues = issues.len(), "artifact checked");
    ArtifactCheck {
        path: artifact.path.clone(),
        exists: true,
        passed: issues.is_empty(),
        issues,
    }
}

/// Check one key link.
///
/// With a `pattern`, the regex must match the source or, failing that, the
/// target. Without one, the source must mention the target's path.
pub fn check_key_link(link: &KeyLink, from: Option<&str>, to: Option<&str>) -> LinkCheck {
    let (verified, detail) = match (from, link.pattern.as_deref()) {
        (None, _) => (false, "Source file not found".to_owned()),
        (Some(source), Some(pattern)) => match Regex::new(pattern) {
            Err(err) => (false, format!("Invalid regex pattern: {err}")),
            Ok(re) if re.is_match(source) => (true, "Pattern found in source".to_owned()),
            Ok(re) if to.is_some_and(|target| re.is_match(target)) => {
                (true, "Pattern found in target".to_owned())
            }
            Ok(_) => (
                false,
                format!("Pattern {pattern:?} not found in source or target"),
            ),
        },
        (Some(source), None) if source.contains(link.to.as_str()) => {
            (true, "Target referenced in source".to_owned())
        }
        (Some(_), None) => (false, "Target not referenced in source".to_owned()),
    };

    debug!(from = %link.from, to = %link.to, verified, "key link checked");
    LinkCheck {
        from: link.from.clone(),
        to: link.to.clone(),
        via: link.via.clone(),
        verified,
        detail,
    }
}
