//! Phase lookup in roadmap documents.
//!
//! A roadmap describes each phase twice: once as a checklist line near the
//! top (`- [ ] **Phase 1: Foundation** - ...`) and once as a detail section
//! under a `## Phase 1: Foundation` (or `###`/`####`) heading.

use serde::Serialize;
use tracing::debug;

use super::number::{PhaseNumber, references};
use crate::field::extract_label;
use crate::markdown::{self, Heading};

/// A phase's detail section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSection {
    pub number: PhaseNumber,
    pub name: String,
    /// `**Goal:**` line. The `**Goal**:` spelling is not recognized.
    pub goal: Option<String>,
    pub depends_on: Option<String>,
    pub requirements: Option<String>,
    pub success_criteria: Vec<String>,
    /// Heading line through the end of the section, trailing blank lines dropped.
    pub section: String,
}

/// Outcome of [`get_phase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseLookup {
    Found(PhaseSection),
    NotFound,
    /// The checklist names the phase but the roadmap has no phase detail
    /// sections at all.
    Malformed { name: Option<String> },
}

/// One row of [`list_phases`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub number: PhaseNumber,
    pub name: String,
    pub goal: Option<String>,
    /// The checklist has a checked line for this phase.
    pub completed: bool,
}

/// Parse `Phase <number>: <name>` from a heading title.
fn phase_title(title: &str) -> Option<(PhaseNumber, &str)> {
    let rest = title.get(..5).filter(|w| w.eq_ignore_ascii_case("phase"))?;
    let after = &title[rest.len()..];
    let token = after.trim_start();
    if token.len() == after.len() {
        return None;
    }
    let (number, used) = PhaseNumber::scan(token)?;
    let name = token[used..].trim_start().strip_prefix(':')?;
    Some((number, name.trim()))
}

fn is_phase_heading(heading: &Heading<'_>) -> bool {
    (2..=4).contains(&heading.level) && phase_title(heading.title).is_some()
}

fn build_section(content: &str, all: &[Heading<'_>], idx: usize) -> Option<PhaseSection> {
    let (number, name) = phase_title(all[idx].title)?;
    let span = markdown::section_at(content, all, idx).full();
    let section = content[span].trim_end();

    Some(PhaseSection {
        number,
        name: name.to_owned(),
        goal: extract_label(section, "Goal").filter(|g| !g.is_empty()),
        depends_on: extract_label(section, "Depends on").filter(|d| !d.is_empty()),
        requirements: extract_label(section, "Requirements").filter(|r| !r.is_empty()),
        success_criteria: success_criteria(section),
        section: section.to_owned(),
    })
}

/// Numbered lines under `**Success Criteria**`, in order, numbers stripped.
fn success_criteria(section: &str) -> Vec<String> {
    let mut lines = section.lines();
    let found = lines
        .by_ref()
        .any(|l| l.to_ascii_lowercase().contains("**success criteria"));
    if !found {
        return Vec::new();
    }

    let mut criteria = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if criteria.is_empty() {
                continue;
            }
            break;
        }
        let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
        let Some(text) = (digits > 0)
            .then(|| trimmed[digits..].strip_prefix('.'))
            .flatten()
        else {
            break;
        };
        let text = text.trim();
        if !text.is_empty() {
            criteria.push(text.to_owned());
        }
    }
    criteria
}

/// Name of `number` on its checklist line (`**Phase 1: Foundation**`).
fn checklist_name(content: &str, number: &PhaseNumber) -> Option<Option<String>> {
    for item in markdown::checklist(content) {
        for (found, end) in references(item.line.text) {
            if found != *number {
                continue;
            }
            let name = item.line.text[end..]
                .trim_start()
                .strip_prefix(':')
                .map(|rest| rest.split("**").next().unwrap_or(rest).trim().to_owned())
                .filter(|n| !n.is_empty());
            return Some(name);
        }
    }
    None
}

/// Look up the detail section of phase `requested`.
///
/// `requested` is normalized first, so `"1"` finds `Phase 01:` and `"1"`
/// never finds `Phase 10:`. An unparsable number is simply not found.
pub fn get_phase(roadmap: &str, requested: &str) -> PhaseLookup {
    let Ok(number) = requested.parse::<PhaseNumber>() else {
        debug!(requested, "unparsable phase number");
        return PhaseLookup::NotFound;
    };

    let all = markdown::headings(roadmap);
    let mut any_detail = false;
    for (idx, heading) in all.iter().enumerate() {
        if !(2..=4).contains(&heading.level) {
            continue;
        }
        let Some((found, _)) = phase_title(heading.title) else {
            continue;
        };
        any_detail = true;
        // Parsed numbers compare structurally, so 1 never matches 10.
        if found == number {
            if let Some(section) = build_section(roadmap, &all, idx) {
                debug!(phase = %number, "phase found");
                return PhaseLookup::Found(section);
            }
        }
    }

    if !any_detail {
        if let Some(name) = checklist_name(roadmap, &number) {
            debug!(phase = %number, "checklist entry without detail sections");
            return PhaseLookup::Malformed { name };
        }
    }
    debug!(phase = %number, "phase not found");
    PhaseLookup::NotFound
}

/// Every phase with a detail section, sorted by phase number.
pub fn list_phases(roadmap: &str) -> Vec<PhaseSummary> {
    let checked: Vec<PhaseNumber> = markdown::checklist(roadmap)
        .into_iter()
        .filter(|item| item.checked)
        .filter_map(|item| references(item.text).into_iter().next().map(|(n, _)| n))
        .collect();

    let all = markdown::headings(roadmap);
    let mut phases: Vec<PhaseSummary> = (0..all.len())
        .filter(|&idx| is_phase_heading(&all[idx]))
        .filter_map(|idx| build_section(roadmap, &all, idx))
        .map(|section| PhaseSummary {
            completed: checked.contains(&section.number),
            number: section.number,
            name: section.name,
            goal: section.goal,
        })
        .collect();
    phases.sort_by(|a, b| a.number.cmp(&b.number));
    phases
}
