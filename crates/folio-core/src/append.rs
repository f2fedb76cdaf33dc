//! Appending to tables and lists under a heading, and ticking checklist
//! boxes.
//!
//! Sections that have nothing in them yet carry a placeholder line such as
//! `None yet.` (bare, bulleted or as a table row). Appending replaces the
//! placeholder instead of writing next to it, and removing the last list
//! item puts [`NONE_PLACEHOLDER`] back.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::markdown::{self, Line};
use crate::phase::{PhaseNumber, references};

/// Line written into a list section that has become empty.
pub const NONE_PLACEHOLDER: &str = "None";

const PLACEHOLDERS: &[&str] = &["none", "none yet", "no decisions yet", "no blockers", "(none)"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppendError {
    #[error("section not found: {0:?}")]
    SectionNotFound(String),
    #[error("no table under section {0:?}")]
    TableNotFound(String),
    #[error("no checklist entry for phase {0}")]
    CheckboxNotFound(String),
    #[error("phase {0} is already checked")]
    AlreadyChecked(String),
}

/// Whether `line` is an empty-section placeholder.
///
/// Table pipes, a list bullet, emphasis markers and one trailing period are
/// ignored, as is ASCII case.
pub fn is_placeholder(line: &str) -> bool {
    let mut text = line.trim();
    if text.contains('|') {
        let cells: Vec<&str> = text
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        match cells.as_slice() {
            [only] => text = only,
            _ => return false,
        }
    }
    if let Some(item) = markdown::bullet_text(text) {
        text = item;
    }
    let text = text.trim_matches(['*', '_']).trim();
    let text = text.strip_suffix('.').unwrap_or(text).trim();
    PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(text))
}

/// Line terminator to reuse after `line`.
fn eol<'a>(content: &'a str, line: &Line<'_>) -> &'a str {
    match &content[line.end..line.next] {
        "" => "\n",
        ending => ending,
    }
}

/// Lines of the section body up to its first sub-heading, plus the offset
/// where that region ends.
fn region<'a>(content: &'a str, heading: &str) -> Result<(Vec<Line<'a>>, usize), AppendError> {
    let section = markdown::find_section(content, heading)
        .ok_or_else(|| AppendError::SectionNotFound(heading.to_owned()))?;
    let mut out = Vec::new();
    let mut end = section.body.end;
    for line in markdown::lines(content) {
        if line.start < section.body.start || line.start >= section.body.end {
            continue;
        }
        if markdown::heading(line).is_some() {
            end = line.start;
            break;
        }
        out.push(line);
    }
    Ok((out, end))
}

fn is_separator_row(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('|')
        && text.contains('-')
        && text.chars().all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

/// Add `row` to the markdown table under `heading`.
///
/// A lone placeholder row is replaced. Otherwise the row goes after the last
/// row of the table, ahead of any blank line or heading that follows it.
pub fn append_table_row(content: &str, heading: &str, row: &str) -> Result<String, AppendError> {
    let (lines, _) = region(content, heading)?;
    let sep = lines
        .iter()
        .position(|l| is_separator_row(l.text))
        .ok_or_else(|| AppendError::TableNotFound(heading.to_owned()))?;

    let rows: Vec<&Line<'_>> = lines[sep + 1..]
        .iter()
        .take_while(|l| l.text.trim_start().starts_with('|') || is_placeholder(l.text))
        .collect();
    let row = row.trim();

    if let [only] = rows.as_slice() {
        if is_placeholder(only.text) {
            debug!(heading, "replacing table placeholder");
            return Ok(splice(content, only.start..only.end, row));
        }
    }

    let last = rows.last().copied().unwrap_or(&lines[sep]);
    let insert = if last.has_terminator() {
        format!("{row}{}", eol(content, last))
    } else {
        format!("\n{row}")
    };
    debug!(heading, "appending table row");
    Ok(splice(content, last.next..last.next, &insert))
}

fn splice(content: &str, range: std::ops::Range<usize>, with: &str) -> String {
    let mut out = String::with_capacity(content.len() + with.len());
    out.push_str(&content[..range.start]);
    out.push_str(with);
    out.push_str(&content[range.end..]);
    out
}

/// Add `- item` to the list under `heading`, dropping any placeholder.
pub fn append_list_item(content: &str, heading: &str, item: &str) -> Result<String, AppendError> {
    let section = markdown::find_section(content, heading)
        .ok_or_else(|| AppendError::SectionNotFound(heading.to_owned()))?;
    let (lines, end) = region(content, heading)?;
    let item = item.trim();

    if lines.is_empty() {
        let mut body = String::new();
        if !section.heading.line.has_terminator() {
            body.push('\n');
        }
        body.push_str(&format!("\n- {item}\n"));
        if end < content.len() {
            body.push('\n');
        }
        return Ok(splice(content, section.body.start..end, &body));
    }

    let items = |l: &&Line<'_>| markdown::bullet_text(l.text).is_some() && !is_placeholder(l.text);
    let last_item = lines.iter().rposition(|l| items(&l));
    let first_placeholder = lines.iter().position(|l| is_placeholder(l.text));

    // Write the new item before lines[at], or after the last line when
    // `at == lines.len()`.
    let at = match (last_item, first_placeholder) {
        (Some(i), _) => i + 1,
        (None, Some(p)) => p,
        (None, None) if lines[0].text.trim().is_empty() => 1,
        (None, None) => 0,
    };

    let mut rebuilt = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == at {
            rebuilt.push_str(&format!("- {item}{}", eol(content, line)));
        }
        if is_placeholder(line.text) {
            continue;
        }
        rebuilt.push_str(&content[line.start..line.next]);
        if i + 1 == at && at == lines.len() && !line.has_terminator() {
            rebuilt.push('\n');
        }
    }
    if at == lines.len() {
        rebuilt.push_str(&format!("- {item}\n"));
        if last_item.is_none() && end < content.len() {
            rebuilt.push('\n');
        }
    }

    debug!(heading, replaced = first_placeholder.is_some(), "appending list item");
    Ok(splice(content, section.body.start..end, &rebuilt))
}

/// Result of [`remove_list_items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub content: String,
    /// Text of each removed item.
    pub removed: Vec<String>,
}

/// Remove every list item under `heading` whose text contains `needle`,
/// ignoring ASCII case. An emptied list gets [`NONE_PLACEHOLDER`].
pub fn remove_list_items(content: &str, heading: &str, needle: &str) -> Result<Removal, AppendError> {
    let section = markdown::find_section(content, heading)
        .ok_or_else(|| AppendError::SectionNotFound(heading.to_owned()))?;
    let (lines, end) = region(content, heading)?;
    let needle = needle.trim().to_ascii_lowercase();

    let matches = |line: &Line<'_>| {
        markdown::bullet_text(line.text)
            .is_some_and(|t| !is_placeholder(line.text) && t.to_ascii_lowercase().contains(&needle))
    };
    let removed: Vec<String> = lines
        .iter()
        .filter(|l| matches(*l))
        .filter_map(|l| markdown::bullet_text(l.text))
        .map(str::to_owned)
        .collect();
    if removed.is_empty() || needle.is_empty() {
        return Ok(Removal {
            content: content.to_owned(),
            removed: Vec::new(),
        });
    }

    let remaining = lines
        .iter()
        .filter(|l| markdown::bullet_text(l.text).is_some() && !matches(*l))
        .count();

    let mut rebuilt = String::new();
    let mut placed = remaining > 0;
    for line in &lines {
        if matches(line) {
            if !placed {
                rebuilt.push_str(NONE_PLACEHOLDER);
                rebuilt.push_str(eol(content, line));
                placed = true;
            }
            continue;
        }
        rebuilt.push_str(&content[line.start..line.next]);
    }

    debug!(heading, removed = removed.len(), "removed list items");
    Ok(Removal {
        content: splice(content, section.body.start..end, &rebuilt),
        removed,
    })
}

/// Tick the checklist line for `phase` and annotate it with the date.
///
/// The line's subject is its first `Phase <n>` reference, so `Phase 1`
/// never matches a `Phase 10` line. Nothing is written when the box is
/// already ticked.
pub fn toggle_checkbox(
    content: &str,
    phase: &PhaseNumber,
    completed_on: NaiveDate,
) -> Result<String, AppendError> {
    let item = markdown::checklist(content)
        .into_iter()
        .find(|item| {
            references(item.text)
                .first()
                .is_some_and(|(found, _)| found == phase)
        })
        .ok_or_else(|| AppendError::CheckboxNotFound(phase.to_string()))?;

    if item.checked {
        return Err(AppendError::AlreadyChecked(phase.to_string()));
    }

    let annotation = format!(" (completed {})", completed_on.format("%Y-%m-%d"));
    let mut out = String::with_capacity(content.len() + annotation.len());
    out.push_str(&content[..item.mark]);
    out.push('x');
    out.push_str(&content[item.mark + 1..item.line.end]);
    out.push_str(&annotation);
    out.push_str(&content[item.line.end..]);
    debug!(%phase, "checkbox ticked");
    Ok(out)
}
