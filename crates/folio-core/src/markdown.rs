//! Line, heading and checklist scanning shared by the body operations.
//!
//! Everything works on byte offsets into the original text so callers can
//! rewrite exactly the span they located and copy the rest verbatim.

use std::ops::Range;

/// One line of a document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset just past the content (`\r\n` / `\n` excluded).
    pub end: usize,
    /// Offset of the next line, or the document length.
    pub next: usize,
    pub text: &'a str,
}

impl Line<'_> {
    pub fn has_terminator(&self) -> bool {
        self.next > self.end
    }
}

pub(crate) fn lines(content: &str) -> Vec<Line<'_>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < content.len() {
        let (end, next) = match content[pos..].find('\n') {
            Some(i) => (pos + i, pos + i + 1),
            None => (content.len(), content.len()),
        };
        let end = if end > pos && content.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        out.push(Line {
            start: pos,
            end,
            next,
            text: &content[pos..end],
        });
        pos = next;
    }
    out
}

/// An ATX heading (`## Title`).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Heading<'a> {
    pub level: usize,
    pub title: &'a str,
    pub line: Line<'a>,
}

/// Parse `line` as a heading, if it is one.
pub(crate) fn heading(line: Line<'_>) -> Option<Heading<'_>> {
    let text = line.text.trim_start();
    let level = text.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &text[level..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim_end();
    Some(Heading { level, title, line })
}

/// Every heading outside fenced code blocks.
pub(crate) fn headings(content: &str) -> Vec<Heading<'_>> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for line in lines(content) {
        let trimmed = line.text.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(h) = heading(line) {
            out.push(h);
        }
    }
    out
}

/// A heading plus the byte range of its body.
#[derive(Debug, Clone)]
pub(crate) struct Section<'a> {
    pub heading: Heading<'a>,
    /// From the line after the heading up to the next heading of the same or
    /// a shallower level (exclusive), or the end of the document.
    pub body: Range<usize>,
}

impl Section<'_> {
    /// Heading line through the end of the body.
    pub fn full(&self) -> Range<usize> {
        self.heading.line.start..self.body.end
    }
}

/// Resolve the section that `all[idx]` opens.
pub(crate) fn section_at<'a>(content: &str, all: &[Heading<'a>], idx: usize) -> Section<'a> {
    let heading = all[idx];
    let end = all[idx + 1..]
        .iter()
        .find(|h| h.level <= heading.level)
        .map_or(content.len(), |h| h.line.start);
    Section {
        heading,
        body: heading.line.next..end,
    }
}

/// The first section whose title matches `title`, ignoring ASCII case.
pub(crate) fn find_section<'a>(content: &'a str, title: &str) -> Option<Section<'a>> {
    let all = headings(content);
    let idx = all
        .iter()
        .position(|h| h.title.eq_ignore_ascii_case(title.trim()))?;
    Some(section_at(content, &all, idx))
}

/// A markdown task-list line (`- [ ] text` / `* [x] text`).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChecklistItem<'a> {
    pub line: Line<'a>,
    pub checked: bool,
    /// Offset of the character between the brackets.
    pub mark: usize,
    pub text: &'a str,
}

pub(crate) fn checklist_item(line: Line<'_>) -> Option<ChecklistItem<'_>> {
    let trimmed = line.text.trim_start();
    let indent = line.text.len() - trimmed.len();
    let rest = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))?;
    let gap = rest.len() - rest.trim_start().len();
    let rest = rest.trim_start();
    let checked = match rest.get(..3)? {
        "[ ]" => false,
        "[x]" | "[X]" => true,
        _ => return None,
    };
    Some(ChecklistItem {
        line,
        checked,
        mark: line.start + indent + 2 + gap + 1,
        text: rest[3..].trim(),
    })
}

pub(crate) fn checklist(content: &str) -> Vec<ChecklistItem<'_>> {
    lines(content).into_iter().filter_map(checklist_item).collect()
}

/// `- item` / `* item` list text, if `line` is a bullet.
pub(crate) fn bullet_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .map(str::trim)
}
