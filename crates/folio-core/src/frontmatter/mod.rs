//! Frontmatter handling: block location, parsing, serialization, splicing
//! and required-field schemas.
//!
//! A frontmatter block opens with a bare `---` as the first line of the
//! document (a UTF-8 BOM may precede it) and closes at the next bare `---`
//! line. An unclosed block runs to the end of the document.

pub mod parser;
pub mod schema;
pub mod serialize;
pub mod splice;

use std::ops::Range;

pub use parser::{parse, parse_block};
pub use schema::{Schema, SchemaParseError, Validation, validate};
pub use serialize::serialize;
pub use splice::{FrontmatterError, merge, set_field, splice};

/// A located frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Byte offset of the opening `---`.
    pub start: usize,
    /// Byte offset just past the closing `---` (its line terminator excluded),
    /// or the document length when the block is unclosed.
    pub end: usize,
    /// Text between the delimiters, without the final line terminator.
    pub inner: &'a str,
}

impl Block<'_> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Find the frontmatter block of `content`, if there is one.
pub fn locate(content: &str) -> Option<Block<'_>> {
    let start = if content.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let first_end = content[start..]
        .find('\n')
        .map_or(content.len(), |i| start + i);
    if !is_delimiter(&content[start..first_end]) {
        return None;
    }

    let inner_start = (first_end + 1).min(content.len());
    let mut pos = inner_start;
    while pos < content.len() {
        let line_end = content[pos..].find('\n').map_or(content.len(), |i| pos + i);
        if is_delimiter(&content[pos..line_end]) {
            let inner = content[inner_start..pos].trim_end_matches('\n');
            let inner = inner.strip_suffix('\r').unwrap_or(inner);
            return Some(Block {
                start,
                end: line_end,
                inner,
            });
        }
        pos = line_end + 1;
    }

    Some(Block {
        start,
        end: content.len(),
        inner: &content[inner_start..],
    })
}

/// The document body: everything after the frontmatter block.
pub fn body(content: &str) -> &str {
    match locate(content) {
        Some(block) => &content[block.end..],
        None => content,
    }
}
