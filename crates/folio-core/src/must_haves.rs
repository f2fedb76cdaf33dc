//! Reader for the `must_haves` sub-schema of plan frontmatter.
//!
//! ```text
//! must_haves:
//!   truths:
//!     - "User can log in"
//!   artifacts:
//!     - path: src/auth.rs
//!       provides: session handling
//!       min_lines: 40
//!       exports: [login, logout]
//!   key_links:
//!     - from: src/routes.rs
//!       to: src/auth.rs
//!       via: login()
//!       pattern: "auth::login"
//! ```
//!
//! Plans in the wild indent this block inconsistently, so this reader does
//! not go through the generic parser. It finds the block's header among the
//! direct children of `must_haves:` (falling back to top-level keys), takes
//! every deeper line after it, splits those into items at the shallowest
//! `- ` lines and flattens each item into a record. Anything deeper than an
//! item's fields is a sub-list of the field above it.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tracing::trace;

use crate::frontmatter::{
    self,
    parser::{item_text, split_entry, split_inline_list, unquote},
};

// ---------------------------------------------------------------------------
// Raw items
// ---------------------------------------------------------------------------

/// A field value inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(u64),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Flatten to a list: text becomes a one-item list unless empty.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Text(s) if s.is_empty() => Vec::new(),
            Self::Text(s) => vec![s.clone()],
            Self::Number(n) => vec![n.to_string()],
            Self::List(items) => items.clone(),
        }
    }

    fn parse(raw: &str) -> Self {
        if let Some(inner) = raw.strip_prefix('[') {
            let inner = inner.strip_suffix(']').unwrap_or(inner);
            return Self::List(split_inline_list(inner).collect());
        }
        let text = unquote(raw);
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = text.parse() {
                return Self::Number(n);
            }
        }
        Self::Text(text.to_owned())
    }

    fn push(&mut self, element: String) {
        match self {
            Self::List(items) => items.push(element),
            other => {
                let mut items = other.to_list();
                items.push(element);
                *other = Self::List(items);
            }
        }
    }
}

/// An item's `field: value` pairs in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            FieldValue::Text(s) if s.is_empty() => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::List(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn set(&mut self, key: &str, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_owned(), value)),
        }
    }

    fn push_to_last(&mut self, element: String) {
        if let Some((_, last)) = self.fields.last_mut() {
            last.push(element);
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One `- ` item of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BlockItem {
    Text(String),
    Record(Record),
}

impl BlockItem {
    fn start(rest: &str) -> Self {
        match split_entry(rest) {
            Some((key, value)) => {
                let mut record = Record::default();
                record.set(key, FieldValue::parse(value));
                Self::Record(record)
            }
            None => Self::Text(unquote(rest).to_owned()),
        }
    }
}

const PARENT: &str = "must_haves";

/// Index of the first `key:` line at exactly `depth` within `range`, with
/// its inline value.
fn key_at<'a>(
    lines: &[(usize, &'a str)],
    range: std::ops::Range<usize>,
    depth: usize,
    key: &str,
) -> Option<(usize, &'a str)> {
    range.into_iter().find_map(|i| {
        let (indent, body) = lines[i];
        let (found, value) = split_entry(body)?;
        (indent == depth && found == key).then_some((i, value))
    })
}

/// Locate the `name:` header: a child of `must_haves:` if there is one,
/// otherwise a top-level key.
fn find_header<'a>(lines: &[(usize, &'a str)], name: &str) -> Option<(usize, &'a str)> {
    let top = lines.iter().map(|&(indent, _)| indent).min()?;

    if let Some((parent, "")) = key_at(lines, 0..lines.len(), top, PARENT) {
        let end = (parent + 1..lines.len())
            .find(|&i| lines[i].0 <= top)
            .unwrap_or(lines.len());
        if parent + 1 < end {
            let depth = lines[parent + 1].0;
            if let Some(found) = key_at(lines, parent + 1..end, depth, name) {
                return Some(found);
            }
        }
    }
    key_at(lines, 0..lines.len(), top, name)
}

/// Read the items of the block named `name`.
///
/// Returns an empty list when the document has no frontmatter or no such
/// block.
pub fn parse_block(content: &str, name: &str) -> Vec<BlockItem> {
    let Some(block) = frontmatter::locate(content) else {
        return Vec::new();
    };

    let lines: Vec<(usize, &str)> = block
        .inner
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let body = l.trim_start();
            (l.len() - body.len(), body)
        })
        .collect();

    let Some((header_idx, inline)) = find_header(&lines, name) else {
        trace!(block = name, "must-haves block not found");
        return Vec::new();
    };
    let base = lines[header_idx].0;
    if inline.starts_with('[') {
        return split_inline_list(inline.trim_start_matches('[').trim_end_matches(']'))
            .map(BlockItem::Text)
            .collect();
    }

    let mut items = Vec::new();
    let mut current: Option<BlockItem> = None;
    let mut item_indent: Option<usize> = None;

    for &(indent, body) in &lines[header_idx + 1..] {
        if indent <= base {
            break;
        }

        if let Some(rest) = item_text(body) {
            let starts_item = item_indent.is_none_or(|i| indent <= i);
            if starts_item {
                item_indent.get_or_insert(indent);
                items.extend(current.take());
                current = Some(BlockItem::start(rest));
            } else if let Some(BlockItem::Record(record)) = current.as_mut() {
                record.push_to_last(unquote(rest).to_owned());
            }
            continue;
        }

        if let (Some(BlockItem::Record(record)), Some((key, value))) =
            (current.as_mut(), split_entry(body))
        {
            record.set(key, FieldValue::parse(value));
        }
    }
    items.extend(current);
    items
}

// ---------------------------------------------------------------------------
// Typed entries
// ---------------------------------------------------------------------------

/// A file the plan promises to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provides: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_lines: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
}

/// A connection the plan promises between two files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyLink {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One must-have, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MustHave {
    Truth(String),
    Artifact(Artifact),
    KeyLink(KeyLink),
}

impl MustHave {
    /// Classify a raw item. Records with neither a `path` nor a
    /// `from`/`to` pair have no typed shape.
    pub fn from_item(item: &BlockItem) -> Option<Self> {
        match item {
            BlockItem::Text(text) => Some(Self::Truth(text.clone())),
            BlockItem::Record(record) => {
                if let Some(path) = record.text("path") {
                    let min_lines = match record.get("min_lines") {
                        Some(FieldValue::Number(n)) => Some(*n),
                        _ => None,
                    };
                    return Some(Self::Artifact(Artifact {
                        path,
                        provides: record.text("provides"),
                        min_lines,
                        contains: record.text("contains"),
                        exports: record.get("exports").map(FieldValue::to_list).unwrap_or_default(),
                    }));
                }
                match (record.text("from"), record.text("to")) {
                    (Some(from), Some(to)) => Some(Self::KeyLink(KeyLink {
                        from,
                        to,
                        via: record.text("via"),
                        pattern: record.text("pattern"),
                    })),
                    _ => None,
                }
            }
        }
    }
}

/// Every classifiable entry of the block named `name`.
pub fn entries(content: &str, name: &str) -> Vec<MustHave> {
    parse_block(content, name)
        .iter()
        .filter_map(MustHave::from_item)
        .collect()
}

pub fn truths(content: &str) -> Vec<String> {
    entries(content, "truths")
        .into_iter()
        .filter_map(|e| match e {
            MustHave::Truth(t) => Some(t),
            _ => None,
        })
        .collect()
}

pub fn artifacts(content: &str) -> Vec<Artifact> {
    entries(content, "artifacts")
        .into_iter()
        .filter_map(|e| match e {
            MustHave::Artifact(a) => Some(a),
            _ => None,
        })
        .collect()
}

pub fn key_links(content: &str) -> Vec<KeyLink> {
    entries(content, "key_links")
        .into_iter()
        .filter_map(|e| match e {
            MustHave::KeyLink(l) => Some(l),
            _ => None,
        })
        .collect()
}
