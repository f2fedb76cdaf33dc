//! Frontmatter parser.
//!
//! A single pass over the block's lines, driven by an explicit stack of open
//! containers ("frames"). Each frame remembers the indentation of the line
//! that opened it; a line indented deeper belongs to it, anything else closes
//! it and hands its value to the parent frame.
//!
//! `key:` with nothing after it opens a frame in the placeholder state,
//! because the format cannot tell "empty map", "empty list" and "block list
//! follows" apart until the next line is read. The first `- ` child promotes
//! it to a list, the first `key: value` child promotes it to a map, and a
//! placeholder that never receives a child closes as an empty map.
//!
//! Nothing here fails: lines that fit no rule are skipped.

use tracing::trace;

use super::locate;
use crate::value::{Map, Value};

/// Parse the frontmatter of a whole document.
///
/// Returns an empty map when the document has no block or the block is empty.
pub fn parse(content: &str) -> Map {
    match locate(content) {
        Some(block) => parse_block(block.inner),
        None => Map::new(),
    }
}

/// Parse the text between the delimiters.
pub fn parse_block(text: &str) -> Map {
    let mut stack = vec![Frame {
        owner: 0,
        slot: Slot::Root,
        pending: Pending::Map(Map::new()),
    }];

    for raw in text.lines() {
        let line = raw.trim_end();
        let body = line.trim_start();
        if body.is_empty() || body.starts_with('#') {
            continue;
        }
        let indent = line.len() - body.len();
        let item = item_text(body);

        close_frames(&mut stack, indent, item.is_some());

        let Some(top) = stack.last_mut() else {
            break;
        };
        let opened = match item {
            Some(rest) => read_item(top, indent, indent + body.len() - rest.len(), rest),
            None => read_entry(top, indent, body),
        };
        stack.extend(opened);
    }

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    match stack.pop() {
        Some(Frame {
            pending: Pending::Map(map),
            ..
        }) => map,
        _ => Map::new(),
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Container state while its lines are still being read.
#[derive(Debug)]
enum Pending {
    Placeholder,
    List(Vec<Value>),
    Map(Map),
}

impl Pending {
    fn reify(self) -> Value {
        match self {
            Self::Placeholder => Value::Map(Map::new()),
            Self::List(items) => Value::List(items),
            Self::Map(map) => Value::Map(map),
        }
    }

    /// Promote a placeholder to a list. `None` if this is already a map.
    fn as_list(&mut self) -> Option<&mut Vec<Value>> {
        if matches!(self, Self::Placeholder) {
            *self = Self::List(Vec::new());
        }
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Promote a placeholder to a map. `None` if this is already a list.
    fn as_map(&mut self) -> Option<&mut Map> {
        if matches!(self, Self::Placeholder) {
            *self = Self::Map(Map::new());
        }
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Where a frame's value goes once the frame closes.
#[derive(Debug)]
enum Slot {
    Root,
    Key(String),
    Item,
}

#[derive(Debug)]
struct Frame {
    /// Indentation of the opening line (for map items, of the item's first key).
    owner: usize,
    slot: Slot,
    pending: Pending,
}

impl Frame {
    /// `key:` followed by `- item` lines at the same indentation.
    fn accepts_compact_items(&self) -> bool {
        matches!(self.slot, Slot::Key(_))
            && matches!(self.pending, Pending::Placeholder | Pending::List(_))
    }
}

fn close_frames(stack: &mut Vec<Frame>, indent: usize, is_item: bool) {
    while let Some(top) = stack.last() {
        if matches!(top.slot, Slot::Root) {
            break;
        }
        let belongs = indent > top.owner
            || (is_item && indent == top.owner && top.accepts_compact_items());
        if belongs {
            break;
        }
        pop_into_parent(stack);
    }
}

fn pop_into_parent(stack: &mut Vec<Frame>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let Some(parent) = stack.last_mut() else {
        return;
    };
    let value = frame.pending.reify();
    match frame.slot {
        Slot::Key(key) => {
            if let Some(map) = parent.pending.as_map() {
                map.insert(key, value);
            }
        }
        Slot::Item => {
            if let Some(items) = parent.pending.as_list() {
                items.push(value);
            }
        }
        Slot::Root => {}
    }
}

/// Handle a `- ...` line. Returns the frames it opens.
fn read_item(top: &mut Frame, indent: usize, key_column: usize, rest: &str) -> Vec<Frame> {
    let Some(items) = top.pending.as_list() else {
        trace!(indent, "list item under a map, skipping");
        return Vec::new();
    };

    if rest.is_empty() {
        return vec![Frame {
            owner: indent,
            slot: Slot::Item,
            pending: Pending::Placeholder,
        }];
    }

    match split_entry(rest) {
        Some((key, "")) => vec![
            Frame {
                owner: indent,
                slot: Slot::Item,
                pending: Pending::Map(Map::new()),
            },
            Frame {
                owner: key_column,
                slot: Slot::Key(key.to_owned()),
                pending: Pending::Placeholder,
            },
        ],
        Some((key, value)) => {
            let mut map = Map::new();
            map.insert(key, parse_inline(value));
            vec![Frame {
                owner: indent,
                slot: Slot::Item,
                pending: Pending::Map(map),
            }]
        }
        None => {
            items.push(parse_inline(rest));
            Vec::new()
        }
    }
}

/// Handle a `key: value` line. Returns the frame it opens, if any.
fn read_entry(top: &mut Frame, indent: usize, body: &str) -> Vec<Frame> {
    let Some((key, value)) = split_entry(body) else {
        trace!(indent, "unrecognized frontmatter line, skipping");
        return Vec::new();
    };
    let Some(map) = top.pending.as_map() else {
        trace!(key, "map entry under a list, skipping");
        return Vec::new();
    };

    if value.is_empty() {
        vec![Frame {
            owner: indent,
            slot: Slot::Key(key.to_owned()),
            pending: Pending::Placeholder,
        }]
    } else {
        map.insert(key, parse_inline(value));
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Line-level helpers (shared with the must-haves reader)
// ---------------------------------------------------------------------------

/// The text after a list dash, or `None` if the line is not a list item.
pub(crate) fn item_text(body: &str) -> Option<&str> {
    if body == "-" {
        return Some("");
    }
    body.strip_prefix("- ").map(str::trim_start)
}

/// Split `key: value` into its trimmed parts.
///
/// Keys are ASCII alphanumerics, `_` and `-`; the colon must be followed by
/// whitespace or end the line, so `http://host` is not an entry.
pub(crate) fn split_entry(s: &str) -> Option<(&str, &str)> {
    let colon = s.find(':')?;
    let key = &s[..colon];
    if !is_key(key) {
        return None;
    }
    let rest = &s[colon + 1..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    Some((key, rest.trim()))
}

/// Whether `key` can be read back as a map key.
pub(crate) fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse an inline value: `[a, b]` lists or a possibly quoted scalar.
pub(crate) fn parse_inline(value: &str) -> Value {
    match value.strip_prefix('[') {
        Some(inner) => {
            let inner = inner.strip_suffix(']').unwrap_or(inner);
            Value::List(split_inline_list(inner).map(Value::Scalar).collect())
        }
        None => Value::Scalar(unquote(value).to_owned()),
    }
}

/// Split the inside of `[...]` on every comma.
///
/// Quoting is not honoured: `["a, b", c]` yields three items. Empty items
/// are dropped.
pub(crate) fn split_inline_list(inner: &str) -> impl Iterator<Item = String> + '_ {
    inner
        .split(',')
        .map(|s| unquote(s.trim()).to_owned())
        .filter(|s| !s.is_empty())
}

/// Strip one pair of matching surrounding quotes.
pub(crate) fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> Value {
        Value::scalar(s)
    }

    #[test]
    fn inline_list() {
        let map = parse("---\nkey: [a, b, c]\n---\n");
        assert_eq!(map.get("key"), Some(&Value::list(["a", "b", "c"])));
    }

    #[test]
    fn placeholder_promotes_to_list() {
        let map = parse("---\nrequirements:\n  - REQ-01\n  - REQ-02\n---\n");
        assert_eq!(
            map.get("requirements"),
            Some(&Value::list(["REQ-01", "REQ-02"]))
        );
    }

    #[test]
    fn placeholder_without_children_is_empty_map() {
        let map = parse("---\nmust_haves:\nphase: 02\n---\n");
        assert_eq!(map.get("must_haves"), Some(&Value::Map(Map::new())));
        assert_eq!(map.get("phase"), Some(&scalar("02")));
    }

    #[test]
    fn quotes_are_stripped_once() {
        let map = parse("---\na: \"x: y\"\nb: 'single'\nc: \"'kept'\"\nd: half\"\n---\n");
        assert_eq!(map.get("a"), Some(&scalar("x: y")));
        assert_eq!(map.get("b"), Some(&scalar("single")));
        assert_eq!(map.get("c"), Some(&scalar("'kept'")));
        assert_eq!(map.get("d"), Some(&scalar("half\"")));
    }

    #[test]
    fn nested_map_two_levels() {
        let text = "tech_stack:\n  added:\n    - serde\n    - clap\n  patterns: [builder]\nphase: 03\n";
        let map = parse_block(text);
        let stack = map.get("tech_stack").and_then(Value::as_map).unwrap();
        assert_eq!(stack.get("added"), Some(&Value::list(["serde", "clap"])));
        assert_eq!(stack.get("patterns"), Some(&Value::list(["builder"])));
        assert_eq!(map.get("phase"), Some(&scalar("03")));
    }

    #[test]
    fn list_of_maps_keeps_item_fields_together() {
        let text = "\
must_haves:
  artifacts:
    - path: src/lib.rs
      provides: engine
      exports:
        - parse
        - serialize
    - path: src/main.rs
";
        let map = parse_block(text);
        let artifacts = map
            .get("must_haves")
            .and_then(Value::as_map)
            .and_then(|m| m.get("artifacts"))
            .and_then(Value::as_list)
            .unwrap();
        assert_eq!(artifacts.len(), 2);

        let first = artifacts[0].as_map().unwrap();
        assert_eq!(first.get("path"), Some(&scalar("src/lib.rs")));
        assert_eq!(first.get("provides"), Some(&scalar("engine")));
        assert_eq!(first.get("exports"), Some(&Value::list(["parse", "serialize"])));

        let second = artifacts[1].as_map().unwrap();
        assert_eq!(second.get("path"), Some(&scalar("src/main.rs")));
    }

    #[test]
    fn compact_sequence_at_key_indent() {
        let map = parse_block("tags:\n- alpha\n- beta\nnext: value\n");
        assert_eq!(map.get("tags"), Some(&Value::list(["alpha", "beta"])));
        assert_eq!(map.get("next"), Some(&scalar("value")));
    }

    #[test]
    fn blank_comment_and_junk_lines_are_skipped() {
        let text = "# generated\nphase: 01\n\nnot an entry\n- stray item\nplan: 02\n";
        let map = parse_block(text);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["phase", "plan"]);
    }

    #[test]
    fn empty_inline_list_and_empty_items() {
        let map = parse_block("a: []\nb: [x, , y]\n");
        assert_eq!(map.get("a"), Some(&Value::List(vec![])));
        assert_eq!(map.get("b"), Some(&Value::list(["x", "y"])));
    }

    #[test]
    fn inline_list_split_ignores_quoting() {
        // Known limitation: commas inside quotes still split.
        let map = parse_block("k: [\"a, b\", c]\n");
        assert_eq!(map.get("k"), Some(&Value::list(["\"a", "b\"", "c"])));
    }

    #[test]
    fn urls_are_scalars_not_entries() {
        let map = parse_block("links:\n  - https://example.com/a\n");
        assert_eq!(map.get("links"), Some(&Value::list(["https://example.com/a"])));
    }

    #[test]
    fn duplicate_key_replaces_in_place() {
        let map = parse_block("a: 1\nb: 2\na: 3\n");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&scalar("3")));
    }

    #[test]
    fn missing_delimiters_give_empty_map() {
        assert!(parse("phase: 01\n").is_empty());
        assert!(parse("---\n---\n").is_empty());
    }
}
