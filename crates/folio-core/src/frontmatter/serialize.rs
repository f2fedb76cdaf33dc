//! Frontmatter serializer: [`Map`] to block text.
//!
//! Output is the text between the delimiters, lines joined with `\n` and no
//! trailing newline. The rules mirror what the parser reads back, so
//! `parse_block(&serialize(&map)) == map` for every map whose keys are
//! parser-legal and whose scalars are single-line.

use crate::value::{Map, Value};

/// Inline lists are only used below this joined width.
const INLINE_WIDTH: usize = 60;
/// Inline lists hold at most this many items.
const INLINE_ITEMS: usize = 3;

/// Serialize a map into frontmatter block text.
pub fn serialize(map: &Map) -> String {
    let mut lines = Vec::new();
    write_map(map, 0, &mut lines);
    lines.join("\n")
}

fn write_map(map: &Map, indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    for (key, value) in map.iter() {
        match value {
            Value::Scalar(s) => lines.push(format!("{pad}{key}: {}", render_scalar(s))),
            Value::List(items) if items.is_empty() => lines.push(format!("{pad}{key}: []")),
            Value::List(items) => match inline_list(items) {
                Some(inline) => lines.push(format!("{pad}{key}: [{inline}]")),
                None => {
                    lines.push(format!("{pad}{key}:"));
                    write_items(items, indent + 2, lines);
                }
            },
            Value::Map(child) => {
                lines.push(format!("{pad}{key}:"));
                write_map(child, indent + 2, lines);
            }
        }
    }
}

fn write_items(items: &[Value], indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    for item in items {
        match item {
            Value::Scalar(s) => lines.push(format!("{pad}- {}", render_scalar(s))),
            Value::List(inner) if inner.is_empty() => lines.push(format!("{pad}- []")),
            Value::List(inner) => match inline_list(inner) {
                Some(inline) => lines.push(format!("{pad}- [{inline}]")),
                None => {
                    lines.push(format!("{pad}-"));
                    write_items(inner, indent + 2, lines);
                }
            },
            Value::Map(map) if map.is_empty() => lines.push(format!("{pad}-")),
            Value::Map(map) => {
                // Render the map two columns in, then hang the dash on its
                // first line: `  - key: value` / `    next: value`.
                let start = lines.len();
                write_map(map, indent + 2, lines);
                if let Some(first) = lines.get_mut(start) {
                    first.replace_range(..indent + 2, &format!("{pad}- "));
                }
            }
        }
    }
}

/// Render `items` as `a, b, c` if every item is a short plain scalar.
fn inline_list(items: &[Value]) -> Option<String> {
    if items.len() > INLINE_ITEMS {
        return None;
    }
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let s = item.as_str()?;
        if s.is_empty() || needs_quotes(s) || s.contains([',', ']']) {
            return None;
        }
        parts.push(s);
    }
    let joined = parts.join(", ");
    (joined.len() < INLINE_WIDTH).then_some(joined)
}

fn render_scalar(s: &str) -> String {
    if needs_quotes(s) {
        format!("\"{s}\"")
    } else {
        s.to_owned()
    }
}

/// Whether a scalar would be misread if written bare.
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || s.contains([':', '#'])
        || s.starts_with(['[', '-', '"', '\'', '{'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse_block;

    fn map(entries: Vec<(&str, Value)>) -> Map {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn empty_list_is_bracket_pair() {
        let m = map(vec![("items", Value::List(vec![]))]);
        assert_eq!(serialize(&m), "items: []");
    }

    #[test]
    fn four_items_use_block_form() {
        let m = map(vec![("key", Value::list(["one", "two", "three", "four"]))]);
        assert_eq!(
            serialize(&m),
            "key:\n  - one\n  - two\n  - three\n  - four"
        );
    }

    #[test]
    fn short_lists_are_inline() {
        let m = map(vec![("tags", Value::list(["api", "cli"]))]);
        assert_eq!(serialize(&m), "tags: [api, cli]");
    }

    #[test]
    fn lists_with_colons_or_long_items_use_block_form() {
        let m = map(vec![
            ("refs", Value::list(["a: b"])),
            ("long", Value::list(["x".repeat(70)])),
        ]);
        let text = serialize(&m);
        assert!(text.starts_with("refs:\n  - \"a: b\"\n"));
        assert!(text.contains("long:\n  - xxxx"));
    }

    #[test]
    fn special_scalars_are_quoted() {
        let m = map(vec![
            ("time", Value::scalar("12:30")),
            ("tag", Value::scalar("#1")),
            ("empty", Value::scalar("")),
            ("dash", Value::scalar("-5")),
            ("plain", Value::scalar("hello world")),
        ]);
        assert_eq!(
            serialize(&m),
            "time: \"12:30\"\ntag: \"#1\"\nempty: \"\"\ndash: \"-5\"\nplain: hello world"
        );
    }

    #[test]
    fn nested_maps_indent_by_two() {
        let inner = map(vec![("added", Value::list(["serde"]))]);
        let m = map(vec![("tech_stack", Value::Map(inner))]);
        assert_eq!(serialize(&m), "tech_stack:\n  added: [serde]");
    }

    #[test]
    fn map_items_hang_on_the_dash() {
        let item = map(vec![
            ("path", Value::scalar("src/lib.rs")),
            ("exports", Value::list(["a", "b", "c", "d"])),
        ]);
        let m = map(vec![("artifacts", Value::List(vec![Value::Map(item)]))]);
        let text = serialize(&m);
        assert_eq!(
            text,
            "artifacts:\n  - path: src/lib.rs\n    exports:\n      - a\n      - b\n      - c\n      - d"
        );
        assert_eq!(parse_block(&text), m);
    }

    #[test]
    fn map_item_whose_first_value_is_a_block() {
        let item = map(vec![
            ("files", Value::list(["a", "b", "c", "d"])),
            ("kind", Value::scalar("x")),
        ]);
        let m = map(vec![("groups", Value::List(vec![Value::Map(item)]))]);
        assert_eq!(parse_block(&serialize(&m)), m);
    }

    #[test]
    fn empty_map_round_trips_as_placeholder() {
        let m = map(vec![("must_haves", Value::Map(Map::new())), ("x", Value::scalar("1"))]);
        let text = serialize(&m);
        assert_eq!(text, "must_haves:\nx: 1");
        assert_eq!(parse_block(&text), m);
    }
}
