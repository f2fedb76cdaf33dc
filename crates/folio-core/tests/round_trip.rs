//! Property tests for the frontmatter round trip and splice invariants.

use folio_core::frontmatter::{locate, parse, parse_block, serialize, splice};
use folio_core::value::{Map, Value};
use proptest::prelude::*;

fn key() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

/// Single-line scalars, including characters that force quoting.
fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9\\[\"'-][a-zA-Z0-9 .,:#'/-]{0,16}"
}

fn map_of<S>(values: S, max: usize) -> impl Strategy<Value = Map>
where
    S: Strategy<Value = Value>,
{
    prop::collection::vec((key(), values), 1..max)
        .prop_map(|pairs| pairs.into_iter().collect::<Map>())
}

fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        text().prop_map(Value::Scalar),
        prop::collection::vec(text().prop_map(Value::Scalar), 0..6).prop_map(Value::List),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        let item = prop_oneof![
            text().prop_map(Value::Scalar),
            map_of(text().prop_map(Value::Scalar), 4).prop_map(Value::Map),
        ];
        prop_oneof![
            map_of(inner, 4).prop_map(Value::Map),
            prop::collection::vec(item, 1..5).prop_map(Value::List),
        ]
    })
}

fn document_body() -> impl Strategy<Value = String> {
    "(# [A-Za-z ]{1,12}\n)?([A-Za-z .:-]{0,30}\n){0,4}"
}

proptest! {
    #[test]
    fn serialize_then_parse_is_identity(map in map_of(value(), 6)) {
        let text = serialize(&map);
        prop_assert_eq!(parse_block(&text), map, "serialized:\n{}", text);
    }

    #[test]
    fn splice_preserves_body(map in map_of(value(), 4), body in document_body()) {
        let original = format!("---\nold: value\n---\n{body}");
        let spliced = splice(&original, &map);
        let block = locate(&spliced).expect("spliced document has a block");
        prop_assert_eq!(&spliced[block.end..], &original[locate(&original).unwrap().end..]);
        prop_assert_eq!(parse(&spliced), map);
    }

    #[test]
    fn splice_is_idempotent(map in map_of(value(), 4), body in document_body()) {
        let once = splice(&body, &map);
        let twice = splice(&once, &map);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(twice.matches("---").count(), once.matches("---").count());
    }
}
