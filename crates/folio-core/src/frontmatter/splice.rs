//! Frontmatter splicing: put a serialized block into a document.
//!
//! Every frontmatter write goes through [`splice`], so a document never ends
//! up with two blocks and the body is never touched.

use thiserror::Error;
use tracing::debug;

use super::parser::is_key;
use super::{locate, parse, serialize};
use crate::value::{Map, Value};

/// A write that the parser could not read back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontmatterError {
    #[error("invalid frontmatter key {0:?}: use ASCII letters, digits, '_' or '-'")]
    InvalidKey(String),
    #[error("value of {0:?} spans multiple lines")]
    MultilineValue(String),
}

/// Check that every key and scalar in `value` survives a round trip.
///
/// `key` names the entry in errors; list items report their enclosing key.
fn check_entry(key: &str, value: &Value) -> Result<(), FrontmatterError> {
    if !is_key(key) {
        return Err(FrontmatterError::InvalidKey(key.to_owned()));
    }
    check_value(key, value)
}

fn check_value(key: &str, value: &Value) -> Result<(), FrontmatterError> {
    match value {
        Value::Scalar(s) if s.contains(['\r', '\n']) => {
            Err(FrontmatterError::MultilineValue(key.to_owned()))
        }
        Value::Scalar(_) => Ok(()),
        Value::List(items) => items.iter().try_for_each(|item| check_value(key, item)),
        Value::Map(map) => map.iter().try_for_each(|(k, v)| check_entry(k, v)),
    }
}

/// Replace the document's frontmatter block with `map`, or prepend one.
///
/// Only the bytes of the existing block (both delimiters included) change;
/// everything before and after it is copied verbatim. `map` is written as
/// given; [`set_field`] and [`merge`] reject entries it could not read back.
pub fn splice(content: &str, map: &Map) -> String {
    let serialized = serialize(map);
    let block = if serialized.is_empty() {
        "---\n---".to_owned()
    } else {
        format!("---\n{serialized}\n---")
    };

    match locate(content) {
        Some(existing) => {
            debug!(start = existing.start, end = existing.end, "replacing frontmatter block");
            let mut out = String::with_capacity(content.len() + block.len());
            out.push_str(&content[..existing.start]);
            out.push_str(&block);
            out.push_str(&content[existing.end..]);
            out
        }
        None => {
            debug!("prepending frontmatter block");
            format!("{block}\n{content}")
        }
    }
}

/// Set (or with `None`, remove) one top-level field.
pub fn set_field(
    content: &str,
    key: &str,
    value: Option<Value>,
) -> Result<String, FrontmatterError> {
    let mut map = parse(content);
    match value {
        Some(value) => {
            check_entry(key, &value)?;
            map.insert(key, value);
        }
        None => {
            map.remove(key);
        }
    }
    Ok(splice(content, &map))
}

/// Shallow-merge `fields` into the document's frontmatter.
///
/// Existing keys are overwritten in place; new keys are appended in the
/// order given. Nothing is merged if any entry is rejected.
pub fn merge(content: &str, fields: Map) -> Result<String, FrontmatterError> {
    fields.iter().try_for_each(|(k, v)| check_entry(k, v))?;
    let mut map = parse(content);
    map.merge(fields);
    Ok(splice(content, &map))
}
