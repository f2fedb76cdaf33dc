//! CLI handlers for `folio frontmatter` subcommands.
//!
//! Implements:
//! - `folio frontmatter get <path> [--field X]`
//! - `folio frontmatter set <path> --field X --value Y`
//! - `folio frontmatter merge <path> --data <json>`
//! - `folio frontmatter validate <path> --schema S`
//! - `folio frontmatter must-haves <path> --block NAME`

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::json;

use folio_core::frontmatter::{self, Schema};
use folio_core::must_haves;
use folio_core::value::{Map, Value};

use crate::files::{print_json, print_not_found, read_optional, write_atomic};
use crate::{FrontmatterCommands, Workspace};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `FrontmatterCommands` variant to the appropriate handler.
pub fn run_frontmatter_command(command: FrontmatterCommands, workspace: &Workspace) -> Result<()> {
    match command {
        FrontmatterCommands::Get { path, field } => {
            cmd_get(&workspace.path(&path), field.as_deref())
        }
        FrontmatterCommands::Set { path, field, value } => {
            cmd_set(&workspace.path(&path), &field, &value)
        }
        FrontmatterCommands::Merge { path, data } => cmd_merge(&workspace.path(&path), &data),
        FrontmatterCommands::Validate { path, schema } => {
            cmd_validate(&workspace.path(&path), schema)
        }
        FrontmatterCommands::MustHaves { path, block } => {
            cmd_must_haves(&workspace.path(&path), &block)
        }
    }
}

/// Read `--value`. Arrays, objects, quoted strings and `null` are decoded
/// as JSON; anything else (numbers included) is kept as written, so `2.10`
/// stays `2.10`. `None` means the field should be removed.
fn parse_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let looks_like_json = trimmed == "null" || trimmed.starts_with(['[', '{', '"']);
    if !looks_like_json {
        return Some(Value::scalar(raw));
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => Value::from_json(&json),
        Err(_) => Some(Value::scalar(raw)),
    }
}

// -----------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------

fn cmd_get(path: &Path, field: Option<&str>) -> Result<()> {
    let Some(content) = read_optional(path)? else {
        return print_not_found(path);
    };
    let meta = frontmatter::parse(&content);

    match field {
        None => print_json(&meta),
        Some(field) => match meta.get(field) {
            Some(value) => print_json(&json!({ field: value })),
            None => print_json(&json!({ "error": "Field not found", "field": field })),
        },
    }
}

fn cmd_set(path: &Path, field: &str, raw: &str) -> Result<()> {
    let Some(content) = read_optional(path)? else {
        return print_not_found(path);
    };
    let value = parse_value(raw);
    let shown = value.as_ref().map(Value::to_json);

    match frontmatter::set_field(&content, field, value) {
        Ok(updated) => {
            write_atomic(path, &updated)?;
            print_json(&json!({ "updated": true, "field": field, "value": shown }))
        }
        Err(e) => print_json(&json!({ "updated": false, "field": field, "error": e.to_string() })),
    }
}

fn cmd_merge(path: &Path, data: &str) -> Result<()> {
    let json: serde_json::Value =
        serde_json::from_str(data).context("--data is not valid JSON")?;
    let Some(object) = json.as_object() else {
        bail!("--data must be a JSON object");
    };

    let Some(content) = read_optional(path)? else {
        return print_not_found(path);
    };
    let fields = Map::from_json_object(object);
    let keys: Vec<String> = fields.keys().map(str::to_owned).collect();

    match frontmatter::merge(&content, fields) {
        Ok(merged) => {
            write_atomic(path, &merged)?;
            print_json(&json!({ "merged": true, "fields": keys }))
        }
        Err(e) => print_json(&json!({ "merged": false, "error": e.to_string() })),
    }
}

fn cmd_validate(path: &Path, schema: Schema) -> Result<()> {
    let Some(content) = read_optional(path)? else {
        return print_not_found(path);
    };
    print_json(&frontmatter::validate(&frontmatter::parse(&content), schema))
}

fn cmd_must_haves(path: &Path, block: &str) -> Result<()> {
    let Some(content) = read_optional(path)? else {
        return print_not_found(path);
    };
    let items = must_haves::parse_block(&content, block);
    print_json(&json!({ "block": block, "count": items.len(), "items": items }))
}
