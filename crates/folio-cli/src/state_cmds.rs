//! CLI handlers for `folio state` subcommands over `<planning>/STATE.md`.
//!
//! Implements:
//! - `folio state get [LABEL]`
//! - `folio state set <LABEL> <VALUE>`
//! - `folio state patch --set LABEL=VALUE ...`
//! - `folio state add-decision --phase P --summary S`
//! - `folio state add-blocker <TEXT>` / `resolve-blocker <TEXT>`
//! - `folio state record-metric --phase P --plan N --duration D`

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use folio_core::append::{append_list_item, append_table_row, remove_list_items};
use folio_core::field::{FieldError, extract_field, patch, replace_field};

use crate::files::{print_error, print_json, print_not_found, read_optional, write_atomic};
use crate::{StateCommands, Workspace};

const STATE: &str = "STATE.md";
const DECISIONS: &str = "Decisions";
const BLOCKERS: &str = "Blockers/Concerns";
const METRICS: &str = "Performance Metrics";

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `StateCommands` variant to the appropriate handler.
pub fn run_state_command(command: StateCommands, workspace: &Workspace) -> Result<()> {
    let path = workspace.planning_file(STATE)?;
    let Some(content) = read_optional(&path)? else {
        return print_not_found(&path);
    };

    match command {
        StateCommands::Get { label } => cmd_get(&content, label.as_deref()),
        StateCommands::Set { label, value } => cmd_set(&path, &content, &label, &value),
        StateCommands::Patch { fields } => cmd_patch(&path, &content, &fields),
        StateCommands::AddDecision { phase, summary } => {
            let item = format!("[Phase {}]: {}", phase.trim(), summary.trim());
            match append_list_item(&content, DECISIONS, &item) {
                Ok(updated) => {
                    write_atomic(&path, &updated)?;
                    print_json(&json!({ "added": true, "decision": item }))
                }
                Err(e) => print_error(e),
            }
        }
        StateCommands::AddBlocker { text } => match append_list_item(&content, BLOCKERS, &text) {
            Ok(updated) => {
                write_atomic(&path, &updated)?;
                print_json(&json!({ "added": true, "blocker": text.trim() }))
            }
            Err(e) => print_error(e),
        },
        StateCommands::ResolveBlocker { text } => {
            match remove_list_items(&content, BLOCKERS, &text) {
                Ok(removal) if removal.removed.is_empty() => {
                    print_json(&json!({ "resolved": false, "error": "No matching blocker" }))
                }
                Ok(removal) => {
                    write_atomic(&path, &removal.content)?;
                    print_json(&json!({ "resolved": true, "removed": removal.removed }))
                }
                Err(e) => print_error(e),
            }
        }
        StateCommands::RecordMetric {
            phase,
            plan,
            duration,
            tasks,
            files,
        } => {
            let row = metric_row(&[
                phase.as_str(),
                plan.as_str(),
                duration.as_str(),
                tasks.as_deref().unwrap_or("-"),
                files.as_deref().unwrap_or("-"),
            ]);
            match append_table_row(&content, METRICS, &row) {
                Ok(updated) => {
                    write_atomic(&path, &updated)?;
                    print_json(&json!({ "recorded": true, "row": row }))
                }
                Err(e) => print_error(e),
            }
        }
    }
}

fn metric_row(cells: &[&str]) -> String {
    let cells: Vec<&str> = cells.iter().map(|c| c.trim()).collect();
    format!("| {} |", cells.join(" | "))
}

// -----------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------

fn cmd_get(content: &str, label: Option<&str>) -> Result<()> {
    let Some(label) = label else {
        return print_json(&json!({ "content": content }));
    };
    match extract_field(content, label) {
        Some(value) => print_json(&json!({ label: value })),
        None => print_error(format!("Section or field {label:?} not found")),
    }
}

fn cmd_set(path: &Path, content: &str, label: &str, value: &str) -> Result<()> {
    match replace_field(content, label, value) {
        Ok(updated) => {
            write_atomic(path, &updated)?;
            print_json(&json!({ "updated": true, "field": label, "value": value.trim() }))
        }
        Err(FieldError::NotFound(_)) => print_json(&json!({
            "updated": false,
            "error": format!("Section or field {label:?} not found"),
        })),
    }
}

fn cmd_patch(path: &Path, content: &str, fields: &[(String, String)]) -> Result<()> {
    let outcome = patch(
        content,
        fields.iter().map(|(label, value)| (label.as_str(), value.as_str())),
    );
    if !outcome.updated.is_empty() {
        write_atomic(path, &outcome.content)?;
    }
    print_json(&json!({
        "updated": &outcome.updated,
        "failed": &outcome.failed,
        "partial": outcome.is_partial(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_rows_are_pipe_delimited() {
        assert_eq!(metric_row(&["1", " 02 ", "5min", "-", "-"]), "| 1 | 02 | 5min | - | - |");
    }
}
