//! Document I/O and JSON output.
//!
//! The engine never touches the filesystem; every read and write goes
//! through here.

use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read a document. A missing file is `None`; any other failure is an error.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "file not found");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Replace `path` with `content` through a temp file in the same directory,
/// so a failed write leaves the original intact.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync temp file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote document");
    Ok(())
}

/// Print `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Print the `{error}` shape used for every lookup miss.
pub fn print_error(message: impl std::fmt::Display) -> Result<()> {
    print_json(&json!({ "error": message.to_string() }))
}

/// Print the missing-document shape.
pub fn print_not_found(path: &Path) -> Result<()> {
    print_json(&json!({ "error": "File not found", "path": path.display().to_string() }))
}
