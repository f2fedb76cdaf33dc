//! CLI handlers for `folio verify` subcommands.
//!
//! Paths named in a plan's must-haves are resolved against `--cwd`.

use std::path::Path;

use anyhow::Result;

use folio_core::must_haves;
use folio_core::verify::{ArtifactReport, LinkReport, check_artifact, check_key_link};

use crate::files::{print_json, print_not_found, read_optional};
use crate::{VerifyCommands, Workspace};

/// Dispatch a `VerifyCommands` variant to the appropriate handler.
pub fn run_verify_command(command: VerifyCommands, workspace: &Workspace) -> Result<()> {
    match command {
        VerifyCommands::Artifacts { plan } => cmd_artifacts(workspace, &plan),
        VerifyCommands::KeyLinks { plan } => cmd_key_links(workspace, &plan),
    }
}

fn read_relative(workspace: &Workspace, rel: &str) -> Result<Option<String>> {
    read_optional(&workspace.path(Path::new(rel)))
}

fn cmd_artifacts(workspace: &Workspace, plan: &Path) -> Result<()> {
    let plan_path = workspace.path(plan);
    let Some(content) = read_optional(&plan_path)? else {
        return print_not_found(&plan_path);
    };

    let mut checks = Vec::new();
    for artifact in must_haves::artifacts(&content) {
        let file = read_relative(workspace, &artifact.path)?;
        checks.push(check_artifact(&artifact, file.as_deref()));
    }
    print_json(&ArtifactReport::from_checks(checks))
}

fn cmd_key_links(workspace: &Workspace, plan: &Path) -> Result<()> {
    let plan_path = workspace.path(plan);
    let Some(content) = read_optional(&plan_path)? else {
        return print_not_found(&plan_path);
    };

    let mut checks = Vec::new();
    for link in must_haves::key_links(&content) {
        let from = read_relative(workspace, &link.from)?;
        let to = read_relative(workspace, &link.to)?;
        checks.push(check_key_link(&link, from.as_deref(), to.as_deref()));
    }
    print_json(&LinkReport::from_checks(checks))
}
