//! CLI handlers for `folio init` and `folio config`.

use std::path::Path;

use anyhow::{Result, bail};
use serde_json::json;

use folio_core::ModelProfile;
use folio_core::profile::resolve_model;

use crate::config::{self, ConfigFile, ModelsSection, PlanningSection};
use crate::files::print_json;
use crate::{ConfigCommands, Workspace};

/// Execute the `folio init` command: write config file.
pub fn cmd_init(planning_dir: Option<&Path>, profile: Option<ModelProfile>, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = ConfigFile {
        planning: PlanningSection {
            dir: planning_dir.map(Path::to_path_buf),
        },
        models: ModelsSection {
            profile: Some(profile.unwrap_or_default()),
            overrides: Default::default(),
        },
    };
    config::save_config(&cfg)?;

    print_json(&json!({
        "written": true,
        "path": path.display().to_string(),
        "planning_dir": cfg
            .planning
            .dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| config::DEFAULT_PLANNING_DIR.to_string()),
        "profile": cfg.models.profile,
    }))
}

/// Dispatch a `ConfigCommands` variant to the appropriate handler.
pub fn run_config_command(command: ConfigCommands, workspace: &Workspace) -> Result<()> {
    match command {
        ConfigCommands::ResolveModel { agent, model } => {
            let resolved = workspace.config()?;
            // A per-agent override in the config file counts as explicit.
            let explicit = model.or_else(|| resolved.overrides.get(&agent).cloned());
            let chosen = resolve_model(&agent, explicit.as_deref(), resolved.profile);
            print_json(&json!({
                "agent": agent,
                "model": chosen,
                "profile": resolved.profile,
            }))
        }
    }
}
