//! Configuration file management for folio.
//!
//! Provides a TOML-based config file at `~/.config/folio/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use folio_core::ModelProfile;

/// Planning directory used when nothing else names one.
pub const DEFAULT_PLANNING_DIR: &str = ".planning";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub planning: PlanningSection,
    #[serde(default)]
    pub models: ModelsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlanningSection {
    /// Planning directory, relative to the working directory unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ModelProfile>,
    /// Per-agent model overrides, e.g. `planner = "opus"`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the folio config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/folio` or `~/.config/folio`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("folio");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("folio")
}

/// Return the path to the folio config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. A missing file yields `None`; an
/// unreadable or malformed one is an error.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    crate::files::write_atomic(&path, &contents)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct FolioConfig {
    pub planning_dir: PathBuf,
    pub profile: ModelProfile,
    pub overrides: BTreeMap<String, String>,
}

impl FolioConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Planning dir: `cli_planning_dir` > `FOLIO_PLANNING_DIR` env > `planning.dir` > `.planning`
    /// - Model profile: `FOLIO_MODEL_PROFILE` env > `models.profile` > `balanced`
    pub fn resolve(cli_planning_dir: Option<PathBuf>) -> Result<Self> {
        let file_config = load_config()?.unwrap_or_default();

        let planning_dir = if let Some(dir) = cli_planning_dir {
            dir
        } else if let Ok(dir) = std::env::var("FOLIO_PLANNING_DIR") {
            PathBuf::from(dir)
        } else if let Some(dir) = file_config.planning.dir {
            dir
        } else {
            PathBuf::from(DEFAULT_PLANNING_DIR)
        };

        let profile = if let Ok(raw) = std::env::var("FOLIO_MODEL_PROFILE") {
            raw.parse()
                .context("FOLIO_MODEL_PROFILE env var is not a valid profile")?
        } else {
            file_config.models.profile.unwrap_or_default()
        };

        Ok(Self {
            planning_dir,
            profile,
            overrides: file_config.models.overrides,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
