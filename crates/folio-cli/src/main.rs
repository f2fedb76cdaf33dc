mod config;
mod config_cmds;
mod files;
mod frontmatter_cmds;
mod roadmap_cmds;
mod state_cmds;
mod verify_cmds;

#[cfg(test)]
mod test_util;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

use folio_core::ModelProfile;
use folio_core::frontmatter::Schema;

use config::FolioConfig;

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Read and edit planning documents, answering in JSON"
)]
struct Cli {
    /// Directory that relative paths resolve against (defaults to the current directory)
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Planning directory (overrides FOLIO_PLANNING_DIR and the config file)
    #[arg(long, global = true)]
    planning_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read and write document frontmatter
    Frontmatter {
        #[command(subcommand)]
        command: FrontmatterCommands,
    },
    /// Check a plan's must-haves against the files on disk
    Verify {
        #[command(subcommand)]
        command: VerifyCommands,
    },
    /// Query and update ROADMAP.md
    Roadmap {
        #[command(subcommand)]
        command: RoadmapCommands,
    },
    /// Query and update STATE.md
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
    /// Write a folio config file (uses --planning-dir if given)
    Init {
        /// Default model profile
        #[arg(long)]
        profile: Option<ModelProfile>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Inspect resolved configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum FrontmatterCommands {
    /// Print the frontmatter as JSON (or a single field)
    Get {
        path: PathBuf,
        #[arg(long)]
        field: Option<String>,
    },
    /// Set one field; VALUE may be JSON, `null` removes the field
    Set {
        path: PathBuf,
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
    },
    /// Shallow-merge a JSON object into the frontmatter
    Merge {
        path: PathBuf,
        #[arg(long)]
        data: String,
    },
    /// Check required fields against a schema
    Validate {
        path: PathBuf,
        /// plan, summary or verification
        #[arg(long)]
        schema: Schema,
    },
    /// Print the items of a must_haves block
    MustHaves {
        path: PathBuf,
        /// truths, artifacts, key_links or any other block name
        #[arg(long)]
        block: String,
    },
}

#[derive(Subcommand)]
pub enum VerifyCommands {
    /// Check each must_haves artifact of a plan
    Artifacts { plan: PathBuf },
    /// Check each must_haves key link of a plan
    KeyLinks { plan: PathBuf },
}

#[derive(Subcommand)]
pub enum RoadmapCommands {
    /// Print one phase's detail section
    GetPhase {
        /// Phase number, e.g. 1, 02, 2.1, 12A
        phase: String,
    },
    /// List every phase in order
    List,
    /// Tick a phase's checklist box with today's date
    CompletePhase { phase: String },
}

#[derive(Subcommand)]
pub enum StateCommands {
    /// Print the whole document, or one field or section
    Get { label: Option<String> },
    /// Replace one field's value
    Set { label: String, value: String },
    /// Replace several fields, applied in order
    Patch {
        /// LABEL=VALUE pair (repeatable)
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Record a decision under Decisions
    AddDecision {
        #[arg(long)]
        phase: String,
        #[arg(long)]
        summary: String,
    },
    /// Add a blocker under Blockers/Concerns
    AddBlocker { text: String },
    /// Remove blockers containing TEXT
    ResolveBlocker { text: String },
    /// Append a row to the Performance Metrics table
    RecordMetric {
        #[arg(long)]
        phase: String,
        #[arg(long)]
        plan: String,
        #[arg(long)]
        duration: String,
        #[arg(long)]
        tasks: Option<String>,
        #[arg(long)]
        files: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the model an agent role should use
    ResolveModel {
        agent: String,
        /// Explicit model, taking precedence over everything else
        #[arg(long)]
        model: Option<String>,
    },
}

/// Parse `LABEL=VALUE`, splitting on the first `=`.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((label, value)) if !label.trim().is_empty() => {
            Ok((label.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected LABEL=VALUE, got {raw:?}")),
    }
}

/// Where the command runs: the working directory plus the resolved planning
/// directory.
pub struct Workspace {
    cwd: PathBuf,
    cli_planning_dir: Option<PathBuf>,
}

impl Workspace {
    /// Resolve `path` against the working directory.
    pub fn path(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }

    pub fn config(&self) -> Result<FolioConfig> {
        FolioConfig::resolve(self.cli_planning_dir.clone())
    }

    /// Path of `name` inside the planning directory.
    pub fn planning_file(&self, name: &str) -> Result<PathBuf> {
        let config = self.config()?;
        Ok(self.cwd.join(config.planning_dir).join(name))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let workspace = Workspace {
        cwd,
        cli_planning_dir: cli.planning_dir,
    };

    match cli.command {
        Commands::Frontmatter { command } => {
            frontmatter_cmds::run_frontmatter_command(command, &workspace)?;
        }
        Commands::Verify { command } => {
            verify_cmds::run_verify_command(command, &workspace)?;
        }
        Commands::Roadmap { command } => {
            roadmap_cmds::run_roadmap_command(command, &workspace)?;
        }
        Commands::State { command } => {
            state_cmds::run_state_command(command, &workspace)?;
        }
        Commands::Init { profile, force } => {
            config_cmds::cmd_init(workspace.cli_planning_dir.as_deref(), profile, force)?;
        }
        Commands::Config { command } => {
            config_cmds::run_config_command(command, &workspace)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}
