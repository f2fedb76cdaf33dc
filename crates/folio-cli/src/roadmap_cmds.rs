//! CLI handlers for `folio roadmap` subcommands over `<planning>/ROADMAP.md`.

use anyhow::Result;
use chrono::Local;
use serde_json::json;

use folio_core::PhaseNumber;
use folio_core::append::toggle_checkbox;
use folio_core::phase::{PhaseLookup, get_phase, list_phases};

use crate::files::{print_error, print_json, print_not_found, read_optional, write_atomic};
use crate::{RoadmapCommands, Workspace};

const ROADMAP: &str = "ROADMAP.md";

/// Dispatch a `RoadmapCommands` variant to the appropriate handler.
pub fn run_roadmap_command(command: RoadmapCommands, workspace: &Workspace) -> Result<()> {
    let path = workspace.planning_file(ROADMAP)?;
    let Some(content) = read_optional(&path)? else {
        return print_not_found(&path);
    };

    match command {
        RoadmapCommands::GetPhase { phase } => cmd_get_phase(&content, &phase),
        RoadmapCommands::List => {
            let phases = list_phases(&content);
            print_json(&json!({ "count": phases.len(), "phases": phases }))
        }
        RoadmapCommands::CompletePhase { phase } => {
            let Ok(number) = phase.parse::<PhaseNumber>() else {
                return print_error(format!("invalid phase number: {phase:?}"));
            };
            let today = Local::now().date_naive();
            match toggle_checkbox(&content, &number, today) {
                Ok(updated) => {
                    write_atomic(&path, &updated)?;
                    print_json(&json!({
                        "completed": true,
                        "phase": number,
                        "date": today.format("%Y-%m-%d").to_string(),
                    }))
                }
                Err(e) => print_error(e),
            }
        }
    }
}

fn cmd_get_phase(content: &str, requested: &str) -> Result<()> {
    match get_phase(content, requested) {
        PhaseLookup::Found(section) => print_json(&json!({
            "found": true,
            "phase_number": section.number,
            "phase_name": section.name,
            "goal": section.goal,
            "depends_on": section.depends_on,
            "requirements": section.requirements,
            "success_criteria": section.success_criteria,
            "section": section.section,
        })),
        PhaseLookup::NotFound => print_json(&json!({
            "found": false,
            "phase_number": requested,
        })),
        PhaseLookup::Malformed { name } => print_json(&json!({
            "found": false,
            "error": "malformed_roadmap",
            "phase_number": requested,
            "phase_name": name,
            "message": format!(
                "Phase {requested} is in the checklist but ROADMAP.md has no phase detail sections"
            ),
        })),
    }
}
