//! Integration tests that run the `folio` binary against temporary projects.
//!
//! Each test gets its own project directory and its own `XDG_CONFIG_HOME`,
//! so a config file on the host never leaks in.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

use folio_test_utils::{PLAN, TempProject};

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

struct Run {
    json: Value,
    output: Output,
}

fn run_in(root: &Path, config_home: &Path, envs: &[(&str, &str)], args: &[&str]) -> Run {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_folio"));
    cmd.arg("--cwd")
        .arg(root)
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("FOLIO_PLANNING_DIR")
        .env_remove("FOLIO_MODEL_PROFILE")
        .env_remove("RUST_LOG");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    let output = cmd.output().expect("failed to run folio");
    let json = serde_json::from_slice(&output.stdout).unwrap_or(Value::Null);
    Run { json, output }
}

fn folio(project: &TempProject, args: &[&str]) -> Value {
    let config_home = TempDir::new().unwrap();
    let run = run_in(project.root(), config_home.path(), &[], args);
    assert!(
        run.output.status.success(),
        "folio {args:?} failed: {}",
        String::from_utf8_lossy(&run.output.stderr)
    );
    run.json
}

const PLAN_PATH: &str = ".planning/phases/01-foundation/01-01-PLAN.md";

// -----------------------------------------------------------------------
// frontmatter
// -----------------------------------------------------------------------

#[test]
fn frontmatter_get_whole_and_field() {
    let project = TempProject::with_fixtures();

    let all = folio(&project, &["frontmatter", "get", PLAN_PATH]);
    assert_eq!(all["phase"], "01-foundation");
    assert_eq!(all["requirements"], serde_json::json!(["AUTH-01", "AUTH-02"]));

    let keys: Vec<&str> = all.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys[..3], ["phase", "plan", "type"]);

    let one = folio(&project, &["frontmatter", "get", PLAN_PATH, "--field", "wave"]);
    assert_eq!(one, serde_json::json!({ "wave": "1" }));

    let missing = folio(&project, &["frontmatter", "get", PLAN_PATH, "--field", "nope"]);
    assert_eq!(missing["error"], "Field not found");
}

#[test]
fn missing_document_is_data_not_failure() {
    let project = TempProject::new();
    let out = folio(&project, &["frontmatter", "get", "absent.md"]);
    assert_eq!(out["error"], "File not found");
    assert!(out["path"].as_str().unwrap().ends_with("absent.md"));
}

#[test]
fn frontmatter_set_keeps_body_and_null_removes() {
    let project = TempProject::with_fixtures();

    let out = folio(
        &project,
        &["frontmatter", "set", PLAN_PATH, "--field", "wave", "--value", "2"],
    );
    assert_eq!(out["updated"], true);

    let content = project.read(PLAN_PATH);
    assert!(content.contains("\nwave: 2\n"));
    let body_start = PLAN.find("\n# Phase 1").unwrap();
    assert!(content.ends_with(&PLAN[body_start..]));
    assert_eq!(content.matches("---\n").count(), 2);

    folio(
        &project,
        &["frontmatter", "set", PLAN_PATH, "--field", "autonomous", "--value", "null"],
    );
    let after = folio(&project, &["frontmatter", "get", PLAN_PATH]);
    assert!(after.get("autonomous").is_none());
    assert_eq!(after["wave"], "2");
}

#[test]
fn frontmatter_merge_and_validate() {
    let project = TempProject::with_fixtures();

    let merged = folio(
        &project,
        &[
            "frontmatter",
            "merge",
            PLAN_PATH,
            "--data",
            r#"{"wave": 3, "tags": ["auth", "api"]}"#,
        ],
    );
    assert_eq!(merged["fields"], serde_json::json!(["wave", "tags"]));

    let meta = folio(&project, &["frontmatter", "get", PLAN_PATH]);
    assert_eq!(meta["wave"], "3");
    assert_eq!(meta["tags"], serde_json::json!(["auth", "api"]));

    let plan = folio(&project, &["frontmatter", "validate", PLAN_PATH, "--schema", "plan"]);
    assert_eq!(plan["valid"], true);

    let summary = folio(
        &project,
        &["frontmatter", "validate", PLAN_PATH, "--schema", "summary"],
    );
    assert_eq!(summary["valid"], false);
    assert_eq!(
        summary["missing"],
        serde_json::json!(["subsystem", "duration", "completed"])
    );
}

#[test]
fn frontmatter_numbers_keep_their_text() {
    let project = TempProject::with_fixtures();

    folio(
        &project,
        &["frontmatter", "set", PLAN_PATH, "--field", "version", "--value", "2.10"],
    );
    folio(
        &project,
        &["frontmatter", "merge", PLAN_PATH, "--data", r#"{"budget": 1e3, "ids": [2.10, 7]}"#],
    );

    let meta = folio(&project, &["frontmatter", "get", PLAN_PATH]);
    assert_eq!(meta["version"], "2.10");
    assert_eq!(meta["budget"], "1e3");
    assert_eq!(meta["ids"], serde_json::json!(["2.10", "7"]));
}

#[test]
fn frontmatter_rejects_unreadable_writes() {
    let project = TempProject::with_fixtures();
    let before = project.read(PLAN_PATH);

    let multiline = folio(
        &project,
        &[
            "frontmatter",
            "set",
            PLAN_PATH,
            "--field",
            "note",
            "--value",
            r#""line one\n---\nstatus: hijacked""#,
        ],
    );
    assert_eq!(multiline["updated"], false);
    assert!(multiline["error"].as_str().unwrap().contains("multiple lines"));

    let bad_key = folio(
        &project,
        &["frontmatter", "set", PLAN_PATH, "--field", "my key", "--value", "v"],
    );
    assert_eq!(bad_key["updated"], false);
    assert!(bad_key["error"].as_str().unwrap().contains("invalid frontmatter key"));

    let merged = folio(
        &project,
        &["frontmatter", "merge", PLAN_PATH, "--data", r#"{"wave": 4, "a.b": 1}"#],
    );
    assert_eq!(merged["merged"], false);

    assert_eq!(project.read(PLAN_PATH), before);
}

#[test]
fn frontmatter_must_haves_block() {
    let project = TempProject::with_fixtures();
    let out = folio(
        &project,
        &["frontmatter", "must-haves", PLAN_PATH, "--block", "artifacts"],
    );
    assert_eq!(out["count"], 2);
    assert_eq!(out["items"][0]["path"], "src/auth.rs");
    assert_eq!(out["items"][0]["exports"], serde_json::json!(["login", "logout"]));
}

// -----------------------------------------------------------------------
// verify
// -----------------------------------------------------------------------

#[test]
fn verify_artifacts_and_key_links() {
    let project = TempProject::with_fixtures();

    let artifacts = folio(&project, &["verify", "artifacts", PLAN_PATH]);
    assert_eq!(artifacts["total"], 2);
    assert_eq!(artifacts["passed"], 1);
    assert_eq!(artifacts["all_passed"], false);
    assert_eq!(artifacts["artifacts"][1]["issues"][0], "File not found");

    let links = folio(&project, &["verify", "key-links", PLAN_PATH]);
    assert_eq!(links["total"], 2);
    assert_eq!(links["verified"], 1);
    assert_eq!(links["links"][0]["detail"], "Pattern found in source");
}

// -----------------------------------------------------------------------
// roadmap
// -----------------------------------------------------------------------

#[test]
fn roadmap_get_phase_without_prefix_collision() {
    let project = TempProject::with_fixtures();

    let one = folio(&project, &["roadmap", "get-phase", "1"]);
    assert_eq!(one["found"], true);
    assert_eq!(one["phase_number"], "01");
    assert_eq!(one["phase_name"], "Foundation");
    assert!(!one["section"].as_str().unwrap().contains("Scaling"));
    assert_eq!(
        one["success_criteria"],
        serde_json::json!(["The project builds", "CI runs on every push"])
    );

    let hotfix = folio(&project, &["roadmap", "get-phase", "2.1"]);
    assert_eq!(hotfix["phase_name"], "Hotfix");

    let absent = folio(&project, &["roadmap", "get-phase", "7"]);
    assert_eq!(absent["found"], false);
}

#[test]
fn roadmap_without_details_is_malformed() {
    let project = TempProject::new();
    project.write_planning("ROADMAP.md", "# Roadmap\n\n- [ ] **Phase 1: Setup** - start\n");
    let out = folio(&project, &["roadmap", "get-phase", "1"]);
    assert_eq!(out["found"], false);
    assert_eq!(out["error"], "malformed_roadmap");
    assert_eq!(out["phase_name"], "Setup");
}

#[test]
fn roadmap_complete_phase_and_list() {
    let project = TempProject::with_fixtures();

    let done = folio(&project, &["roadmap", "complete-phase", "1"]);
    assert_eq!(done["completed"], true);
    let roadmap = project.read_planning("ROADMAP.md");
    assert!(roadmap.contains("- [x] **Phase 1: Foundation** - Project skeleton (completed "));
    assert!(roadmap.contains("- [ ] **Phase 10: Scaling**"));

    let again = folio(&project, &["roadmap", "complete-phase", "1"]);
    assert!(again["error"].as_str().unwrap().contains("already checked"));

    let list = folio(&project, &["roadmap", "list"]);
    assert_eq!(list["count"], 4);
    assert_eq!(list["phases"][0]["completed"], true);
    assert_eq!(list["phases"][3]["number"], "10");
}

// -----------------------------------------------------------------------
// state
// -----------------------------------------------------------------------

#[test]
fn state_get_set_and_patch() {
    let project = TempProject::with_fixtures();

    let status = folio(&project, &["state", "get", "Status"]);
    assert_eq!(status["Status"], "Planning");

    let section = folio(&project, &["state", "get", "Session Continuity"]);
    assert_eq!(section["Session Continuity"], "Stopped at: project setup");

    folio(&project, &["state", "set", "Status", "Executing"]);
    assert!(project.read_planning("STATE.md").contains("**Status:** Executing\n"));

    let patched = folio(
        &project,
        &["state", "patch", "--set", "Current Phase=02", "--set", "Owner=me"],
    );
    assert_eq!(patched["updated"], serde_json::json!(["Current Phase"]));
    assert_eq!(patched["failed"], serde_json::json!(["Owner"]));
    assert_eq!(patched["partial"], true);
    assert!(project.read_planning("STATE.md").contains("**Current Phase:** 02\n"));
}

#[test]
fn state_lists_and_metrics() {
    let project = TempProject::with_fixtures();

    folio(
        &project,
        &["state", "add-decision", "--phase", "1", "--summary", "Use SQLite"],
    );
    folio(&project, &["state", "add-blocker", "Waiting on API keys"]);
    let state = project.read_planning("STATE.md");
    assert!(state.contains("### Decisions\n\n- [Phase 1]: Use SQLite\n\n"));
    assert!(state.contains("### Blockers/Concerns\n\n- Waiting on API keys\n\n"));

    let resolved = folio(&project, &["state", "resolve-blocker", "api keys"]);
    assert_eq!(resolved["resolved"], true);
    assert!(
        project
            .read_planning("STATE.md")
            .contains("### Blockers/Concerns\n\nNone\n\n")
    );

    folio(
        &project,
        &["state", "record-metric", "--phase", "1", "--plan", "01", "--duration", "4min"],
    );
    assert!(
        project
            .read_planning("STATE.md")
            .contains("| - | - | - | - | - |\n| 1 | 01 | 4min | - | - |\n")
    );
}

#[test]
fn planning_dir_flag_and_env() {
    let project = TempProject::new();
    project.write("docs/plan/STATE.md", "**Status:** Custom\n");
    let config_home = TempDir::new().unwrap();

    let by_flag = run_in(
        project.root(),
        config_home.path(),
        &[],
        &["--planning-dir", "docs/plan", "state", "get", "Status"],
    );
    assert_eq!(by_flag.json["Status"], "Custom");

    let by_env = run_in(
        project.root(),
        config_home.path(),
        &[("FOLIO_PLANNING_DIR", "docs/plan")],
        &["state", "get", "Status"],
    );
    assert_eq!(by_env.json["Status"], "Custom");
}

// -----------------------------------------------------------------------
// init / config
// -----------------------------------------------------------------------

#[test]
fn init_then_resolve_model() {
    let project = TempProject::new();
    let config_home = TempDir::new().unwrap();

    let init = run_in(
        project.root(),
        config_home.path(),
        &[],
        &["init", "--profile", "quality"],
    );
    assert!(init.output.status.success());
    assert_eq!(init.json["profile"], "quality");
    assert!(config_home.path().join("folio/config.toml").exists());

    let planner = run_in(
        project.root(),
        config_home.path(),
        &[],
        &["config", "resolve-model", "planner"],
    );
    assert_eq!(planner.json["model"], "opus");

    let budget = run_in(
        project.root(),
        config_home.path(),
        &[("FOLIO_MODEL_PROFILE", "budget")],
        &["config", "resolve-model", "planner"],
    );
    assert_eq!(budget.json["model"], "sonnet");

    let explicit = run_in(
        project.root(),
        config_home.path(),
        &[],
        &["config", "resolve-model", "planner", "--model", "haiku"],
    );
    assert_eq!(explicit.json["model"], "haiku");

    let again = run_in(project.root(), config_home.path(), &[], &["init"]);
    assert!(!again.output.status.success());
    assert!(String::from_utf8_lossy(&again.output.stderr).contains("already exists"));
}

#[test]
fn invalid_invocation_exits_non_zero() {
    let project = TempProject::new();
    let config_home = TempDir::new().unwrap();

    let run = run_in(
        project.root(),
        config_home.path(),
        &[],
        &["frontmatter", "validate", "x.md", "--schema", "bogus"],
    );
    assert!(!run.output.status.success());
    assert!(run.output.stdout.is_empty());

    project.write("plan.md", "---\na: b\n---\n");
    let bad_json = run_in(
        project.root(),
        config_home.path(),
        &[],
        &["frontmatter", "merge", "plan.md", "--data", "[1, 2]"],
    );
    assert!(!bad_json.output.status.success());
}

#[test]
fn completions_are_generated() {
    let project = TempProject::new();
    let config_home = TempDir::new().unwrap();
    let run = run_in(project.root(), config_home.path(), &[], &["completions", "bash"]);
    assert!(run.output.status.success());
    assert!(String::from_utf8_lossy(&run.output.stdout).contains("folio"));
}
