//! Shared fixtures for folio integration tests.
//!
//! Provides sample planning documents and a throwaway project directory
//! laid out the way the CLI expects (`<root>/.planning/...`).

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A plan with a full `must_haves` block and a short body.
pub const PLAN: &str = r#"---
phase: 01-foundation
plan: 01
type: execute
wave: 1
depends_on: []
files_modified: [src/auth.rs, src/routes.rs]
autonomous: true
requirements:
  - AUTH-01
  - AUTH-02
must_haves:
  truths:
    - "User can log in"
    - Sessions survive a restart
  artifacts:
    - path: src/auth.rs
      provides: "Session handling"
      min_lines: 3
      exports: [login, logout]
    - path: src/missing.rs
      provides: Never written
  key_links:
    - from: src/routes.rs
      to: src/auth.rs
      via: "login()"
      pattern: "auth::login"
    - from: src/routes.rs
      to: src/db.rs
---

# Phase 1 Plan 01: Authentication

<objective>
Wire up login.
</objective>
"#;

/// Source files referenced by [`PLAN`]'s must-haves, relative to the
/// project root. `src/missing.rs` and `src/db.rs` are deliberately absent.
pub const PLAN_SOURCES: &[(&str, &str)] = &[
    (
        "src/auth.rs",
        "pub fn login() {}\n\npub fn logout() {}\n",
    ),
    ("src/routes.rs", "use crate::auth;\n\nfn route() { auth::login(); }\n"),
];

/// A project state document with placeholder sections.
pub const STATE: &str = "\
# Project State

## Current Position

**Current Phase:** 01
**Status:** Planning
**Last activity:** 2025-01-10

## Accumulated Context

### Decisions

None yet.

### Blockers/Concerns

None

## Performance Metrics

| Phase | Plan | Duration | Tasks | Files |
|-------|------|----------|-------|-------|
| - | - | - | - | - |

## Session Continuity

Stopped at: project setup
";

/// A roadmap with a checklist and detail sections, including phases whose
/// numbers share prefixes.
pub const ROADMAP: &str = "\
# Roadmap: Example

## Phases

- [ ] **Phase 1: Foundation** - Project skeleton
- [ ] **Phase 2: Accounts** - Sign-up and login
- [ ] **Phase 2.1: Hotfix** - Inserted urgent work
- [ ] **Phase 10: Scaling** - Handle load

## Phase Details

### Phase 1: Foundation
**Goal:** Stand up the project skeleton
**Depends on:** Nothing (first phase)
**Requirements:** CORE-01
**Success Criteria** (what must be TRUE):
  1. The project builds
  2. CI runs on every push

Plans: 2 plans

### Phase 2: Accounts
**Goal:** Users can sign up and log in
**Depends on:** Phase 1

### Phase 2.1: Hotfix
**Goal:** Patch the session bug
**Depends on:** Phase 2

### Phase 10: Scaling
**Goal:** Serve ten times the traffic
**Depends on:** Phase 2.1
";

/// A temporary project directory, removed on drop.
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    /// An empty project with a `.planning/` directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join(".planning")).expect("failed to create .planning");
        Self { dir }
    }

    /// A project with `STATE.md`, `ROADMAP.md`, a plan under
    /// `phases/01-foundation/` and the plan's source files.
    pub fn with_fixtures() -> Self {
        let project = Self::new();
        project.write_planning("STATE.md", STATE);
        project.write_planning("ROADMAP.md", ROADMAP);
        project.write_planning("phases/01-foundation/01-01-PLAN.md", PLAN);
        for (path, content) in PLAN_SOURCES {
            project.write(path, content);
        }
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn planning(&self) -> PathBuf {
        self.root().join(".planning")
    }

    /// Write `content` to `rel` under the project root, creating parents.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, content).expect("failed to write fixture");
        path
    }

    /// Write `content` to `rel` under `.planning/`.
    pub fn write_planning(&self, rel: &str, content: &str) -> PathBuf {
        self.write(&format!(".planning/{rel}"), content)
    }

    /// Read `rel` under the project root.
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).expect("failed to read fixture")
    }

    /// Read `rel` under `.planning/`.
    pub fn read_planning(&self, rel: &str) -> String {
        self.read(&format!(".planning/{rel}"))
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}
