//! Model selection per agent role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model used when neither an override nor the profile table names one.
pub const DEFAULT_MODEL: &str = "sonnet";

/// Cost/quality trade-off applied to every agent role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProfile {
    Quality,
    #[default]
    Balanced,
    Budget,
}

impl ModelProfile {
    pub const ALL: [ModelProfile; 3] = [Self::Quality, Self::Balanced, Self::Budget];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Budget => "budget",
        }
    }
}

impl fmt::Display for ModelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProfile {
    type Err = ModelProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "budget" => Ok(Self::Budget),
            _ => Err(ModelProfileParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ModelProfile`] string.
#[derive(Debug, Clone)]
pub struct ModelProfileParseError(pub String);

impl fmt::Display for ModelProfileParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid model profile: {:?} (expected quality, balanced or budget)",
            self.0
        )
    }
}

impl std::error::Error for ModelProfileParseError {}

// (role, quality, balanced, budget)
const TABLE: &[(&str, &str, &str, &str)] = &[
    ("planner", "opus", "opus", "sonnet"),
    ("roadmapper", "opus", "sonnet", "sonnet"),
    ("executor", "opus", "sonnet", "sonnet"),
    ("phase-researcher", "opus", "sonnet", "haiku"),
    ("project-researcher", "opus", "sonnet", "haiku"),
    ("research-synthesizer", "sonnet", "sonnet", "haiku"),
    ("debugger", "opus", "sonnet", "sonnet"),
    ("codebase-mapper", "sonnet", "haiku", "haiku"),
    ("verifier", "sonnet", "sonnet", "haiku"),
    ("plan-checker", "sonnet", "sonnet", "haiku"),
    ("integration-checker", "sonnet", "sonnet", "haiku"),
];

/// Agent roles the profile table knows about.
pub fn roles() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|row| row.0)
}

/// The profile table's model for `agent`, if the role is known.
pub fn builtin_model(agent: &str, profile: ModelProfile) -> Option<&'static str> {
    let row = TABLE.iter().find(|row| row.0 == agent.trim())?;
    Some(match profile {
        ModelProfile::Quality => row.1,
        ModelProfile::Balanced => row.2,
        ModelProfile::Budget => row.3,
    })
}

/// Pick the model for `agent`: an explicit override wins, then the profile
/// table, then [`DEFAULT_MODEL`].
pub fn resolve_model(agent: &str, explicit: Option<&str>, profile: ModelProfile) -> String {
    explicit
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or_else(|| builtin_model(agent, profile))
        .unwrap_or(DEFAULT_MODEL)
        .to_owned()
}
