//! Roadmap phases: number normalization and section lookup.

pub mod locator;
pub mod number;

pub use locator::{PhaseLookup, PhaseSection, PhaseSummary, get_phase, list_phases};
pub use number::{PhaseNumber, PhaseNumberError, references};
