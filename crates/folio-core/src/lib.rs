//! Round-trip editing of planning documents.
//!
//! Planning documents are markdown files with a YAML-like frontmatter block
//! at the top. This crate reads and rewrites them without I/O: every
//! operation takes the full document text and returns new text or a
//! structured result, changing only the bytes it targets.

pub mod append;
pub mod field;
pub mod frontmatter;
mod markdown;
pub mod must_haves;
pub mod phase;
pub mod profile;
pub mod value;
pub mod verify;

pub use append::{AppendError, Removal};
pub use field::{FieldError, PatchOutcome};
pub use frontmatter::FrontmatterError;
pub use must_haves::{Artifact, KeyLink, MustHave};
pub use phase::{PhaseLookup, PhaseNumber, PhaseSection, PhaseSummary};
pub use profile::ModelProfile;
pub use value::{Map, Value};
