//! Transition data ingestion.
//!
//! Similarity cells are parsed into numbers once, at load time, so the
//! model only ever sees numeric cues.

mod loader;
mod parse;

pub use loader::{Participant, TransitionRecord, TransitionTable};
pub use parse::{parse_similarity, parse_similarity_list};
