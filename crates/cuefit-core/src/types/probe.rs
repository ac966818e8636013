//! Similarity probe configuration.

use serde::{Deserialize, Serialize};

/// One similarity representation used as a retrieval cue.
///
/// Names the representation and the two table columns that hold its cues:
/// the similarity of the chosen item (`{name}_similarity`) and the
/// similarities of every item still available at that step (`rem_{name}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeConfig {
    name: String,
    current_column: String,
    remaining_column: String,
}

impl ProbeConfig {
    /// Probe with the conventional column names for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            current_column: format!("{}_similarity", name),
            remaining_column: format!("rem_{}", name),
            name,
        }
    }

    /// Probe with explicit column names.
    pub fn with_columns(
        name: impl Into<String>,
        current_column: impl Into<String>,
        remaining_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_column: current_column.into(),
            remaining_column: remaining_column.into(),
        }
    }

    /// Probes for a list of representation names, in order.
    pub fn for_representations<S: AsRef<str>>(names: &[S]) -> Vec<Self> {
        names.iter().map(|n| Self::new(n.as_ref())).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_column(&self) -> &str {
        &self.current_column
    }

    pub fn remaining_column(&self) -> &str {
        &self.remaining_column
    }
}
