//! Zero-parameter uniform-choice baseline.
//!
//! Every item gets the same similarity, so every remaining item is equally
//! likely to be chosen regardless of the attention weight.

use crate::data::{TransitionRecord, TransitionTable};
use crate::error::{CueFitError, CueFitResult};
use crate::types::{Cue, ProbeConfig};

/// Name of the artificial representation the baseline is fitted on.
pub const BASELINE_REPRESENTATION: &str = "dummy";

/// Label of the baseline row in the comparison table.
pub const BASELINE_MODEL: &str = "baseline";

/// The probe set the baseline model uses.
pub fn baseline_probes() -> Vec<ProbeConfig> {
    vec![ProbeConfig::new(BASELINE_REPRESENTATION)]
}

/// Build the baseline table from a transition table.
///
/// Each row keeps its participant key and gets a `dummy` cue: current
/// similarity 1.0 and a remaining list of 1.0s as long as the `reference`
/// representation's remaining list on that row.
pub fn baseline_table(table: &TransitionTable, reference: &str) -> CueFitResult<TransitionTable> {
    let records = table
        .records()
        .iter()
        .map(|record| -> CueFitResult<TransitionRecord> {
            let competitors = record
                .cue(reference)
                .ok_or_else(|| CueFitError::missing_cue(reference))?
                .remaining
                .len();

            let mut dummy = TransitionRecord::new(record.id.clone(), record.listnum.clone());
            dummy.participant = record.participant.clone();
            Ok(dummy.with_cue(
                BASELINE_REPRESENTATION,
                Cue::new(1.0, vec![1.0; competitors]),
            ))
        })
        .collect::<CueFitResult<Vec<_>>>()?;

    Ok(TransitionTable::new(records))
}
