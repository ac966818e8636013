//! Transition table ingestion.
//!
//! Reads the CSV transition table once, parsing every similarity cell into
//! numbers, and groups rows into participants according to the run
//! [`Condition`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use super::parse::{parse_similarity, parse_similarity_list};
use crate::config::Condition;
use crate::error::{CueFitError, CueFitResult};
use crate::types::{Cue, CueSet, ProbeConfig, ProbeSeries};

const ID_COLUMN: &str = "id";
const LIST_COLUMN: &str = "listnum";

/// One decision step of one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub id: String,
    pub listnum: String,
    /// Grouping key; depends on the run condition.
    pub participant: String,
    /// Cues keyed by representation name.
    pub cues: BTreeMap<String, Cue>,
}

impl TransitionRecord {
    /// New record whose participant key is `{id}_{listnum}`.
    pub fn new(id: impl Into<String>, listnum: impl Into<String>) -> Self {
        let id = id.into();
        let listnum = listnum.into();
        Self {
            participant: format!("{}_{}", id, listnum),
            id,
            listnum,
            cues: BTreeMap::new(),
        }
    }

    pub fn with_cue(mut self, representation: impl Into<String>, cue: Cue) -> Self {
        self.cues.insert(representation.into(), cue);
        self
    }

    pub fn cue(&self, representation: &str) -> Option<&Cue> {
        self.cues.get(representation)
    }
}

/// A participant's rows, in their original order.
#[derive(Debug, Clone)]
pub struct Participant<'a> {
    pub key: &'a str,
    pub records: Vec<&'a TransitionRecord>,
}

impl<'a> Participant<'a> {
    /// Column-oriented cues for the given probes.
    pub fn cue_set(&self, probes: &[ProbeConfig]) -> CueFitResult<CueSet> {
        let series = probes
            .iter()
            .map(|probe| -> CueFitResult<ProbeSeries> {
                let cues = self
                    .records
                    .iter()
                    .map(|r| {
                        r.cue(probe.name())
                            .ok_or_else(|| CueFitError::missing_cue(probe.name()))
                    })
                    .collect::<CueFitResult<Vec<&Cue>>>()?;
                Ok(ProbeSeries::from_cues(cues))
            })
            .collect::<CueFitResult<Vec<_>>>()?;

        CueSet::new(series)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All transition records of an experiment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    records: Vec<TransitionRecord>,
}

impl TransitionTable {
    pub fn new(records: Vec<TransitionRecord>) -> Self {
        Self { records }
    }

    /// Read a transition table CSV from disk.
    pub fn from_path(path: impl AsRef<Path>, probes: &[ProbeConfig]) -> CueFitResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        tracing::debug!("Reading transition table from {}", path.as_ref().display());
        Self::from_reader(file, probes)
    }

    /// Read a transition table CSV, keeping the columns of `probes`.
    pub fn from_reader<R: Read>(reader: R, probes: &[ProbeConfig]) -> CueFitResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let column = |name: &str| -> CueFitResult<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| CueFitError::missing_column(name))
        };

        let id_idx = column(ID_COLUMN)?;
        let list_idx = column(LIST_COLUMN)?;
        let probe_idx = probes
            .iter()
            .map(|p| -> CueFitResult<_> {
                Ok((p, column(p.current_column())?, column(p.remaining_column())?))
            })
            .collect::<CueFitResult<Vec<_>>>()?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            // Line 1 is the header.
            let line = i + 2;
            let cell = |idx: usize| row.get(idx).unwrap_or("");

            let mut record = TransitionRecord::new(cell(id_idx).trim(), cell(list_idx).trim());
            for (probe, current_idx, remaining_idx) in &probe_idx {
                let current = parse_similarity(cell(*current_idx))
                    .map_err(|e| at_cell(e, line, probe.current_column()))?;
                let remaining = parse_similarity_list(cell(*remaining_idx))
                    .map_err(|e| at_cell(e, line, probe.remaining_column()))?;
                record.cues.insert(probe.name().to_string(), Cue::new(current, remaining));
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct raw ids.
    pub fn unique_ids(&self) -> usize {
        let mut ids: Vec<&str> = self.records.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Re-key (and for [`Condition::First`], filter) rows for a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        if condition == Condition::First {
            let mut first_list: HashMap<String, String> = HashMap::new();
            for record in &self.records {
                first_list
                    .entry(record.id.clone())
                    .and_modify(|current| {
                        if compare_listnum(&record.listnum, current) == Ordering::Less {
                            *current = record.listnum.clone();
                        }
                    })
                    .or_insert_with(|| record.listnum.clone());
            }
            self.records
                .retain(|r| first_list.get(&r.id).map_or(false, |l| *l == r.listnum));
        }

        for record in &mut self.records {
            record.participant = match condition {
                Condition::All => format!("{}_{}", record.id, record.listnum),
                Condition::Collapse | Condition::First => record.id.clone(),
            };
        }
        self
    }

    /// Participants in order of first appearance.
    pub fn participants(&self) -> Vec<Participant<'_>> {
        let mut order: Vec<Participant<'_>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for record in &self.records {
            let key = record.participant.as_str();
            match index.get(key) {
                Some(&i) => order[i].records.push(record),
                None => {
                    index.insert(key, order.len());
                    order.push(Participant {
                        key,
                        records: vec![record],
                    });
                }
            }
        }
        order
    }
}

fn at_cell(err: CueFitError, line: usize, column: &str) -> CueFitError {
    match err {
        CueFitError::Parse { message, code } => CueFitError::Parse {
            message: format!("line {}, column '{}': {}", line, column, message),
            code,
        },
        other => other,
    }
}

/// List numbers compare numerically when both parse, else as text.
fn compare_listnum(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}
