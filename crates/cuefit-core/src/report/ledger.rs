//! Append-only record of completed runs.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::config::RunConfig;
use crate::error::CueFitResult;
use crate::types::ModelComparison;

const LEDGER_HEADER: [&str; 8] = [
    "Datetime",
    "Analysis",
    "Model Name",
    "Model",
    "Parameters",
    "Environment",
    "Results",
    "Artifacts",
];

/// One ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub datetime: DateTime<Utc>,
    pub analysis: String,
    pub model_name: String,
    pub model: String,
    /// JSON-encoded parameters.
    pub parameters: String,
    pub environment: String,
    /// JSON-encoded summary of the results.
    pub results: String,
    pub artifacts: String,
}

impl LedgerEntry {
    /// Describe a finished run: its configuration, the BIC improvement of
    /// every fitted model and the files it wrote.
    pub fn for_run(
        config: &RunConfig,
        comparison: &ModelComparison,
        artifacts: &[PathBuf],
    ) -> CueFitResult<Self> {
        let parameters = serde_json::to_string(&json!({
            "condition": config.condition,
            "representations": config.representations,
            "baseline_reference": config.baseline_reference,
            "confidence": config.confidence,
            "fit": config.fit,
            "optimiser": config.optimiser,
        }))?;

        let results = serde_json::to_string(
            &comparison
                .fitted_rows()
                .map(|r| {
                    json!({
                        "model": r.model,
                        "k": r.k,
                        "bic": r.bic,
                        "bic_improvement": r.bic_improvement,
                        "non_converged": r.non_converged,
                    })
                })
                .collect::<Vec<_>>(),
        )?;

        Ok(Self {
            datetime: Utc::now(),
            analysis: format!("fit {}", config.condition),
            model_name: "multi-probe retrieval".to_string(),
            model: config.representations.join(", "),
            parameters,
            environment: format!(
                "cuefit {} ({} {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            results,
            artifacts: artifacts
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(";"),
        })
    }

    fn to_record(&self) -> [String; 8] {
        [
            self.datetime.to_rfc3339(),
            self.analysis.clone(),
            self.model_name.clone(),
            self.model.clone(),
            self.parameters.clone(),
            self.environment.clone(),
            self.results.clone(),
            self.artifacts.clone(),
        ]
    }
}

/// CSV ledger that only ever grows.
#[derive(Debug, Clone)]
pub struct RunLedger {
    path: PathBuf,
}

impl RunLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record<I, T>(&self, record: I) -> CueFitResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.write_record(record)?;
        wtr.flush()?;
        Ok(())
    }

    /// Write the header row if the ledger file does not exist yet.
    pub fn create_if_not_exists(&self) -> CueFitResult<()> {
        if !self.path.exists() {
            self.write_record(LEDGER_HEADER)?;
        }
        Ok(())
    }

    /// Append one entry, creating the file with its header if needed.
    pub fn append(&self, entry: &LedgerEntry) -> CueFitResult<()> {
        self.create_if_not_exists()?;
        self.write_record(entry.to_record())?;
        tracing::debug!("Appended run to ledger {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(analysis: &str) -> LedgerEntry {
        LedgerEntry {
            datetime: Utc::now(),
            analysis: analysis.to_string(),
            model_name: "multi-probe retrieval".to_string(),
            model: "cooc, hier".to_string(),
            parameters: "{\"jitter\":1e-7}".to_string(),
            environment: "test".to_string(),
            results: "[]".to_string(),
            artifacts: String::new(),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = RunLedger::new(dir.path().join("ledger.csv"));

        ledger.append(&entry("fit all")).unwrap();
        ledger.append(&entry("fit first")).unwrap();

        let mut rdr = csv::Reader::from_path(ledger.path()).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), LEDGER_HEADER.to_vec());

        let analyses: Vec<String> = rdr
            .records()
            .map(|r| r.unwrap()[1].to_string())
            .collect();
        assert_eq!(analyses, vec!["fit all", "fit first"]);
    }

    #[test]
    fn test_existing_file_is_not_reheadered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(&path, "existing\n").unwrap();

        RunLedger::new(&path).create_if_not_exists().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\n");
    }

    #[test]
    fn test_entry_for_run() {
        let config = RunConfig::default();
        let comparison = ModelComparison {
            representations: config.representations.clone(),
            rows: Vec::new(),
        };
        let entry =
            LedgerEntry::for_run(&config, &comparison, &[PathBuf::from("out/results.csv")]).unwrap();
        assert_eq!(entry.analysis, "fit all");
        assert_eq!(entry.model, "cooc, w2v, hier");
        assert_eq!(entry.results, "[]");
        assert_eq!(entry.artifacts, "out/results.csv");
        assert!(entry.parameters.contains("\"jitter\""));
    }
}
