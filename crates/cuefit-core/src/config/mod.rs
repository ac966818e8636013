//! Configuration system for cuefit.

mod fit;

pub use fit::{FitConfig, OptimiserConfig};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CueFitError, CueFitResult};

/// How participants are derived from the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Every (id, list) pair is its own participant: `{id}_{listnum}`.
    #[default]
    All,
    /// All lists of an id are merged into one participant.
    Collapse,
    /// Only each id's first list is kept.
    First,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::All => "all",
            Condition::Collapse => "collapse",
            Condition::First => "first",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = CueFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Condition::All),
            "collapse" => Ok(Condition::Collapse),
            "first" => Ok(Condition::First),
            other => Err(CueFitError::configuration(format!(
                "Unknown condition '{}'. Use all, collapse, or first",
                other
            ))),
        }
    }
}

/// What the driver does when a single participant fit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FitErrorPolicy {
    /// Propagate the error and stop the run.
    #[default]
    Abort,
    /// Log the error and leave that participant out of the variant.
    Skip,
}

/// Where run artifacts are written. Every output is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Model comparison table as CSV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_csv: Option<PathBuf>,
    /// Per-participant fits as CSV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fits_csv: Option<PathBuf>,
    /// LaTeX rendering of the comparison table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex: Option<PathBuf>,
    /// Append-only run ledger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<PathBuf>,
}

/// Main run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Path to the transition table CSV.
    pub transition_table: PathBuf,
    /// Participant derivation.
    pub condition: Condition,
    /// Representation names, in reporting order. Each name `r` expects the
    /// columns `r_similarity` and `rem_r`.
    pub representations: Vec<String>,
    /// Representation whose remaining-list lengths shape the baseline model.
    pub baseline_reference: String,
    /// Confidence level for the attention-weight intervals.
    pub confidence: f64,
    /// Fit participants in parallel.
    pub parallel: bool,
    /// Behaviour when a single fit fails.
    pub on_fit_error: FitErrorPolicy,
    /// Retrieval model numerics.
    pub fit: FitConfig,
    /// Minimiser settings.
    pub optimiser: OptimiserConfig,
    /// Output artifacts.
    pub output: OutputConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            transition_table: PathBuf::from("transitions.csv"),
            condition: Condition::All,
            representations: vec!["cooc".to_string(), "w2v".to_string(), "hier".to_string()],
            baseline_reference: "hier".to_string(),
            confidence: 0.95,
            parallel: false,
            on_fit_error: FitErrorPolicy::Abort,
            fit: FitConfig::default(),
            optimiser: OptimiserConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> CueFitResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| CueFitError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| CueFitError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| CueFitError::Configuration(e.to_string())),
            _ => Err(CueFitError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `CUEFIT_*` environment variables onto this configuration.
    ///
    /// Unparseable numeric and boolean values are ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("CUEFIT_TRANSITION_TABLE") {
            self.transition_table = PathBuf::from(path);
        }
        if let Ok(condition) = std::env::var("CUEFIT_CONDITION") {
            match condition.parse() {
                Ok(c) => self.condition = c,
                Err(e) => tracing::warn!("Ignoring CUEFIT_CONDITION: {}", e),
            }
        }
        if let Ok(reps) = std::env::var("CUEFIT_REPRESENTATIONS") {
            let reps: Vec<String> = reps
                .split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect();
            if !reps.is_empty() {
                self.representations = reps;
            }
        }
        if let Ok(reference) = std::env::var("CUEFIT_BASELINE_REFERENCE") {
            self.baseline_reference = reference;
        }
        if let Ok(jitter) = std::env::var("CUEFIT_JITTER") {
            match jitter.parse() {
                Ok(v) => self.fit.jitter = v,
                Err(_) => tracing::warn!("Ignoring CUEFIT_JITTER: not a number"),
            }
        }
        if let Ok(iters) = std::env::var("CUEFIT_MAX_ITERS") {
            match iters.parse() {
                Ok(v) => self.optimiser.max_iters = v,
                Err(_) => tracing::warn!("Ignoring CUEFIT_MAX_ITERS: not an integer"),
            }
        }
        if let Ok(parallel) = std::env::var("CUEFIT_PARALLEL") {
            match parse_flag(&parallel) {
                Some(v) => self.parallel = v,
                None => tracing::warn!("Ignoring CUEFIT_PARALLEL: expected true or false"),
            }
        }
        if let Ok(path) = std::env::var("CUEFIT_LEDGER") {
            self.output.ledger = Some(PathBuf::from(path));
        }
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> CueFitResult<()> {
        self.fit.validate().map_err(CueFitError::configuration)?;
        self.optimiser
            .validate()
            .map_err(CueFitError::configuration)?;

        if self.representations.is_empty() {
            return Err(CueFitError::configuration(
                "At least one representation is required",
            ));
        }
        for (i, rep) in self.representations.iter().enumerate() {
            if rep.trim().is_empty() {
                return Err(CueFitError::configuration("Representation names must not be empty"));
            }
            if self.representations[..i].contains(rep) {
                return Err(CueFitError::configuration(format!(
                    "Representation '{}' is listed twice",
                    rep
                )));
            }
        }
        if !self.representations.contains(&self.baseline_reference) {
            return Err(CueFitError::configuration(format!(
                "Baseline reference '{}' is not one of the configured representations",
                self.baseline_reference
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(CueFitError::configuration("confidence must be in (0, 1)"));
        }
        Ok(())
    }
}

/// Builder for RunConfig.
#[derive(Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Set the transition table path.
    pub fn transition_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.transition_table = path.into();
        self
    }

    /// Set the participant condition.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.config.condition = condition;
        self
    }

    /// Set the representations to compare.
    pub fn representations<I, S>(mut self, reps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.representations = reps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the baseline reference representation.
    pub fn baseline_reference(mut self, reference: impl Into<String>) -> Self {
        self.config.baseline_reference = reference.into();
        self
    }

    /// Set the confidence level for weight intervals.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.config.confidence = confidence;
        self
    }

    /// Enable or disable parallel fitting.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the per-fit error policy.
    pub fn on_fit_error(mut self, policy: FitErrorPolicy) -> Self {
        self.config.on_fit_error = policy;
        self
    }

    /// Set the model numerics.
    pub fn fit(mut self, fit: FitConfig) -> Self {
        self.config.fit = fit;
        self
    }

    /// Set the optimiser configuration.
    pub fn optimiser(mut self, optimiser: OptimiserConfig) -> Self {
        self.config.optimiser = optimiser;
        self
    }

    /// Set the output configuration.
    pub fn output(mut self, output: OutputConfig) -> Self {
        self.config.output = output;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RunConfig {
        self.config
    }
}

/// Boolean environment value: `1/true/yes/on` or `0/false/no/off`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.representations, vec!["cooc", "w2v", "hier"]);
        assert_eq!(config.baseline_reference, "hier");
    }

    #[test]
    fn test_condition_parsing() {
        assert_eq!("all".parse::<Condition>().unwrap(), Condition::All);
        assert_eq!(" Collapse ".parse::<Condition>().unwrap(), Condition::Collapse);
        assert_eq!("first".parse::<Condition>().unwrap(), Condition::First);
        assert!("second".parse::<Condition>().is_err());
        assert_eq!(Condition::First.to_string(), "first");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_parallel_env_respects_false() {
        let mut config = RunConfig::builder().parallel(true).build();
        std::env::set_var("CUEFIT_PARALLEL", "0");
        config.apply_env();
        assert!(!config.parallel);

        std::env::set_var("CUEFIT_PARALLEL", "true");
        config.apply_env();
        assert!(config.parallel);

        std::env::set_var("CUEFIT_PARALLEL", "sometimes");
        config.apply_env();
        assert!(config.parallel);
        std::env::remove_var("CUEFIT_PARALLEL");
    }

    #[test]
    fn test_builder() {
        let config = RunConfig::builder()
            .transition_table("data.csv")
            .condition(Condition::Collapse)
            .representations(["cooc", "w2v"])
            .baseline_reference("w2v")
            .parallel(true)
            .build();

        assert_eq!(config.transition_table, PathBuf::from("data.csv"));
        assert_eq!(config.condition, Condition::Collapse);
        assert_eq!(config.representations.len(), 2);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_reference() {
        let config = RunConfig::builder()
            .representations(["cooc"])
            .baseline_reference("hier")
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicates_and_empty() {
        let dupes = RunConfig::builder()
            .representations(["cooc", "cooc"])
            .baseline_reference("cooc")
            .build();
        assert!(dupes.validate().is_err());

        let empty = RunConfig::builder()
            .representations(Vec::<String>::new())
            .build();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_confidence() {
        let config = RunConfig::builder().confidence(1.0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
transition_table = "fluency.csv"
condition = "first"
representations = ["cooc", "hier"]
baseline_reference = "hier"

[fit]
jitter = 0.001

[output]
latex = "table.tex"
"#,
        )
        .unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.condition, Condition::First);
        assert_eq!(config.fit.jitter, 0.001);
        assert_eq!(config.fit.zero_floor, 1.0e-8);
        assert_eq!(config.output.latex, Some(PathBuf::from("table.tex")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("run.yaml");
        std::fs::write(&yaml, "condition: collapse\nparallel: true\n").unwrap();
        let config = RunConfig::from_file(&yaml).unwrap();
        assert_eq!(config.condition, Condition::Collapse);
        assert!(config.parallel);

        let json = dir.path().join("run.json");
        std::fs::write(&json, r#"{"on_fit_error": "skip"}"#).unwrap();
        let config = RunConfig::from_file(&json).unwrap();
        assert_eq!(config.on_fit_error, FitErrorPolicy::Skip);
    }

    #[test]
    fn test_from_file_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.ini");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            RunConfig::from_file(&path),
            Err(CueFitError::Configuration(_))
        ));
    }
}
