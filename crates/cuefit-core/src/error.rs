//! Error types for cuefit operations.
//!
//! This module provides the crate's error hierarchy. Every error maps to a
//! stable [`ErrorCode`] through [`CueFitError::code`], so callers can branch
//! on failures without matching strings.

use std::fmt;

use thiserror::Error;

/// Result type alias for cuefit operations.
pub type CueFitResult<T> = Result<T, CueFitError>;

/// What kind of validation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// A probability, rounded to one decimal, fell outside `[0.0, 1.1]`.
    ProbabilityOutOfRange,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbabilityOutOfRange => write!(f, "probability out of range [0.0, 1.1]"),
        }
    }
}

/// A rejected set of values, kept so the caller can log or inspect them.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ValidationKind,
    /// The values that failed the check, in input order.
    pub offending_values: Vec<f64>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.kind, self.offending_values)
    }
}

/// Main error type for all cuefit operations.
#[derive(Error, Debug)]
pub enum CueFitError {
    /// Model output failed a sanity check.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// The number of supplied weights does not match the number of probes.
    #[error("Configuration mismatch: expected {expected} weights, got {actual}")]
    ConfigurationMismatch { expected: usize, actual: usize },

    /// Invalid configuration value or file.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A cell in the input table could not be parsed.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// The input data is structurally unusable.
    #[error("Data error: {message}")]
    Data { message: String, code: ErrorCode },

    /// The optimiser failed to run (distinct from not converging).
    #[error("Optimiser error: {message}")]
    Optimiser { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValProbabilityRange,

    // Configuration (CFG_xxx)
    CfgWeightMismatch,
    CfgInvalid,

    // Parse (PARSE_xxx)
    ParseInvalidNumber,
    ParseMissingColumn,

    // Data (DATA_xxx)
    DataMisaligned,
    DataEmpty,
    DataMissingCue,

    // Optimiser (OPT_xxx)
    OptFailed,

    // IO
    Io,
    Csv,
    Serialization,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValProbabilityRange => "VAL_001",
            ErrorCode::CfgWeightMismatch => "CFG_001",
            ErrorCode::CfgInvalid => "CFG_002",
            ErrorCode::ParseInvalidNumber => "PARSE_001",
            ErrorCode::ParseMissingColumn => "PARSE_002",
            ErrorCode::DataMisaligned => "DATA_001",
            ErrorCode::DataEmpty => "DATA_002",
            ErrorCode::DataMissingCue => "DATA_003",
            ErrorCode::OptFailed => "OPT_001",
            ErrorCode::Io => "IO_001",
            ErrorCode::Csv => "IO_002",
            ErrorCode::Serialization => "IO_003",
        }
    }
}

impl CueFitError {
    /// Create a probability range validation error.
    pub fn probability_range(offending_values: Vec<f64>) -> Self {
        Self::Validation(ValidationError {
            kind: ValidationKind::ProbabilityOutOfRange,
            offending_values,
        })
    }

    /// Create a weight-count mismatch error.
    pub fn weight_mismatch(expected: usize, actual: usize) -> Self {
        Self::ConfigurationMismatch { expected, actual }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a number parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidNumber,
        }
    }

    /// Create a missing-column error.
    pub fn missing_column(column: impl AsRef<str>) -> Self {
        Self::Parse {
            message: format!("Column '{}' not found in transition table", column.as_ref()),
            code: ErrorCode::ParseMissingColumn,
        }
    }

    /// Create a data alignment error.
    pub fn misaligned(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
            code: ErrorCode::DataMisaligned,
        }
    }

    /// Create an empty-data error.
    pub fn empty(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
            code: ErrorCode::DataEmpty,
        }
    }

    /// Create a missing-cue error.
    pub fn missing_cue(representation: impl AsRef<str>) -> Self {
        Self::Data {
            message: format!(
                "Transition record has no cue for representation '{}'",
                representation.as_ref()
            ),
            code: ErrorCode::DataMissingCue,
        }
    }

    /// Create an optimiser error.
    pub fn optimiser(message: impl Into<String>) -> Self {
        Self::Optimiser {
            message: message.into(),
            code: ErrorCode::OptFailed,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValProbabilityRange,
            Self::ConfigurationMismatch { .. } => ErrorCode::CfgWeightMismatch,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Parse { code, .. } => *code,
            Self::Data { code, .. } => *code,
            Self::Optimiser { code, .. } => *code,
            Self::Io(_) => ErrorCode::Io,
            Self::Csv(_) => ErrorCode::Csv,
            Self::Serialization(_) => ErrorCode::Serialization,
        }
    }

    /// The offending values, when this is a validation failure.
    pub fn offending_values(&self) -> Option<&[f64]> {
        match self {
            Self::Validation(v) => Some(&v.offending_values),
            _ => None,
        }
    }
}
