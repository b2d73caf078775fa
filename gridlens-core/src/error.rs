//! Error types for gridlens-core

use std::path::PathBuf;

use thiserror::Error;

use crate::literal::LiteralError;
use crate::record::Position;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Top-level error type for gridlens-core
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Input table error: {0}")]
    Table(#[from] TableError),

    #[error("Trial error: {0}")]
    Trial(#[from] TrialError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors reading the input summary table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),
}

/// Errors evaluating a single trial
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("trial not found: {0}")]
    NotFound(String),

    #[error("trial {trial_name} appears {count} times in the table")]
    Duplicate { trial_name: String, count: usize },

    #[error("trial {trial_name}: cannot parse column '{field}': {source}")]
    FieldParse {
        trial_name: String,
        field: &'static str,
        #[source]
        source: LiteralError,
    },

    #[error("trial {trial_name}: unknown agent type '{value}'")]
    UnknownAgent { trial_name: String, value: String },

    #[error(
        "trial {trial_name}: reward source columns disagree (visibility {visibility}, rewards {rewards}, positions {positions})"
    )]
    LengthMismatch {
        trial_name: String,
        visibility: usize,
        rewards: usize,
        positions: usize,
    },

    #[error("trial {trial_name}: no counterfactual start configured for {start}")]
    UnmappedStart { trial_name: String, start: Position },

    #[error("trial {trial_name}: {source}")]
    Estimate {
        trial_name: String,
        #[source]
        source: EstimateError,
    },
}

impl TrialError {
    /// The trial this error concerns.
    pub fn trial_name(&self) -> &str {
        match self {
            TrialError::NotFound(trial_name)
            | TrialError::Duplicate { trial_name, .. }
            | TrialError::FieldParse { trial_name, .. }
            | TrialError::UnknownAgent { trial_name, .. }
            | TrialError::LengthMismatch { trial_name, .. }
            | TrialError::UnmappedStart { trial_name, .. }
            | TrialError::Estimate { trial_name, .. } => trial_name,
        }
    }
}

/// Errors from the discounted reward estimator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("no reward sources to average over")]
    NoRewardSources,

    #[error(
        "reward source inputs disagree (visibility {visibility}, rewards {rewards}, positions {positions})"
    )]
    LengthMismatch {
        visibility: usize,
        rewards: usize,
        positions: usize,
    },
}

/// Errors writing the output summary table
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to publish output: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Invalid model or batch configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("discount factor must be finite and positive, got {0}")]
    InvalidDiscount(f64),

    #[error("{name} belief must be finite, got {value}")]
    InvalidBelief { name: &'static str, value: f64 },

    #[error("start {0} has more than one counterfactual mapping")]
    DuplicateStartSwap(Position),
}
