use gridlens_core::{AnalysisConfig, FailurePolicy, Position, StartSwap};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawGridlensConfig {
    #[serde(default)]
    pub paths: RawPathsConfig,

    #[serde(default)]
    pub model: RawModelConfig,

    #[serde(default)]
    pub batch: RawBatchConfig,
}

/// Input and output locations as stored in TOML
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawPathsConfig {
    /// Directory holding the trial summary table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,

    /// File name of the trial summary table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,

    /// Directory the output table is written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// File name of the output table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Model constants as stored in TOML
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawModelConfig {
    /// Per-step discount factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_factor: Option<f64>,

    /// Value an optimist assigns to unseen reward sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimist_belief: Option<f64>,

    /// Value a pessimist assigns to unseen reward sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pessimist_belief: Option<f64>,

    /// Counterfactual start for unmapped starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_start: Option<Position>,

    /// Fail trials whose start has no mapping instead of using the fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_start_swap: Option<bool>,

    /// Counterfactual start mapping (replaces the default mapping when set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_swap: Option<Vec<StartSwap>>,
}

/// Manifest and failure handling as stored in TOML
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawBatchConfig {
    /// Trial names to evaluate, in output order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trials: Option<Vec<String>>,

    /// `fail_fast` or `collect`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<FailurePolicy>,
}

impl From<&AnalysisConfig> for RawGridlensConfig {
    /// Every value set explicitly, so the file reloads to the same config
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            paths: RawPathsConfig {
                input_dir: Some(config.paths.input_dir.clone()),
                input_file: Some(config.paths.input_file.clone()),
                output_dir: Some(config.paths.output_dir.clone()),
                output_file: Some(config.paths.output_file.clone()),
            },
            model: RawModelConfig {
                discount_factor: Some(config.model.discount_factor),
                optimist_belief: Some(config.model.optimist_belief),
                pessimist_belief: Some(config.model.pessimist_belief),
                fallback_start: config.model.fallback_start,
                strict_start_swap: Some(config.model.fallback_start.is_none()),
                start_swap: Some(config.model.start_swap.clone()),
            },
            batch: RawBatchConfig {
                trials: Some(config.batch.trials.clone()),
                failure_policy: Some(config.batch.failure_policy),
            },
        }
    }
}
