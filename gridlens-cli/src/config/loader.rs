use super::types::{RawBatchConfig, RawGridlensConfig, RawModelConfig, RawPathsConfig};
use anyhow::{Context, Result};
use gridlens_core::{AnalysisConfig, BatchConfig, ModelConfig, PathsConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + explicit file)
    pub fn load(explicit: Option<&Path>) -> Result<AnalysisConfig> {
        let mut raw = RawGridlensConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Layer 3: File named on the command line, which must exist
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }

        let config = Self::finalize(raw);
        config.validate()?;
        Ok(config)
    }

    /// Get user config path (`$XDG_CONFIG_HOME/gridlens/config.toml`)
    pub fn user_config_path() -> PathBuf {
        gridlens_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with GRIDLENS_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("GRIDLENS_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".gridlens/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawGridlensConfig> {
        debug!(path = %path.display(), "reading config layer");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawGridlensConfig, overlay: RawGridlensConfig) -> RawGridlensConfig {
        RawGridlensConfig {
            paths: RawPathsConfig {
                input_dir: overlay.paths.input_dir.or(base.paths.input_dir),
                input_file: overlay.paths.input_file.or(base.paths.input_file),
                output_dir: overlay.paths.output_dir.or(base.paths.output_dir),
                output_file: overlay.paths.output_file.or(base.paths.output_file),
            },
            model: RawModelConfig {
                discount_factor: overlay.model.discount_factor.or(base.model.discount_factor),
                optimist_belief: overlay.model.optimist_belief.or(base.model.optimist_belief),
                pessimist_belief: overlay
                    .model
                    .pessimist_belief
                    .or(base.model.pessimist_belief),
                fallback_start: overlay.model.fallback_start.or(base.model.fallback_start),
                strict_start_swap: overlay
                    .model
                    .strict_start_swap
                    .or(base.model.strict_start_swap),
                start_swap: overlay.model.start_swap.or(base.model.start_swap),
            },
            batch: RawBatchConfig {
                trials: overlay.batch.trials.or(base.batch.trials),
                failure_policy: overlay.batch.failure_policy.or(base.batch.failure_policy),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawGridlensConfig) -> AnalysisConfig {
        let paths = PathsConfig::default();
        let model = ModelConfig::default();
        let batch = BatchConfig::default();

        let fallback_start = if raw.model.strict_start_swap.unwrap_or(false) {
            None
        } else {
            raw.model.fallback_start.or(model.fallback_start)
        };

        AnalysisConfig {
            paths: PathsConfig {
                input_dir: raw.paths.input_dir.unwrap_or(paths.input_dir),
                input_file: raw.paths.input_file.unwrap_or(paths.input_file),
                output_dir: raw.paths.output_dir.unwrap_or(paths.output_dir),
                output_file: raw.paths.output_file.unwrap_or(paths.output_file),
            },
            model: ModelConfig {
                discount_factor: raw.model.discount_factor.unwrap_or(model.discount_factor),
                optimist_belief: raw.model.optimist_belief.unwrap_or(model.optimist_belief),
                pessimist_belief: raw.model.pessimist_belief.unwrap_or(model.pessimist_belief),
                fallback_start,
                start_swap: raw.model.start_swap.unwrap_or(model.start_swap),
            },
            batch: BatchConfig {
                trials: raw.batch.trials.unwrap_or(batch.trials),
                failure_policy: raw.batch.failure_policy.unwrap_or(batch.failure_policy),
            },
        }
    }

    /// Render a final config as TOML that loads back to the same config
    pub fn to_toml(config: &AnalysisConfig) -> Result<String> {
        Ok(toml::to_string_pretty(&RawGridlensConfig::from(config))?)
    }

    /// Save config to a specific path
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to_path(config: &AnalysisConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, Self::to_toml(config)?)?;

        Ok(())
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<AnalysisConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(AnalysisConfig::default())
        }
    }
}
