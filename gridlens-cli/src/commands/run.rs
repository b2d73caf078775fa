//! Batch run over the experiment manifest

use anyhow::{Context, Result};
use clap::Args;
use gridlens_core::{AnalysisConfig, BatchDriver, FailurePolicy};
use std::path::{Path, PathBuf};
use tracing::error;

use crate::config::ConfigLoader;

/// Batch run arguments
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Trial summary table to read (defaults to paths.input_dir/input_file)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output table to write (defaults to paths.output_dir/output_file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Trial to evaluate; repeat to build a manifest replacing the configured one
    #[arg(short, long = "trial")]
    pub trials: Vec<String>,

    /// Keep going past failing trials and report them at the end
    #[arg(long)]
    pub collect_errors: bool,

    /// Override the per-step discount factor
    #[arg(long)]
    pub discount: Option<f64>,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut AnalysisConfig) {
        if !self.trials.is_empty() {
            config.batch.trials = self.trials.clone();
        }
        if self.collect_errors {
            config.batch.failure_policy = FailurePolicy::Collect;
        }
        if let Some(discount) = self.discount {
            config.model.discount_factor = discount;
        }
    }
}

/// Run the batch
pub fn run(args: RunArgs, explicit: Option<&Path>) -> Result<()> {
    let mut config = ConfigLoader::load(explicit)?;
    args.apply(&mut config);

    let input = args.input.unwrap_or_else(|| config.paths.input_path());
    let output = args.output.unwrap_or_else(|| config.paths.output_path());

    let driver = BatchDriver::new(&config)?;
    let report = driver
        .run_to_file(&input, &output)
        .with_context(|| format!("batch over {} failed", input.display()))?;

    println!(
        "Wrote {} trial summaries to {}",
        report.summaries.len(),
        output.display()
    );

    if !report.is_complete() {
        for failure in &report.failures {
            error!(trial = failure.trial_name(), "{}", failure);
        }
        anyhow::bail!(
            "{} of {} trials failed",
            report.failures.len(),
            driver.trials().len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const TABLE: &str = "name,agent_type,agent_start_position,tree_visibility,tree_rewards,tree_positions,best_path,path_reached_reward_goal,path_true_reward\n\
        trial_1,optimist,\"(10, 1)\",\"[0, 1]\",\"[4, 2]\",\"[(9, 1), (1, 9)]\",\"[(10, 1), (9, 1)]\",True,4\n\
        trial_2,pessimist,\"(1, 10)\",\"[0, 0]\",\"[4, 2]\",\"[(9, 1), (1, 9)]\",\"[(1, 10), (1, 9)]\",False,0\n";

    fn isolate(dir: &Path) {
        unsafe {
            std::env::set_var("GRIDLENS_PROJECT_CONFIG_DIR", dir.join("project"));
            std::env::set_var("XDG_CONFIG_HOME", dir.join("xdg"));
        }
    }

    fn restore() {
        unsafe {
            std::env::remove_var("GRIDLENS_PROJECT_CONFIG_DIR");
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AnalysisConfig::default();
        let args = RunArgs {
            trials: vec!["trial_2".to_string()],
            collect_errors: true,
            discount: Some(0.5),
            ..Default::default()
        };

        args.apply(&mut config);

        assert_eq!(config.batch.trials, vec!["trial_2".to_string()]);
        assert_eq!(config.batch.failure_policy, FailurePolicy::Collect);
        assert_eq!(config.model.discount_factor, 0.5);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = AnalysisConfig::default();
        RunArgs::default().apply(&mut config);
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    #[serial]
    fn test_run_writes_output_table() {
        let temp_dir = TempDir::new().unwrap();
        isolate(temp_dir.path());
        let input = temp_dir.path().join("summary.csv");
        let output = temp_dir.path().join("out").join("result.csv");
        std::fs::write(&input, TABLE).unwrap();

        let result = run(
            RunArgs {
                input: Some(input),
                output: Some(output.clone()),
                trials: vec!["trial_2".to_string(), "trial_1".to_string()],
                ..Default::default()
            },
            None,
        );
        restore();

        result.unwrap();
        let contents = std::fs::read_to_string(&output).unwrap();
        let names: Vec<_> = contents
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["trial_2", "trial_1"]);
    }

    #[test]
    #[serial]
    fn test_run_with_collected_failures_still_errors() {
        let temp_dir = TempDir::new().unwrap();
        isolate(temp_dir.path());
        let input = temp_dir.path().join("summary.csv");
        let output = temp_dir.path().join("result.csv");
        std::fs::write(&input, TABLE).unwrap();

        let result = run(
            RunArgs {
                input: Some(input),
                output: Some(output.clone()),
                trials: vec!["trial_1".to_string(), "trial_missing".to_string()],
                collect_errors: true,
                ..Default::default()
            },
            None,
        );
        restore();

        assert!(result.is_err());
        let contents = std::fs::read_to_string(&output).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
