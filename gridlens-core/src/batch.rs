//! Running the attribution over an experiment manifest.

use std::path::Path;

use tracing::{info, info_span, warn};

use crate::attribution::{AttributionEngine, TrialSummary};
use crate::config::{AnalysisConfig, FailurePolicy};
use crate::error::{Result, TrialError};
use crate::output::write_summary_file;
use crate::record::TrialTable;

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Summaries in manifest order
    pub summaries: Vec<TrialSummary>,
    /// Trials that could not be evaluated (only under [`FailurePolicy::Collect`])
    pub failures: Vec<TrialError>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Evaluates every manifest trial against a table.
#[derive(Debug, Clone)]
pub struct BatchDriver {
    engine: AttributionEngine,
    trials: Vec<String>,
    policy: FailurePolicy,
}

impl BatchDriver {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            engine: AttributionEngine::new(config.model.clone())?,
            trials: config.batch.trials.clone(),
            policy: config.batch.failure_policy,
        })
    }

    pub fn engine(&self) -> &AttributionEngine {
        &self.engine
    }

    pub fn trials(&self) -> &[String] {
        &self.trials
    }

    /// Evaluate the manifest in order.
    ///
    /// Under [`FailurePolicy::FailFast`] the first failing trial aborts the
    /// run; under [`FailurePolicy::Collect`] it is recorded and skipped.
    pub fn run(&self, table: &TrialTable) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for trial in &self.trials {
            match self.engine.get_trial_overview(trial, table) {
                Ok(summary) => report.summaries.push(summary),
                Err(err) if self.policy == FailurePolicy::Collect => {
                    warn!(trial = %trial, error = %err, "skipping trial");
                    report.failures.push(err);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(report)
    }

    /// Load `input`, run the manifest and publish the table at `output`.
    ///
    /// Nothing is written unless the run itself succeeds.
    pub fn run_to_file(&self, input: &Path, output: &Path) -> Result<BatchReport> {
        let span = info_span!("batch", input = %input.display(), trials = self.trials.len());
        let _guard = span.enter();

        let table = TrialTable::from_path(input)?;
        let report = self.run(&table)?;
        write_summary_file(output, &report.summaries)?;

        info!(
            written = report.summaries.len(),
            failed = report.failures.len(),
            output = %output.display(),
            "batch finished"
        );
        Ok(report)
    }
}
