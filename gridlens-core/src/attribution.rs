//! Counterfactual attribution of a trial's expected reward to the agent's
//! belief trait and to its start position.
//!
//! For each trial the engine reconstructs what the agent saw along its path
//! and evaluates the discounted expected reward three times:
//!
//! - `H_actual`: actual start, actual belief
//! - `H_cf_trait`: actual start, the opposite trait's belief
//! - `H_cf_start`: counterfactual start, actual belief
//!
//! `C_trait` and `C_start` are the absolute deviations from `H_actual`, and
//! the weights split their sum proportionally.

use serde::Serialize;
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{ConfigError, TrialError};
use crate::estimator::discounted_expected_reward;
use crate::literal::Number;
use crate::record::{AgentType, Position, TrialRecord, TrialTable};
use crate::visibility::{VisibilityMask, update_visibility};

/// Row category of a start cell: `1` for the first grid row, `10` otherwise.
pub fn start_location_row(start: Position) -> u8 {
    if start.row == 1 { 1 } else { 10 }
}

/// Intermediate quantities of one trial's attribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counterfactuals {
    pub revealed: Vec<u8>,
    pub belief_actual: f64,
    pub belief_cf: f64,
    pub start_cf: Position,
    pub h_actual: f64,
    pub h_cf_trait: f64,
    pub h_cf_start: f64,
}

impl Counterfactuals {
    pub fn c_trait(&self) -> f64 {
        (self.h_cf_trait - self.h_actual).abs()
    }

    pub fn c_start(&self) -> f64 {
        (self.h_cf_start - self.h_actual).abs()
    }

    /// Share attributed to the trait; `0.5` when neither perturbation moves
    /// the estimate.
    pub fn w_trait(&self) -> f64 {
        let total = self.c_trait() + self.c_start();
        if total == 0.0 {
            0.5
        } else {
            self.c_trait() / total
        }
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    pub trial_name: String,
    pub agent: AgentType,
    pub start_location: Position,
    pub start_location_row: u8,
    pub outcome: bool,
    pub path_true_reward: Number,
    pub discounted_expected_reward: f64,
    #[serde(rename = "C_trait")]
    pub c_trait: f64,
    #[serde(rename = "C_start")]
    pub c_start: f64,
    pub w_trait: f64,
    pub w_start: f64,
}

impl TrialSummary {
    /// Output row for `record` from already evaluated counterfactuals.
    pub fn from_counterfactuals(record: &TrialRecord, cf: &Counterfactuals) -> Self {
        let w_trait = cf.w_trait();
        Self {
            trial_name: record.trial_name.clone(),
            agent: record.agent_type,
            start_location: record.start_position,
            start_location_row: start_location_row(record.start_position),
            outcome: record.reached_reward_goal,
            path_true_reward: record.path_true_reward,
            discounted_expected_reward: cf.h_actual,
            c_trait: cf.c_trait(),
            c_start: cf.c_start(),
            w_trait,
            w_start: 1.0 - w_trait,
        }
    }
}

/// Evaluates trials under one fixed [`ModelConfig`].
#[derive(Debug, Clone)]
pub struct AttributionEngine {
    config: ModelConfig,
}

impl AttributionEngine {
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Look up `trial_name` in `table` and attribute it.
    pub fn get_trial_overview(
        &self,
        trial_name: &str,
        table: &TrialTable,
    ) -> Result<TrialSummary, TrialError> {
        let record = table.get_trial_info(trial_name)?;
        self.evaluate(&record)
    }

    pub fn evaluate(&self, record: &TrialRecord) -> Result<TrialSummary, TrialError> {
        let cf = self.counterfactuals(record)?;
        Ok(TrialSummary::from_counterfactuals(record, &cf))
    }

    /// The three reward estimates and their inputs.
    pub fn counterfactuals(&self, record: &TrialRecord) -> Result<Counterfactuals, TrialError> {
        let start = record.start_position;
        let start_cf =
            self.config
                .counterfactual_start(start)
                .ok_or_else(|| TrialError::UnmappedStart {
                    trial_name: record.trial_name.clone(),
                    start,
                })?;

        let initial = VisibilityMask::new(record.tree_visibility.clone());
        let revealed = update_visibility(&initial, &record.tree_positions, &record.best_path);

        let belief_actual = self.config.belief_for(record.agent_type);
        let belief_cf = self.config.belief_for(record.agent_type.flipped());

        let estimate = |from: Position, belief: f64| {
            discounted_expected_reward(
                from,
                &revealed,
                &record.tree_rewards,
                &record.tree_positions,
                belief,
                self.config.discount_factor,
            )
            .map_err(|source| TrialError::Estimate {
                trial_name: record.trial_name.clone(),
                source,
            })
        };

        let h_actual = estimate(start, belief_actual)?;
        let h_cf_trait = estimate(start, belief_cf)?;
        let h_cf_start = estimate(start_cf, belief_actual)?;

        debug!(
            trial = %record.trial_name,
            revealed = revealed.seen_count(),
            sources = revealed.len(),
            h_actual,
            h_cf_trait,
            h_cf_start,
            "evaluated counterfactuals"
        );

        Ok(Counterfactuals {
            revealed: revealed.to_flags(),
            belief_actual,
            belief_cf,
            start_cf,
            h_actual,
            h_cf_trait,
            h_cf_start,
        })
    }
}
