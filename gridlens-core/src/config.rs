//! Analysis configuration: file locations, model constants and the trial
//! manifest.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::record::{AgentType, Position};

/// Default discount applied per grid step.
pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.9;

/// Default value an optimist assigns to an unseen reward source.
pub const DEFAULT_OPTIMIST_BELIEF: f64 = 8.0;

/// Default value a pessimist assigns to an unseen reward source.
pub const DEFAULT_PESSIMIST_BELIEF: f64 = 2.0;

/// The two start cells of the reference experiment.
pub const LOWER_LEFT_START: Position = Position::new(10, 1);
pub const UPPER_RIGHT_START: Position = Position::new(1, 10);

/// Trials of the reference experiment, in output order.
pub const DEFAULT_TRIALS: [&str; 20] = [
    "trial_13_v2",
    "trial_318",
    "trial_553",
    "trial_374",
    "trial_920",
    "trial_453",
    "trial_894",
    "trial_863",
    "trial_989",
    "trial_269",
    "trial_528",
    "trial_406",
    "trial_955",
    "trial_962",
    "trial_740",
    "trial_556",
    "trial_825",
    "trial_859",
    "trial_629",
    "trial_82",
];

/// Complete configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()
    }
}

/// Where the input table is read from and the output table written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub input_file: String,
    pub output_dir: PathBuf,
    pub output_file: String,
}

impl PathsConfig {
    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(&self.input_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("gridworld_json"),
            input_file: "gridworld_summary.csv".to_string(),
            output_dir: PathBuf::from("model_output"),
            output_file: "hybrid_model_trial_summary.csv".to_string(),
        }
    }
}

/// One entry of the counterfactual start mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSwap {
    pub from: Position,
    pub to: Position,
}

/// Constants of the counterfactual reward model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Per-step discount `gamma`
    pub discount_factor: f64,

    /// Value an optimist assigns to unseen sources
    pub optimist_belief: f64,

    /// Value a pessimist assigns to unseen sources
    pub pessimist_belief: f64,

    /// Counterfactual start for starts missing from `start_swap`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_start: Option<Position>,

    /// Counterfactual start for each actual start
    pub start_swap: Vec<StartSwap>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
            optimist_belief: DEFAULT_OPTIMIST_BELIEF,
            pessimist_belief: DEFAULT_PESSIMIST_BELIEF,
            start_swap: vec![
                StartSwap {
                    from: LOWER_LEFT_START,
                    to: UPPER_RIGHT_START,
                },
                StartSwap {
                    from: UPPER_RIGHT_START,
                    to: LOWER_LEFT_START,
                },
            ],
            fallback_start: Some(LOWER_LEFT_START),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.discount_factor.is_finite() || self.discount_factor <= 0.0 {
            return Err(ConfigError::InvalidDiscount(self.discount_factor));
        }
        for (name, value) in [
            ("optimist", self.optimist_belief),
            ("pessimist", self.pessimist_belief),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidBelief { name, value });
            }
        }
        for (idx, swap) in self.start_swap.iter().enumerate() {
            if self.start_swap[..idx].iter().any(|s| s.from == swap.from) {
                return Err(ConfigError::DuplicateStartSwap(swap.from));
            }
        }
        Ok(())
    }

    /// Belief about unseen sources held by `agent`.
    pub fn belief_for(&self, agent: AgentType) -> f64 {
        match agent {
            AgentType::Optimist => self.optimist_belief,
            AgentType::Pessimist => self.pessimist_belief,
        }
    }

    /// Counterfactual start for `start`, if one is configured.
    pub fn counterfactual_start(&self, start: Position) -> Option<Position> {
        self.start_swap
            .iter()
            .find(|swap| swap.from == start)
            .map(|swap| swap.to)
            .or(self.fallback_start)
    }
}

/// How the batch reacts to a trial that cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort on the first failing trial; nothing is written
    #[default]
    FailFast,
    /// Record the failure, keep going, and write the trials that succeeded
    Collect,
}

/// The experiment manifest and failure handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub trials: Vec<String>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS.iter().map(|t| t.to_string()).collect(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.model.discount_factor, 0.9);
        assert_eq!(config.model.optimist_belief, 8.0);
        assert_eq!(config.model.pessimist_belief, 2.0);
        assert_eq!(config.batch.trials.len(), 20);
        assert_eq!(config.batch.trials[0], "trial_13_v2");
        assert_eq!(config.batch.failure_policy, FailurePolicy::FailFast);
        assert_eq!(
            config.paths.input_path(),
            PathBuf::from("gridworld_json/gridworld_summary.csv")
        );
        assert_eq!(
            config.paths.output_path(),
            PathBuf::from("model_output/hybrid_model_trial_summary.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_start_swap_matches_two_arm_design() {
        let model = ModelConfig::default();
        assert_eq!(
            model.counterfactual_start(Position::new(10, 1)),
            Some(Position::new(1, 10))
        );
        assert_eq!(
            model.counterfactual_start(Position::new(1, 10)),
            Some(Position::new(10, 1))
        );
        assert_eq!(
            model.counterfactual_start(Position::new(5, 5)),
            Some(Position::new(10, 1))
        );
    }

    #[test]
    fn test_no_fallback_leaves_unmapped_start_empty() {
        let model = ModelConfig {
            fallback_start: None,
            ..Default::default()
        };
        assert_eq!(model.counterfactual_start(Position::new(5, 5)), None);
    }

    #[test]
    fn test_belief_for_agent() {
        let model = ModelConfig::default();
        assert_eq!(model.belief_for(AgentType::Optimist), 8.0);
        assert_eq!(model.belief_for(AgentType::Pessimist), 2.0);
    }

    #[test]
    fn test_validate_rejects_bad_discount() {
        for gamma in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let model = ModelConfig {
                discount_factor: gamma,
                ..Default::default()
            };
            assert!(matches!(
                model.validate(),
                Err(ConfigError::InvalidDiscount(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_non_finite_belief() {
        let model = ModelConfig {
            pessimist_belief: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            model.validate(),
            Err(ConfigError::InvalidBelief {
                name: "pessimist",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_swap_source() {
        let mut model = ModelConfig::default();
        model.start_swap.push(StartSwap {
            from: LOWER_LEFT_START,
            to: Position::new(5, 5),
        });
        assert_eq!(
            model.validate(),
            Err(ConfigError::DuplicateStartSwap(LOWER_LEFT_START))
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalysisConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: AnalysisConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_toml_positions_are_pairs() {
        let toml_str = r#"
discount_factor = 0.5
optimist_belief = 9.0
pessimist_belief = 1.0
fallback_start = [2, 2]

[[start_swap]]
from = [1, 1]
to = [1, 3]
"#;
        let model: ModelConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(model.fallback_start, Some(Position::new(2, 2)));
        assert_eq!(
            model.start_swap,
            vec![StartSwap {
                from: Position::new(1, 1),
                to: Position::new(1, 3),
            }]
        );
    }
}
