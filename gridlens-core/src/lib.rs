//! gridlens-core: counterfactual attribution for recorded gridworld trials
//!
//! Each trial records an agent with a belief trait (optimist or pessimist)
//! walking a grid with reward sources, some of which it cannot see. This
//! crate estimates the agent's distance-discounted expected reward and asks
//! how much of it is due to the trait and how much to the start position:
//!
//! - **Table access** - [`TrialTable`] reads the summary table and
//!   [`TrialTable::get_trial_info`] parses one [`TrialRecord`]
//! - **Visibility** - [`update_visibility`] reveals the sources on the path
//! - **Estimation** - [`discounted_expected_reward`]
//! - **Attribution** - [`AttributionEngine`] produces a [`TrialSummary`]
//! - **Batch** - [`BatchDriver`] runs a manifest and writes the output table
//!
//! # Quick Start
//!
//! ```no_run
//! use gridlens_core::{AnalysisConfig, BatchDriver};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig::default();
//!     let driver = BatchDriver::new(&config)?;
//!     let report = driver.run_to_file(&config.paths.input_path(), &config.paths.output_path())?;
//!     println!("wrote {} trials", report.summaries.len());
//!     Ok(())
//! }
//! ```

pub mod attribution;
pub mod batch;
pub mod config;
pub mod error;
pub mod estimator;
pub mod literal;
pub mod output;
pub mod record;
pub mod visibility;

pub use attribution::{AttributionEngine, Counterfactuals, TrialSummary, start_location_row};
pub use batch::{BatchDriver, BatchReport};
pub use config::{AnalysisConfig, BatchConfig, FailurePolicy, ModelConfig, PathsConfig, StartSwap};
pub use error::{ConfigError, EstimateError, ModelError, OutputError, TableError, TrialError};
pub use estimator::discounted_expected_reward;
pub use literal::{Literal, LiteralError, Number};
pub use output::{SUMMARY_HEADER, write_summaries, write_summary_file};
pub use record::{AgentType, Position, TrialRecord, TrialTable};
pub use visibility::{VisibilityMask, update_visibility};
