//! Counterfactual breakdown of a single trial

use anyhow::Result;
use clap::Args;
use gridlens_core::{AttributionEngine, Counterfactuals, TrialSummary, TrialTable, literal};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::ConfigLoader;

/// Single-trial arguments
#[derive(Args, Debug)]
pub struct TrialArgs {
    /// Trial name as it appears in the table's `name` column
    pub name: String,

    /// Trial summary table to read (defaults to paths.input_dir/input_file)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TrialReport<'a> {
    summary: &'a TrialSummary,
    counterfactuals: &'a Counterfactuals,
}

/// Run trial command
pub fn run(args: TrialArgs, explicit: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(explicit)?;
    let input = args.input.unwrap_or_else(|| config.paths.input_path());

    let table = TrialTable::from_path(&input)?;
    let engine = AttributionEngine::new(config.model)?;
    let record = table.get_trial_info(&args.name)?;
    let counterfactuals = engine.counterfactuals(&record)?;
    let summary = TrialSummary::from_counterfactuals(&record, &counterfactuals);

    if args.json {
        let report = TrialReport {
            summary: &summary,
            counterfactuals: &counterfactuals,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(&summary, &counterfactuals));
    }
    Ok(())
}

fn render(summary: &TrialSummary, cf: &Counterfactuals) -> String {
    let f = literal::format_float;
    let mut out = String::new();
    out.push_str(&format!("Trial {}\n", summary.trial_name));
    out.push_str(&format!("{}\n", "─".repeat(40)));
    out.push_str(&format!("{:<28} {}\n", "agent", summary.agent));
    out.push_str(&format!("{:<28} {}\n", "start", summary.start_location));
    out.push_str(&format!("{:<28} {}\n", "counterfactual start", cf.start_cf));
    out.push_str(&format!(
        "{:<28} {} / {}\n",
        "belief (actual / cf)",
        f(cf.belief_actual),
        f(cf.belief_cf)
    ));
    out.push_str(&format!("{:<28} {:?}\n", "revealed sources", cf.revealed));
    out.push_str(&format!("{:<28} {}\n", "H_actual", f(cf.h_actual)));
    out.push_str(&format!("{:<28} {}\n", "H_cf_trait", f(cf.h_cf_trait)));
    out.push_str(&format!("{:<28} {}\n", "H_cf_start", f(cf.h_cf_start)));
    out.push_str(&format!("{:<28} {}\n", "C_trait", f(summary.c_trait)));
    out.push_str(&format!("{:<28} {}\n", "C_start", f(summary.c_start)));
    out.push_str(&format!(
        "{:<28} {} / {}\n",
        "w_trait / w_start",
        f(summary.w_trait),
        f(summary.w_start)
    ));
    out
}
