use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "gridlens",
    about = "Counterfactual trait/start attribution for gridworld trials"
)]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file layered over the user and project config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the attribution over the trial manifest (default)
    Run(commands::run::RunArgs),
    /// Show the counterfactual breakdown of one trial
    Trial(commands::trial::TrialArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let explicit = cli.config.as_deref();
    match cli.command.unwrap_or(Commands::Run(Default::default())) {
        Commands::Run(args) => commands::run::run(args, explicit),
        Commands::Trial(args) => commands::trial::run(args, explicit),
        Commands::Config(args) => commands::config::run(args, explicit),
    }
}
