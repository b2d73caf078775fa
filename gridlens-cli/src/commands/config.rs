use crate::config::ConfigLoader;
use anyhow::Result;
use clap::{Args, Subcommand};
use gridlens_core::AnalysisConfig;
use std::path::Path;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged)
    Show,
    /// Show configuration file paths
    Path,
    /// Write the default configuration to the project config file
    Init {
        /// Overwrite an existing project config
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(explicit),
        ConfigCommands::Path => show_paths(explicit),
        ConfigCommands::Init { force } => init_config(force),
    }
}

fn show_config(explicit: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(explicit)?;
    println!("{}", ConfigLoader::to_toml(&config)?);
    Ok(())
}

fn show_paths(explicit: Option<&Path>) -> Result<()> {
    println!("User config:    {:?}", ConfigLoader::user_config_path());
    println!("Project config: {:?}", ConfigLoader::project_config_path());
    if let Some(path) = explicit {
        println!("Explicit config: {:?}", path);
    }
    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = ConfigLoader::project_config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    ConfigLoader::save_to_path(&AnalysisConfig::default(), &path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
