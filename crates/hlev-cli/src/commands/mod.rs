//! CLI command implementations for hlev

use clap::{Parser, Subcommand};
use hlev_catalog::{AttributeStore, StoreConfig};
use hlev_storage::RunId;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

pub mod config;
pub mod hosts;
pub mod inspect;
pub mod keys;
pub mod orbits;
pub mod show;

/// hlev - lazy, unit-aware simulation catalog access
#[derive(Parser, Debug)]
#[command(
    name = "hlev",
    version,
    about = "Browse high-level simulation catalogs and satellite orbits",
    long_about = "hlev reads multi-snapshot galaxy catalogs lazily, attaches physical units, \
                  selects hosts and satellites in a periodic box and extracts first infall \
                  and pericenter times."
)]
pub struct HlevCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "HLEV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the run number from the configuration
    #[arg(short, long, global = true)]
    pub run: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the declared catalog properties
    Keys(keys::KeysCommand),

    /// Summarize one property
    Show(show::ShowCommand),

    /// Select host objects by mass
    Hosts(hosts::HostsCommand),

    /// First infall and pericenter of a host's satellites
    Orbits(orbits::OrbitsCommand),

    /// Inspect a .hlar array file
    Inspect(inspect::InspectCommand),

    /// Print the effective configuration
    Config(config::ConfigCommand),
}

impl HlevCli {
    /// Execute the CLI command
    pub fn execute(self) -> CliResult<()> {
        let context = Context {
            config: self.config,
            run: self.run,
        };

        match self.command {
            Commands::Keys(cmd) => cmd.execute(),
            Commands::Show(cmd) => cmd.execute(&context),
            Commands::Hosts(cmd) => cmd.execute(&context),
            Commands::Orbits(cmd) => cmd.execute(&context),
            Commands::Inspect(cmd) => cmd.execute(),
            Commands::Config(cmd) => cmd.execute(&context),
        }
    }
}

/// Global options shared by commands that open a catalog run
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub run: Option<u32>,
}

impl Context {
    /// Resolve and load the store configuration.
    ///
    /// An explicit `--config` must exist; without one the user config
    /// directory is tried.
    pub fn load_config(&self) -> CliResult<StoreConfig> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => {
                let path = default_config_path()?;
                if !path.exists() {
                    return Err(CliError::config(format!(
                        "no configuration given and {} does not exist",
                        path.display()
                    )));
                }
                path
            }
        };
        debug!("loading configuration from {}", path.display());

        let mut config = StoreConfig::load_from_file(&path)?;
        if let Some(run) = self.run {
            config.run = RunId::new(run);
        }
        Ok(config)
    }

    /// Open the configured run's attribute store
    pub fn open_store(&self) -> CliResult<AttributeStore> {
        let config = self.load_config()?;
        info!("Opening {} ({})", config.run, describe_roots(&config));
        Ok(config.open()?)
    }
}

fn describe_roots(config: &StoreConfig) -> String {
    let roots = config.sources.roots(config.run);
    roots
        .properties
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string())
}

/// Default configuration file location
pub fn default_config_path() -> CliResult<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| CliError::config("Could not determine config directory"))?;
    Ok(config_dir.join("hlev").join("config.toml"))
}
