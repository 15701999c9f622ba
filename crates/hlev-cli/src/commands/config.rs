//! Effective configuration

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::{default_config_path, Context};
use crate::error::{CliError, CliResult};

/// Print the effective configuration as TOML
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Write a default configuration to this path instead
    #[arg(long)]
    pub init: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn execute(self, context: &Context) -> CliResult<()> {
        if let Some(path) = self.init {
            if path.exists() {
                return Err(CliError::invalid_args(format!(
                    "{} already exists",
                    path.display()
                )));
            }
            let mut config = hlev_catalog::StoreConfig::default();
            config.snapshots.redshifts = Some(vec![0.0]);
            config.save_to_file(&path)?;
            info!("Wrote default configuration to {}", path.display());
            return Ok(());
        }

        let config = context.load_config()?;
        let text = toml::to_string_pretty(&config)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;
        println!("{}", text.trim_end());
        if context.config.is_none() {
            info!("Loaded from {}", default_config_path()?.display());
        }
        Ok(())
    }
}
