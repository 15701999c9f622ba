//! Array file inspection

use anyhow::Context as _;
use clap::Args;
use hlev_storage::{decode_array, parse_header};
use std::path::PathBuf;
use tracing::info;

use crate::error::CliResult;

/// Print the header of a .hlar array file and verify its checksum
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Path to the array file
    pub path: PathBuf,

    /// Print the decoded values
    #[arg(long)]
    pub values: bool,
}

impl InspectCommand {
    pub fn execute(self) -> CliResult<()> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let header = parse_header(&bytes)?;

        println!("file:     {}", self.path.display());
        println!("version:  {}", header.version);
        println!("dtype:    {:?}", header.dtype);
        println!("shape:    {:?}", header.shape);
        println!("elements: {}", header.element_count);
        println!("checksum: {:08x}", header.data_checksum);

        let array = decode_array(&bytes)?;
        info!("checksum verified");
        println!("status:   ok");
        if self.values {
            println!("{}", array);
        }
        Ok(())
    }
}
