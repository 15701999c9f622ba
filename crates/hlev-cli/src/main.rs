//! # hlev - simulation catalog browser
//!
//! Lists catalog properties, summarizes loaded arrays, selects hosts and
//! extracts satellite orbits from a configured catalog run.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hlev_cli::HlevCli;

fn main() {
    let cli = HlevCli::parse();

    // RUST_LOG wins; otherwise -v selects debug output
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(err) = cli.execute() {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }
}
