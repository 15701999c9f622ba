//! hlev CLI crate
//!
//! The binary (`src/main.rs`) wires up logging and argument parsing and then
//! calls [`HlevCli::execute`]. Commands are exposed as a library so they can
//! be driven from integration tests without spawning a process.
//!
//! Commands (see [`commands`]):
//! - `keys`: the declared property table
//! - `show`: shape, unit and value range of one property
//! - `hosts`: host selection by mass
//! - `orbits`: satellites of a host with first infall and pericenter
//! - `inspect`: header and checksum of a `.hlar` array file

pub mod commands;
pub mod error;

pub use commands::HlevCli;
pub use error::{CliError, CliResult};
