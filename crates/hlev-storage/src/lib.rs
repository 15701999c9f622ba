//! Backing-store readers and the on-disk array schema for simulation catalogs
//!
//! This crate is the I/O boundary of the catalog stack. Everything above it
//! talks to a [`BackingReader`], which hands out raw `f64` arrays by
//! `(source, key)`; units, sentinels and caching are the catalog's business.
//!
//! Two backends are provided: [`MemoryReader`] for synthetic catalogs and
//! tests, and [`FileReader`] for `.hlar` array files laid out per source.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod ids;
pub mod schemas;
pub mod traits;

// Storage backends
pub mod memory;
pub mod file;

// Re-export essential types
pub use error::{Result, StorageError};
pub use ids::{RunId, HYDRANGEA_RUNS};
pub use schemas::{decode_array, encode_array, parse_header, ArrayHeader, DType};
pub use traits::{BackingReader, RawArray, Source};

// Re-export implementations
pub use file::{FileReader, SourceRoots};
pub use memory::MemoryReader;

/// Storage crate version for compatibility checking
pub const STORAGE_VERSION: u32 = 1;

/// Magic numbers for all binary formats
pub mod magic {
    /// Array file magic number: "HLAR"
    pub const HLAR: [u8; 4] = [0x48, 0x4C, 0x41, 0x52];
}
