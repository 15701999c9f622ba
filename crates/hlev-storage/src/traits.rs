//! Core trait definitions for the storage layer

use crate::error::Result;

use core::fmt;
use ndarray::ArrayD;

/// Raw numeric payload as read from a backing source, before any unit handling
pub type RawArray = ArrayD<f64>;

/// The four backing tables a catalog run is split across
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Source {
    /// Per-snapshot galaxy property table
    Properties,
    /// Per-snapshot position and velocity table
    Positions,
    /// High-time-resolution ("snip") path table
    SnipPaths,
    /// Interpolated track table
    Tracks,
}

impl Source {
    /// All sources, in table order
    pub const ALL: [Source; 4] = [
        Source::Properties,
        Source::Positions,
        Source::SnipPaths,
        Source::Tracks,
    ];

    /// Short lowercase name used in paths and messages
    pub const fn as_str(&self) -> &'static str {
        match self {
            Source::Properties => "properties",
            Source::Positions => "positions",
            Source::SnipPaths => "snip_paths",
            Source::Tracks => "tracks",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the raw arrays behind a catalog run.
///
/// Implementations must report a missing key as
/// [`StorageError::NotFound`](crate::StorageError::NotFound) and any other
/// failure as a different variant, so callers can tell the two apart.
/// Reads are blocking and must not mutate what a later read returns.
pub trait BackingReader: Send + Sync {
    /// Read the array stored under `key` in `source`
    fn read_raw(&self, source: Source, key: &str) -> Result<RawArray>;

    /// Human-readable description of where this reader gets its data
    fn describe(&self) -> String {
        String::from("backing reader")
    }
}

impl<R: BackingReader + ?Sized> BackingReader for std::sync::Arc<R> {
    fn read_raw(&self, source: Source, key: &str) -> Result<RawArray> {
        (**self).read_raw(source, key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
