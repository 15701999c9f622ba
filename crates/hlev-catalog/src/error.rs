//! Error types for the catalog layer

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while loading or viewing catalog properties
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Name is not a declared property
    #[error("Unknown property: {name}")]
    NameNotFound {
        /// The requested name
        name: String,
    },

    /// Invalid combination of options
    #[error("Configuration error: {reason}")]
    Configuration {
        /// What was wrong
        reason: String,
    },

    /// Backing store failure, surfaced unchanged
    #[error("Storage error: {source}")]
    Storage {
        #[from]
        /// Source storage error
        source: hlev_storage::StorageError,
    },

    /// Unit conversion failure
    #[error("Unit error: {source}")]
    Unit {
        #[from]
        /// Source unit error
        source: hlev_units::UnitError,
    },

    /// Array shape does not fit the operation
    #[error("Shape mismatch for {context}: expected {expected}, found {found:?}")]
    ShapeMismatch {
        /// What was being shaped
        context: String,
        /// Expected shape, described
        expected: String,
        /// Actual shape
        found: Vec<usize>,
    },

    /// Object index past the end of an axis
    #[error("Index {index} out of bounds for axis of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Axis length
        len: usize,
    },

    /// Snapshot index outside the time axis
    #[error("Snapshot {index} out of range for {count} snapshots")]
    SnapshotOutOfRange {
        /// Requested (possibly negative) index
        index: i64,
        /// Number of snapshots
        count: usize,
    },

    /// Snapshot label without a parsable redshift
    #[error("Invalid redshift label: {label:?}")]
    InvalidRedshiftLabel {
        /// The offending label
        label: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Config error: {reason}")]
    Config {
        /// What went wrong
        reason: String,
    },
}

impl CatalogError {
    /// Create a name-not-found error
    pub fn name_not_found(name: impl Into<String>) -> Self {
        Self::NameNotFound { name: name.into() }
    }

    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.to_vec(),
        }
    }

    /// Create a config file error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Whether the backing store reported the key as missing
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NameNotFound { .. } => true,
            Self::Storage { source } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::config(err.to_string())
    }
}
