//! Error types for the analysis layer

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur in masking and orbit analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Catalog access failed
    #[error("Catalog error: {source}")]
    Catalog {
        #[from]
        /// Source catalog error
        source: hlev_catalog::CatalogError,
    },

    /// Inputs carry incompatible units
    #[error("Unit error: {source}")]
    Unit {
        #[from]
        /// Source unit error
        source: hlev_units::UnitError,
    },

    /// Invalid combination of options
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Input arrays do not line up
    #[error("Shape mismatch in {context}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        /// Operation that was attempted
        context: String,
        /// First operand shape
        lhs: Vec<usize>,
        /// Second operand shape
        rhs: Vec<usize>,
    },
}

impl AnalysisError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(context: impl Into<String>, lhs: &[usize], rhs: &[usize]) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlev_catalog::CatalogError;

    #[test]
    fn test_error_creation() {
        let err = AnalysisError::invalid_config("track rows require indices");
        assert!(matches!(err, AnalysisError::InvalidConfiguration { .. }));

        let err = AnalysisError::shape_mismatch("pericenters", &[2, 5], &[4]);
        assert_eq!(err.to_string(), "Shape mismatch in pericenters: [2, 5] vs [4]");
    }

    #[test]
    fn test_catalog_conversion() {
        let err: AnalysisError = CatalogError::name_not_found("Mhalo").into();
        assert!(err.to_string().contains("Mhalo"));
    }
}
