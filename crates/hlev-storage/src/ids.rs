//! ID types for the storage layer

use core::fmt;

/// Simulation run ("cluster environment") identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub u32);

/// The standard Hydrangea zoom runs that carry high-level catalogs
pub const HYDRANGEA_RUNS: [u32; 24] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 18, 21, 22, 24, 25, 28, 29,
];

impl RunId {
    /// Create a new run ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Whether this is one of the standard Hydrangea runs
    pub fn is_hydrangea(&self) -> bool {
        HYDRANGEA_RUNS.contains(&self.0)
    }

    /// Substitute `{run}` in a path template with this run's number
    pub fn expand(&self, template: &str) -> String {
        template.replace("{run}", &self.0.to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CE-{}", self.0)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    impl Serialize for RunId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            self.0.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for RunId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let id = u32::deserialize(deserializer)?;
            Ok(RunId::new(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id() {
        let run = RunId::new(21);
        assert_eq!(run.raw(), 21);
        assert!(run.is_hydrangea());
        assert_eq!(format!("{}", run), "CE-21");
    }

    #[test]
    fn test_non_standard_runs() {
        assert!(!RunId::new(17).is_hydrangea());
        assert!(!RunId::new(30).is_hydrangea());
    }

    #[test]
    fn test_expand_template() {
        let run = RunId::new(7);
        assert_eq!(run.expand("/data/CE-{run}/HYDRO"), "/data/CE-7/HYDRO");
        assert_eq!(run.expand("/no/placeholder"), "/no/placeholder");
    }

    #[test]
    fn test_ordering() {
        assert!(RunId::new(1) < RunId::new(2));
    }
}
