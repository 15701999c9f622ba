//! TOML configuration for opening a catalog run

use hlev_storage::{BackingReader, FileReader, RunId, SourceRoots};
use hlev_units::{Scalar, Unit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cosmology::{FlatLambdaCdm, SnapshotAxis};
use crate::error::{CatalogError, Result};
use crate::store::{AttributeStore, StoreSettings, DEFAULT_BOX_LENGTH_MPC, DEFAULT_SNIP_SET};

/// Everything needed to open one run's attribute store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub run: RunId,
    pub snip_set: String,
    pub box_length: Scalar,
    pub sources: SourceTemplates,
    pub cosmology: CosmologyConfig,
    pub snapshots: SnapshotConfig,
}

/// Directory templates of the four backing tables; `{run}` is substituted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTemplates {
    pub properties: String,
    pub positions: String,
    pub snip_paths: String,
    pub tracks: String,
}

/// Flat ΛCDM parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CosmologyConfig {
    /// Hubble constant in km/s/Mpc
    pub h0: f64,
    pub omega_m: f64,
}

/// Snapshot time axis, given either as labels or as redshifts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redshifts: Option<Vec<f64>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            run: RunId::new(0),
            snip_set: DEFAULT_SNIP_SET.to_string(),
            box_length: Scalar::new(DEFAULT_BOX_LENGTH_MPC, Unit::MPC),
            sources: SourceTemplates::default(),
            cosmology: CosmologyConfig::default(),
            snapshots: SnapshotConfig::default(),
        }
    }
}

impl Default for SourceTemplates {
    fn default() -> Self {
        Self {
            properties: "highlev/CE-{run}/properties".to_string(),
            positions: "highlev/CE-{run}/positions".to_string(),
            snip_paths: "highlev/CE-{run}/snip_paths".to_string(),
            tracks: "highlev/CE-{run}/tracks".to_string(),
        }
    }
}

impl Default for CosmologyConfig {
    fn default() -> Self {
        let planck = FlatLambdaCdm::PLANCK13;
        Self {
            h0: planck.h0,
            omega_m: planck.omega_m,
        }
    }
}

impl SourceTemplates {
    /// Every template laid out under one directory
    pub fn under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            properties: format!("{}/properties", base),
            positions: format!("{}/positions", base),
            snip_paths: format!("{}/snip_paths", base),
            tracks: format!("{}/tracks", base),
        }
    }

    /// Table roots for one run
    pub fn roots(&self, run: RunId) -> SourceRoots {
        SourceRoots {
            properties: PathBuf::from(run.expand(&self.properties)),
            positions: PathBuf::from(run.expand(&self.positions)),
            snip_paths: PathBuf::from(run.expand(&self.snip_paths)),
            tracks: PathBuf::from(run.expand(&self.tracks)),
        }
    }
}

impl SnapshotConfig {
    fn axis(&self, cosmology: &FlatLambdaCdm) -> Result<SnapshotAxis> {
        match (&self.labels, &self.redshifts) {
            (Some(_), Some(_)) => Err(CatalogError::configuration(
                "snapshots may be given as labels or as redshifts, not both",
            )),
            (Some(labels), None) => SnapshotAxis::from_labels(labels, cosmology),
            (None, Some(redshifts)) => Ok(SnapshotAxis::from_redshifts(redshifts.clone(), cosmology)),
            (None, None) => Err(CatalogError::configuration("no snapshots configured")),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CatalogError::config(format!("Invalid config file: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CatalogError::config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Store settings described by this configuration
    pub fn settings(&self) -> Result<StoreSettings> {
        if !self.box_length.unit.is_compatible(Unit::MPC) {
            return Err(CatalogError::configuration(format!(
                "box length must be a length, got {}",
                self.box_length
            )));
        }
        let cosmology = FlatLambdaCdm::new(self.cosmology.h0, self.cosmology.omega_m)?;
        let axis = self.snapshots.axis(&cosmology)?;
        if !self.run.is_hydrangea() {
            log::warn!("{} is not one of the standard Hydrangea runs", self.run);
        }
        Ok(StoreSettings::new(self.run, axis, Arc::new(cosmology))
            .with_box_length(self.box_length)
            .with_snip_set(self.snip_set.clone()))
    }

    /// Reader over the configured table directories
    pub fn reader(&self) -> FileReader {
        FileReader::new(self.sources.roots(self.run))
    }

    /// Open the run's store over `.hlar` files
    pub fn open(&self) -> Result<AttributeStore> {
        self.open_with(Arc::new(self.reader()))
    }

    /// Open the run's store over any reader
    pub fn open_with(&self, reader: Arc<dyn BackingReader>) -> Result<AttributeStore> {
        Ok(AttributeStore::new(reader, self.settings()?))
    }
}
