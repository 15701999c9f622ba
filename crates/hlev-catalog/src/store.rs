//! Lazy, memoizing attribute store over one catalog run

use hlev_storage::{BackingReader, RawArray, RunId, Source};
use hlev_units::{Quantity, Scalar, Unit};
use log::{debug, info, trace, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cosmology::{AgeRedshift, FlatLambdaCdm, SnapshotAxis};
use crate::error::{CatalogError, Result};
use crate::property::{Namespace, ProperCorrection, Property};
use crate::transform;

/// Comoving side length of the parent simulation box
pub const DEFAULT_BOX_LENGTH_MPC: f64 = 3200.0;

/// Snip set read when none is configured
pub const DEFAULT_SNIP_SET: &str = "Basic";

/// Run-wide settings shared by every load
#[derive(Clone)]
pub struct StoreSettings {
    pub run: RunId,
    /// Periodic box length used when recentring positions
    pub box_length: Scalar,
    /// Name under `RootIndex/` listing the snips to assemble
    pub snip_set: String,
    pub axis: Arc<SnapshotAxis>,
    pub cosmology: Arc<dyn AgeRedshift>,
}

impl StoreSettings {
    /// Settings with the default box length and snip set
    pub fn new(run: RunId, axis: SnapshotAxis, cosmology: Arc<dyn AgeRedshift>) -> Self {
        Self {
            run,
            box_length: Scalar::new(DEFAULT_BOX_LENGTH_MPC, Unit::MPC),
            snip_set: DEFAULT_SNIP_SET.to_string(),
            axis: Arc::new(axis),
            cosmology,
        }
    }

    /// Planck 2013 settings for snapshots at the given redshifts
    pub fn planck13(run: RunId, redshifts: Vec<f64>) -> Self {
        let cosmology = FlatLambdaCdm::PLANCK13;
        let axis = SnapshotAxis::from_redshifts(redshifts, &cosmology);
        Self::new(run, axis, Arc::new(cosmology))
    }

    pub fn with_box_length(mut self, box_length: Scalar) -> Self {
        self.box_length = box_length;
        self
    }

    pub fn with_snip_set(mut self, snip_set: impl Into<String>) -> Self {
        self.snip_set = snip_set.into();
        self
    }
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("run", &self.run)
            .field("box_length", &self.box_length)
            .field("snip_set", &self.snip_set)
            .field("snapshots", &self.axis.len())
            .finish_non_exhaustive()
    }
}

/// Per-run cache of loaded properties.
///
/// A property is read from the backing store the first time it is asked
/// for, transformed (sentinels, `10^x`, unit, proper correction) and kept
/// until [`AttributeStore::remove`] or [`AttributeStore::clear`]. Values are
/// handed out as shared [`Arc<Quantity>`]s and are never re-derived while
/// cached.
///
/// The store is `Sync`. The cache lock is held across check, load and
/// insert, so concurrent first access to one property performs one read.
/// A failed load leaves the cache untouched.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use hlev_catalog::{AttributeStore, Property, StoreSettings};
/// use hlev_storage::{MemoryReader, RunId, Source};
/// use hlev_units::Unit;
/// use ndarray::arr2;
///
/// let reader = MemoryReader::new()
///     .with(Source::Properties, "M200", arr2(&[[12.0, 12.5]]).into_dyn());
/// let settings = StoreSettings::planck13(RunId::new(0), vec![1.0, 0.0]);
/// let store = AttributeStore::new(Arc::new(reader), settings);
///
/// let m200 = store.property(Property::M200).unwrap();
/// assert_eq!(m200.unit(), Unit::MSUN);
/// assert!(store.contains("M200"));
/// ```
pub struct AttributeStore {
    reader: Arc<dyn BackingReader>,
    settings: StoreSettings,
    cache: Mutex<HashMap<Property, Arc<Quantity>>>,
}

impl AttributeStore {
    pub fn new(reader: Arc<dyn BackingReader>, settings: StoreSettings) -> Self {
        debug!(
            "opening attribute store for {} over {}",
            settings.run,
            reader.describe()
        );
        Self {
            reader,
            settings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn run(&self) -> RunId {
        self.settings.run
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn box_length(&self) -> Scalar {
        self.settings.box_length
    }

    pub fn snapshots(&self) -> &SnapshotAxis {
        &self.settings.axis
    }

    /// Property by catalog name
    pub fn get(&self, name: &str) -> Result<Arc<Quantity>> {
        self.property(Property::from_name(name)?)
    }

    /// Property by enum key, loading it on first access
    pub fn property(&self, property: Property) -> Result<Arc<Quantity>> {
        let cached = self.cache.lock().get(&property).cloned();
        if let Some(hit) = cached {
            trace!("cache hit for {}", property);
            return Ok(hit);
        }

        // Dependencies go through the cache themselves; resolve them first.
        let scales = match property.spec().proper {
            ProperCorrection::None => None,
            ProperCorrection::SnapshotAxis => Some(self.settings.axis.scales().to_vec()),
            ProperCorrection::TrackTimes => Some(self.track_scales()?),
        };

        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(&property) {
            return Ok(Arc::clone(hit));
        }
        let loaded = Arc::new(self.load(property, scales.as_deref())?);
        debug!(
            "loaded {} for {}: shape {:?} [{}]",
            property,
            self.settings.run,
            loaded.shape(),
            loaded.unit()
        );
        cache.insert(property, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Values of `property` at one snapshot (negative counts from the end)
    pub fn at_snapshot(&self, property: Property, snapshot: i64) -> Result<Quantity> {
        let values = self.property(property)?;
        let index = self.settings.axis.resolve(snapshot)?;
        if values.ndim() < 2 || values.shape()[1] <= index {
            return Err(CatalogError::shape_mismatch(
                property.name(),
                format!("[object, snapshot >= {}, ...]", index + 1),
                values.shape(),
            ));
        }
        Ok(values.index_axis(1, index))
    }

    /// Whether `name` is currently cached
    pub fn contains(&self, name: &str) -> bool {
        Property::from_name(name)
            .map(|p| self.contains_property(p))
            .unwrap_or(false)
    }

    pub fn contains_property(&self, property: Property) -> bool {
        self.cache.lock().contains_key(&property)
    }

    /// Drop a cached property; the next access reloads it
    pub fn remove(&self, name: &str) -> Option<Arc<Quantity>> {
        let property = Property::from_name(name).ok()?;
        self.cache.lock().remove(&property)
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached properties
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Declared scalar and positional properties; nothing is loaded
    pub fn keys(&self) -> impl Iterator<Item = Property> {
        Property::declared_keys()
    }

    /// Currently cached properties, in table order
    pub fn cached_keys(&self) -> Vec<Property> {
        let mut keys: Vec<Property> = self.cache.lock().keys().copied().collect();
        keys.sort();
        keys
    }

    /// Every scalar and positional property with its value.
    ///
    /// Loads the whole catalog first, which reads every table of the run.
    pub fn items(&self) -> Result<Vec<(Property, Arc<Quantity>)>> {
        info!("loading every declared property for {}", self.settings.run);
        self.keys()
            .map(|p| self.property(p).map(|q| (p, q)))
            .collect()
    }

    /// Values of [`AttributeStore::items`]
    pub fn values(&self) -> Result<Vec<Arc<Quantity>>> {
        Ok(self.items()?.into_iter().map(|(_, q)| q).collect())
    }

    fn load(&self, property: Property, scales: Option<&[f64]>) -> Result<Quantity> {
        let raw = match property.namespace() {
            Namespace::Snip => self.read_snips(property)?,
            ns => self.reader.read_raw(ns.source(), property.disk_key())?,
        };
        let quantity = transform::format_raw(raw, property.spec());
        match scales {
            Some(scales) => transform::to_proper(quantity, scales),
            None => Ok(quantity),
        }
    }

    fn read_snips(&self, property: Property) -> Result<RawArray> {
        let set = &self.settings.snip_set;
        let index = self
            .reader
            .read_raw(Source::SnipPaths, &format!("RootIndex/{}", set))?;
        let snips = transform::snip_indices(&index)?;
        if snips.is_empty() {
            warn!("snip set {:?} of {} has no entries", set, self.settings.run);
            return Err(CatalogError::configuration(format!(
                "snip set {:?} is empty",
                set
            )));
        }

        let parts = snips
            .iter()
            .map(|s| {
                let key = format!("Snepshot_{:04}/{}", s, property.disk_key());
                self.reader.read_raw(Source::SnipPaths, &key)
            })
            .collect::<hlev_storage::Result<Vec<_>>>()?;
        transform::assemble_snips(&parts)
    }

    fn track_scales(&self) -> Result<Vec<f64>> {
        let times = self.property(Property::InterpInterpolationTimes)?;
        transform::track_scales(&times, self.settings.cosmology.as_ref())
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("settings", &self.settings)
            .field("cached", &self.cached_keys())
            .finish_non_exhaustive()
    }
}

/// Equal when both caches hold the same properties with equal values.
///
/// Values containing `NaN` only compare equal when they are the same
/// shared allocation.
impl PartialEq for AttributeStore {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let ours = self.cache.lock().clone();
        let theirs = other.cache.lock();
        ours.len() == theirs.len()
            && ours.iter().all(|(k, v)| {
                theirs
                    .get(k)
                    .map_or(false, |w| Arc::ptr_eq(v, w) || v == w)
            })
    }
}
