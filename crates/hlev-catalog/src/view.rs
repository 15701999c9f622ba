//! Read-only projections of an attribute store onto selected objects

use hlev_storage::RawArray;
use hlev_units::Quantity;
use ndarray::{ArrayD, Axis, IxDyn};
use std::ops::Deref;

use crate::error::{CatalogError, Result};
use crate::property::Property;
use crate::store::AttributeStore;

/// Which objects a view exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// One object; reads drop the object axis
    Single(usize),
    /// Objects whose bit is set; reads keep the object axis
    Mask(Vec<bool>),
}

impl Selection {
    /// Number of selected objects
    pub fn len(&self) -> usize {
        match self {
            Selection::Single(_) => 1,
            Selection::Mask(bits) => bits.iter().filter(|&&b| b).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected object indices, in ascending order
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Selection::Single(i) => vec![*i],
            Selection::Mask(bits) => bits
                .iter()
                .enumerate()
                .filter_map(|(i, &b)| b.then_some(i))
                .collect(),
        }
    }

    fn apply(&self, property: Property, values: &Quantity) -> Result<Quantity> {
        if values.ndim() == 0 {
            return Err(CatalogError::shape_mismatch(property.name(), "[object, ...]", values.shape()));
        }
        let len = values.shape()[0];
        match self {
            Selection::Single(i) => {
                if *i >= len {
                    return Err(CatalogError::IndexOutOfBounds { index: *i, len });
                }
                Ok(values.index_axis(0, *i))
            }
            Selection::Mask(bits) => {
                if bits.len() != len {
                    return Err(CatalogError::shape_mismatch(
                        format!("mask over {}", property),
                        format!("{} objects", bits.len()),
                        values.shape(),
                    ));
                }
                Ok(values.select(0, &self.indices()))
            }
        }
    }
}

/// Per-object rows into the interpolated-track table; `None` means no track
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackIndex(pub Vec<Option<usize>>);

impl TrackIndex {
    /// From raw reverse-index values, where negative means no track
    pub fn from_raw(raw: &RawArray) -> Result<Self> {
        if raw.ndim() != 1 {
            return Err(CatalogError::shape_mismatch("track index", "1-D", raw.shape()));
        }
        Ok(Self(
            raw.iter()
                .map(|&v| if v.is_finite() && v >= 0.0 { Some(v as usize) } else { None })
                .collect(),
        ))
    }

    /// Index for a single object
    pub fn single(row: Option<usize>) -> Self {
        Self(vec![row])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Number of objects that have a track
    pub fn tracked(&self) -> usize {
        self.0.iter().filter(|r| r.is_some()).count()
    }

    /// Gather track rows; objects without a track read as `NaN`
    fn gather(&self, property: Property, table: &Quantity) -> Result<Quantity> {
        if table.ndim() == 0 {
            return Err(CatalogError::shape_mismatch(property.name(), "[track, ...]", table.shape()));
        }
        let len = table.shape()[0];
        let mut shape = table.shape().to_vec();
        shape[0] = self.len();

        let mut out = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
        for (i, row) in self.0.iter().enumerate() {
            match row {
                Some(r) if *r >= len => {
                    return Err(CatalogError::IndexOutOfBounds { index: *r, len });
                }
                Some(r) => out
                    .index_axis_mut(Axis(0), i)
                    .assign(&table.value().index_axis(Axis(0), *r)),
                None => {}
            }
        }
        let untracked = self.len() - self.tracked();
        if untracked > 0 {
            log::debug!(
                "{} of {} objects have no {} track; reading as undefined",
                untracked,
                self.len(),
                property
            );
        }
        Ok(Quantity::new(out, table.unit()))
    }
}

/// A store restricted to one object or a subset of objects.
///
/// Views hold no data of their own; every read goes through the store and
/// so shares its cache.
#[derive(Debug, Clone)]
pub struct EntityView<'s> {
    store: &'s AttributeStore,
    selection: Selection,
    tracks: Option<TrackIndex>,
}

impl<'s> EntityView<'s> {
    pub fn new(store: &'s AttributeStore, selection: Selection) -> Self {
        Self {
            store,
            selection,
            tracks: None,
        }
    }

    /// Attach the secondary index used for interpolated-track properties
    pub fn with_tracks(mut self, tracks: TrackIndex) -> Self {
        self.tracks = Some(tracks);
        self
    }

    pub fn store(&self) -> &'s AttributeStore {
        self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tracks(&self) -> Option<&TrackIndex> {
        self.tracks.as_ref()
    }

    /// Read a property by catalog name
    pub fn get(&self, name: &str) -> Result<Quantity> {
        self.property(Property::from_name(name)?)
    }

    /// Read a property restricted to the selection.
    ///
    /// Track properties are gathered through the secondary index and fail
    /// with a configuration error when the view has none.
    pub fn property(&self, property: Property) -> Result<Quantity> {
        if property.is_track() {
            let tracks = self.tracks.as_ref().ok_or_else(|| {
                CatalogError::configuration(format!(
                    "secondary index required for interpolated values ({})",
                    property
                ))
            })?;
            if tracks.len() != self.selection.len() {
                return Err(CatalogError::configuration(format!(
                    "secondary index covers {} objects, selection has {}",
                    tracks.len(),
                    self.selection.len()
                )));
            }
            let gathered = tracks.gather(property, &*self.store.property(property)?)?;
            return Ok(match self.selection {
                Selection::Single(_) => gathered.map_value(|v| v.index_axis_move(Axis(0), 0)),
                Selection::Mask(_) => gathered,
            });
        }

        let values = self.store.property(property)?;
        self.selection.apply(property, &values)
    }
}

/// What a satellite-selection function hands back to a [`Host`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatelliteSelection {
    pub mask: Vec<bool>,
    /// Track rows of the selected satellites, when the host has a track
    pub tracks: Option<TrackIndex>,
}

/// Satellites of a host: a masked view
#[derive(Debug, Clone)]
pub struct Sats<'s> {
    view: EntityView<'s>,
}

impl<'s> Sats<'s> {
    pub fn new(store: &'s AttributeStore, mask: Vec<bool>, tracks: Option<TrackIndex>) -> Self {
        let view = EntityView::new(store, Selection::Mask(mask));
        Self {
            view: match tracks {
                Some(tracks) => view.with_tracks(tracks),
                None => view,
            },
        }
    }

    /// Number of satellites
    pub fn count(&self) -> usize {
        self.view.selection.len()
    }

    pub fn mask(&self) -> &[bool] {
        match &self.view.selection {
            Selection::Mask(bits) => bits,
            Selection::Single(_) => &[],
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        self.view.selection.indices()
    }
}

impl<'s> Deref for Sats<'s> {
    type Target = EntityView<'s>;

    fn deref(&self) -> &EntityView<'s> {
        &self.view
    }
}

/// A single host object, optionally with its satellites attached
#[derive(Debug, Clone)]
pub struct Host<'s> {
    view: EntityView<'s>,
    sats: Option<Sats<'s>>,
}

impl<'s> Host<'s> {
    pub fn new(store: &'s AttributeStore, index: usize) -> Self {
        Self {
            view: EntityView::new(store, Selection::Single(index)),
            sats: None,
        }
    }

    /// Attach the host's own track row
    pub fn with_track(mut self, row: Option<usize>) -> Self {
        self.view = self.view.with_tracks(TrackIndex::single(row));
        self
    }

    /// Select satellites with `f` and keep them as a nested view
    pub fn with_satellites<F, E>(mut self, f: F) -> std::result::Result<Self, E>
    where
        F: FnOnce(&Host<'s>) -> std::result::Result<SatelliteSelection, E>,
    {
        let selection = f(&self)?;
        self.sats = Some(Sats::new(self.view.store, selection.mask, selection.tracks));
        Ok(self)
    }

    pub fn index(&self) -> usize {
        match self.view.selection {
            Selection::Single(i) => i,
            Selection::Mask(_) => 0,
        }
    }

    /// Track row of this host, if one was attached
    pub fn track_row(&self) -> Option<usize> {
        self.view.tracks.as_ref().and_then(|t| t.rows().first().copied().flatten())
    }

    pub fn has_track(&self) -> bool {
        self.view.tracks.is_some()
    }

    pub fn sats(&self) -> Option<&Sats<'s>> {
        self.sats.as_ref()
    }
}

impl<'s> Deref for Host<'s> {
    type Target = EntityView<'s>;

    fn deref(&self) -> &EntityView<'s> {
        &self.view
    }
}
