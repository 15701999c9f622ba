//! Host and satellite membership masks

use hlev_catalog::{AttributeStore, Host, Property, SatelliteSelection, TrackIndex};
use hlev_units::{Quantity, Scalar, Unit};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::geometry::{recentre, squared_norms};

/// Default satellite search radius in units of the host's R200
pub const DEFAULT_RADIUS_FACTOR: f64 = 3.35;

/// Which objects count as hosts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCriteria {
    /// Exclusive lower bound on M200
    pub mass_min: Scalar,
    /// Exclusive upper bound on M200
    pub mass_max: Scalar,
    /// Snapshot to test; negative counts from the end
    pub snapshot: i64,
}

impl Default for HostCriteria {
    fn default() -> Self {
        Self {
            mass_min: Scalar::new(0.0, Unit::MSUN),
            mass_max: Scalar::new(f64::INFINITY, Unit::MSUN),
            snapshot: -1,
        }
    }
}

/// Which objects count as satellites of a host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteCriteria {
    /// Search radius in units of the host's R200
    pub radius_factor: f64,
    pub snapshot: i64,
}

impl Default for SatelliteCriteria {
    fn default() -> Self {
        Self {
            radius_factor: DEFAULT_RADIUS_FACTOR,
            snapshot: -1,
        }
    }
}

/// Optional outputs of a mask computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskOutputs {
    /// Return the indices of set bits
    pub indices: bool,
    /// Return the track row of every index; requires `indices`
    pub tracks: bool,
}

impl MaskOutputs {
    pub const MASK_ONLY: MaskOutputs = MaskOutputs {
        indices: false,
        tracks: false,
    };
    pub const WITH_INDICES: MaskOutputs = MaskOutputs {
        indices: true,
        tracks: false,
    };
    pub const WITH_TRACKS: MaskOutputs = MaskOutputs {
        indices: true,
        tracks: true,
    };

    fn validate(&self) -> Result<()> {
        if self.tracks && !self.indices {
            return Err(AnalysisError::invalid_config(
                "track rows can only be returned together with indices",
            ));
        }
        Ok(())
    }
}

/// A boolean membership mask with its optional derived outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskResult {
    pub mask: Vec<bool>,
    pub indices: Option<Vec<usize>>,
    pub tracks: Option<TrackIndex>,
}

impl MaskResult {
    fn build(store: &AttributeStore, mask: Vec<bool>, outputs: MaskOutputs) -> Result<Self> {
        let indices: Option<Vec<usize>> = outputs.indices.then(|| {
            mask.iter()
                .enumerate()
                .filter_map(|(i, &b)| b.then_some(i))
                .collect()
        });
        let tracks = match (&indices, outputs.tracks) {
            (Some(indices), true) => Some(track_rows(store, indices, mask.len())?),
            _ => None,
        };
        Ok(Self {
            mask,
            indices,
            tracks,
        })
    }

    /// Number of set bits
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&b| b).count()
    }
}

impl From<MaskResult> for SatelliteSelection {
    fn from(result: MaskResult) -> Self {
        SatelliteSelection {
            mask: result.mask,
            tracks: result.tracks,
        }
    }
}

fn track_rows(store: &AttributeStore, indices: &[usize], objects: usize) -> Result<TrackIndex> {
    let reverse = store.property(Property::InterpGalaxyRevIndex)?;
    if reverse.ndim() != 1 || reverse.len() != objects {
        return Err(AnalysisError::shape_mismatch(
            "reverse index",
            reverse.shape(),
            &[objects],
        ));
    }
    let all = TrackIndex::from_raw(reverse.value())?;
    Ok(TrackIndex(indices.iter().map(|&i| all.rows()[i]).collect()))
}

fn flag_set(values: &Quantity) -> impl Iterator<Item = bool> + '_ {
    values.value().iter().map(|&v| v != 0.0)
}

fn one_dimensional(property: Property, values: &Quantity) -> Result<()> {
    if values.ndim() != 1 {
        return Err(AnalysisError::shape_mismatch(
            format!("{} at one snapshot", property),
            values.shape(),
            &[values.len()],
        ));
    }
    Ok(())
}

/// Central, uncontaminated objects with `mass_min < M200 < mass_max`.
///
/// Undefined masses fail both bounds, so objects without a valid M200 are
/// never hosts.
pub fn host_mask(store: &AttributeStore, criteria: &HostCriteria, outputs: MaskOutputs) -> Result<MaskResult> {
    outputs.validate()?;

    let sat_flag = store.at_snapshot(Property::SatFlag, criteria.snapshot)?;
    let cont_flag = store.at_snapshot(Property::ContFlag, criteria.snapshot)?;
    let m200 = store.at_snapshot(Property::M200, criteria.snapshot)?;
    for (property, values) in [
        (Property::SatFlag, &sat_flag),
        (Property::ContFlag, &cont_flag),
        (Property::M200, &m200),
    ] {
        one_dimensional(property, values)?;
    }
    if sat_flag.len() != m200.len() || cont_flag.len() != m200.len() {
        return Err(AnalysisError::shape_mismatch("host flags", sat_flag.shape(), m200.shape()));
    }

    let above = m200.gt(criteria.mass_min)?;
    let below = m200.lt(criteria.mass_max)?;

    let mask: Vec<bool> = flag_set(&sat_flag)
        .zip(flag_set(&cont_flag))
        .zip(above.iter().zip(below.iter()))
        .map(|((sat, cont), (&gt, &lt))| !sat && !cont && gt && lt)
        .collect();

    log::debug!(
        "host mask at snapshot {}: {} of {} objects",
        criteria.snapshot,
        mask.iter().filter(|&&b| b).count(),
        mask.len()
    );
    MaskResult::build(store, mask, outputs)
}

/// Objects within `radius_factor × R200` of `host`, excluding the host itself.
///
/// Positions are recentred on the host in the store's periodic box, filtered
/// by a cube of half-width `radius_factor × R200` and refined to a sphere.
pub fn sat_mask(
    store: &AttributeStore,
    host: &Host<'_>,
    criteria: &SatelliteCriteria,
    outputs: MaskOutputs,
) -> Result<MaskResult> {
    outputs.validate()?;

    let snap = store.snapshots().resolve(criteria.snapshot)?;
    let positions = store.at_snapshot(Property::Centre, criteria.snapshot)?;
    let host_path = host.property(Property::Centre)?;
    let host_r200 = host.property(Property::R200)?;
    if host_path.ndim() != 2 || host_path.shape()[0] <= snap || host_r200.ndim() != 1 {
        return Err(AnalysisError::shape_mismatch(
            "host position",
            host_path.shape(),
            host_r200.shape(),
        ));
    }
    let host_centre = host_path.index_axis(0, snap);
    let r200 = host_r200
        .scalar_at(&[snap])
        .unwrap_or_else(|| Scalar::undefined(host_r200.unit()));

    let offsets = recentre(&positions, &host_centre, store.box_length())?;
    let cut = (r200 * criteria.radius_factor).value_in(offsets.unit())?;

    let inside_cube = offsets
        .value()
        .map_axis(ndarray::Axis(offsets.ndim() - 1), |v| v.iter().all(|x| x.abs() < cut));
    let r2 = squared_norms(offsets.value());

    let mut mask: Vec<bool> = inside_cube
        .iter()
        .zip(r2.iter())
        .map(|(&cube, &r2)| cube && r2 < cut * cut)
        .collect();
    if let Some(own) = mask.get_mut(host.index()) {
        *own = false;
    }

    log::debug!(
        "satellite mask of host {} at snapshot {}: {} within {:.3} {}",
        host.index(),
        snap,
        mask.iter().filter(|&&b| b).count(),
        cut,
        offsets.unit()
    );
    MaskResult::build(store, mask, outputs)
}

/// Satellite-selection function for [`Host::with_satellites`].
///
/// Track rows are returned exactly when the host has a track index attached.
pub fn satellite_selector<'a>(
    store: &'a AttributeStore,
    criteria: SatelliteCriteria,
) -> impl FnOnce(&Host<'_>) -> Result<SatelliteSelection> + 'a {
    move |host| {
        let outputs = if host.has_track() {
            MaskOutputs::WITH_TRACKS
        } else {
            MaskOutputs::WITH_INDICES
        };
        sat_mask(store, host, &criteria, outputs).map(Into::into)
    }
}
