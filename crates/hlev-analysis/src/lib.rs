//! Host/satellite selection and orbit analysis over catalog runs
//!
//! * [`geometry`]: periodic recentring and host-relative distances
//! * [`masks`]: host and satellite membership masks
//! * [`orbits`]: pericenters, first pericenter and first infall
//!
//! Everything here reads through an [`AttributeStore`](hlev_catalog::AttributeStore)
//! and keeps the units of its inputs.

#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod masks;
pub mod orbits;

pub use error::{AnalysisError, Result};
pub use geometry::{recentre, relative_distances, squared_norms, wrap_periodic};
pub use masks::{
    host_mask, sat_mask, satellite_selector, HostCriteria, MaskOutputs, MaskResult,
    SatelliteCriteria, DEFAULT_RADIUS_FACTOR,
};
pub use orbits::{
    find_pericenters, first_infall_time, first_pericenter, summarize, FirstPericenter,
    OrbitSummary,
};
