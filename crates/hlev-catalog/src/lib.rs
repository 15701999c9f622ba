//! Lazy, unit-aware access to multi-snapshot simulation catalogs
//!
//! An [`AttributeStore`] mediates every read of a catalog run. Properties are
//! addressed by name (`store.get("M200")`) or by the generated [`Property`]
//! enum, loaded from a [`BackingReader`](hlev_storage::BackingReader) on
//! first access, converted into [`Quantity`](hlev_units::Quantity) values
//! and cached for the lifetime of the store.
//!
//! [`EntityView`], [`Host`] and [`Sats`] restrict a store to one object or a
//! masked subset without copying anything up front.
//!
//! ```rust
//! use std::sync::Arc;
//! use hlev_catalog::{AttributeStore, Host, StoreSettings};
//! use hlev_storage::{MemoryReader, RunId, Source};
//! use ndarray::arr2;
//!
//! let reader = MemoryReader::new()
//!     .with(Source::Properties, "Vmax", arr2(&[[150.0, 180.0], [60.0, 55.0]]).into_dyn());
//! let store = AttributeStore::new(
//!     Arc::new(reader),
//!     StoreSettings::planck13(RunId::new(0), vec![0.5, 0.0]),
//! );
//!
//! let host = Host::new(&store, 0);
//! let vmax = host.get("Vmax").unwrap();
//! assert_eq!(vmax.shape(), &[2]);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod cosmology;
pub mod error;
pub mod property;
pub mod store;
pub mod transform;
pub mod view;

pub use config::{CosmologyConfig, SnapshotConfig, SourceTemplates, StoreConfig};
pub use cosmology::{parse_redshift_label, AgeRedshift, FlatLambdaCdm, SnapshotAxis};
pub use error::{CatalogError, Result};
pub use property::{Namespace, ProperCorrection, Property, PropertySpec};
pub use store::{AttributeStore, StoreSettings, DEFAULT_BOX_LENGTH_MPC, DEFAULT_SNIP_SET};
pub use view::{EntityView, Host, SatelliteSelection, Sats, Selection, TrackIndex};
