//! Unit-tagged quantities for simulation catalogs.
//!
//! [`Unit`] is a closed set of astrophysical units (masses in `Msun`,
//! lengths in `Mpc`/`kpc`, times in `Gyr`, ...). [`Quantity`] pairs an
//! `ndarray` magnitude with a unit, and [`Scalar`] does the same for a single
//! value. Undefined values are `NaN`.

pub mod error;
pub mod quantity;
pub mod unit;

pub use error::{Result, UnitError};
pub use quantity::{Quantity, Scalar};
pub use unit::{Dimensions, Unit, GYR_S, KPC_M, MPC_M, SOLAR_MASS_KG, YEAR_S};
