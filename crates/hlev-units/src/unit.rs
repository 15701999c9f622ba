use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, UnitError};

/// Solar mass in kilograms
pub const SOLAR_MASS_KG: f64 = 1.988409870698051e30;
/// Megaparsec in metres
pub const MPC_M: f64 = 3.0856775814913673e22;
/// Kiloparsec in metres
pub const KPC_M: f64 = 3.0856775814913673e19;
/// Julian year in seconds
pub const YEAR_S: f64 = 3.15576e7;
/// Gigayear (Julian) in seconds
pub const GYR_S: f64 = 3.15576e16;

/// Exponents of mass, length and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub mass: i8,
    pub length: i8,
    pub time: i8,
}

impl Dimensions {
    pub const NONE: Dimensions = Dimensions::new(0, 0, 0);
    pub const MASS: Dimensions = Dimensions::new(1, 0, 0);
    pub const LENGTH: Dimensions = Dimensions::new(0, 1, 0);
    pub const TIME: Dimensions = Dimensions::new(0, 0, 1);
    pub const VELOCITY: Dimensions = Dimensions::new(0, 1, -1);
    pub const MASS_RATE: Dimensions = Dimensions::new(1, 0, -1);

    pub const fn new(mass: i8, length: i8, time: i8) -> Self {
        Self { mass, length, time }
    }
}

/// A physical unit: dimensions plus a fixed factor to SI base units.
///
/// Units with equal dimensions are compatible and convert by the ratio of
/// their factors. The set of units is closed; catalogs only ever carry the
/// ones listed in [`Unit::KNOWN`].
///
/// # Examples
///
/// ```rust
/// use hlev_units::Unit;
///
/// let factor = Unit::MPC.conversion_factor(Unit::KPC).unwrap();
/// assert!((factor - 1000.0).abs() < 1e-9);
/// assert!(Unit::MPC.conversion_factor(Unit::MSUN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    // Deserialization goes through `try_from`; skipping keeps serde from
    // requiring a `'static` borrow for this field.
    #[serde(skip_deserializing)]
    symbol: &'static str,
    dims: Dimensions,
    scale: f64,
}

impl Unit {
    pub const DIMENSIONLESS: Unit = Unit::new("", Dimensions::NONE, 1.0);
    pub const MSUN: Unit = Unit::new("Msun", Dimensions::MASS, SOLAR_MASS_KG);
    pub const MPC: Unit = Unit::new("Mpc", Dimensions::LENGTH, MPC_M);
    pub const KPC: Unit = Unit::new("kpc", Dimensions::LENGTH, KPC_M);
    pub const KM: Unit = Unit::new("km", Dimensions::LENGTH, 1.0e3);
    pub const S: Unit = Unit::new("s", Dimensions::TIME, 1.0);
    pub const YR: Unit = Unit::new("yr", Dimensions::TIME, YEAR_S);
    pub const GYR: Unit = Unit::new("Gyr", Dimensions::TIME, GYR_S);
    pub const KM_PER_S: Unit = Unit::new("km/s", Dimensions::VELOCITY, 1.0e3);
    pub const MSUN_PER_YR: Unit =
        Unit::new("Msun/yr", Dimensions::MASS_RATE, SOLAR_MASS_KG / YEAR_S);

    /// Every unit that can be named by symbol
    pub const KNOWN: [Unit; 10] = [
        Unit::DIMENSIONLESS,
        Unit::MSUN,
        Unit::MPC,
        Unit::KPC,
        Unit::KM,
        Unit::S,
        Unit::YR,
        Unit::GYR,
        Unit::KM_PER_S,
        Unit::MSUN_PER_YR,
    ];

    const fn new(symbol: &'static str, dims: Dimensions, scale: f64) -> Self {
        Self {
            symbol,
            dims,
            scale,
        }
    }

    /// Look a unit up by its symbol. `"dimensionless"` names the empty unit.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        if symbol == "dimensionless" {
            return Ok(Unit::DIMENSIONLESS);
        }
        Unit::KNOWN
            .iter()
            .find(|u| u.symbol == symbol)
            .copied()
            .ok_or_else(|| UnitError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Factor from this unit to SI base units
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dims == Dimensions::NONE
    }

    pub fn is_compatible(&self, other: Unit) -> bool {
        self.dims == other.dims
    }

    /// Multiply a value in `self` by this factor to express it in `to`.
    pub fn conversion_factor(&self, to: Unit) -> Result<f64> {
        if !self.is_compatible(to) {
            return Err(UnitError::Incompatible {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        if self.scale == to.scale {
            Ok(1.0)
        } else {
            Ok(self.scale / to.scale)
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::DIMENSIONLESS
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_empty() {
            f.write_str("dimensionless")
        } else {
            f.write_str(self.symbol)
        }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self> {
        Unit::from_symbol(s.trim())
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> String {
        unit.symbol.to_string()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_conversion_factors() {
        assert_relative_eq!(Unit::MPC.conversion_factor(Unit::KPC).unwrap(), 1000.0);
        assert_relative_eq!(Unit::GYR.conversion_factor(Unit::YR).unwrap(), 1.0e9);
        assert_relative_eq!(Unit::KM.conversion_factor(Unit::MPC).unwrap(), 1.0e3 / MPC_M);
        assert_eq!(Unit::MSUN.conversion_factor(Unit::MSUN).unwrap(), 1.0);
    }

    #[test]
    fn test_incompatible_units() {
        let err = Unit::MPC.conversion_factor(Unit::GYR).unwrap_err();
        assert_eq!(
            err,
            UnitError::Incompatible {
                from: "Mpc".into(),
                to: "Gyr".into()
            }
        );
        assert!(!Unit::KM_PER_S.is_compatible(Unit::KM));
        assert!(Unit::MSUN_PER_YR.is_compatible(Unit::MSUN_PER_YR));
    }

    #[test]
    fn test_symbols() {
        for unit in Unit::KNOWN {
            assert_eq!(Unit::from_symbol(unit.symbol()).unwrap(), unit);
        }
        assert_eq!("dimensionless".parse::<Unit>().unwrap(), Unit::DIMENSIONLESS);
        assert_eq!(" km/s ".parse::<Unit>().unwrap(), Unit::KM_PER_S);
        assert!("parsec".parse::<Unit>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Unit::MSUN_PER_YR.to_string(), "Msun/yr");
        assert_eq!(Unit::DIMENSIONLESS.to_string(), "dimensionless");
    }

    #[test]
    fn test_serde_by_symbol() {
        let json = serde_json::to_string(&Unit::MPC).unwrap();
        assert_eq!(json, "\"Mpc\"");
        let back: Unit = serde_json::from_str("\"Gyr\"").unwrap();
        assert_eq!(back, Unit::GYR);
        assert!(serde_json::from_str::<Unit>("\"lightyear\"").is_err());
    }
}
