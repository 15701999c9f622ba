//! Static property catalog
//!
//! Every name a catalog run can be asked for is declared once in the table
//! below, together with where it lives on disk and how its raw values are
//! turned into a [`Quantity`](hlev_units::Quantity).

use hlev_storage::Source;
use hlev_units::Unit;
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

/// The four disjoint groups a property can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Per-object, per-snapshot scalars
    Scalar,
    /// Per-object, per-snapshot vectors
    Positional,
    /// Densely time-sampled paths, assembled from per-snip arrays
    Snip,
    /// Interpolated tracks, reached only through a reverse index
    Track,
}

impl Namespace {
    /// Backing table the namespace is read from
    pub const fn source(&self) -> Source {
        match self {
            Namespace::Scalar => Source::Properties,
            Namespace::Positional => Source::Positions,
            Namespace::Snip => Source::SnipPaths,
            Namespace::Track => Source::Tracks,
        }
    }

    /// Prefix the property name carries but the on-disk key does not
    pub const fn prefix(&self) -> &'static str {
        match self {
            Namespace::Scalar | Namespace::Positional => "",
            Namespace::Snip => "snip",
            Namespace::Track => "interp",
        }
    }
}

/// How comoving values are turned into proper ones on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProperCorrection {
    /// Stored as proper values already
    None,
    /// Divide by the scale factor of each snapshot
    SnapshotAxis,
    /// Divide by the scale factor at each interpolation time of the track
    TrackTimes,
}

/// Load-time metadata of one property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub namespace: Namespace,
    /// `None` means dimensionless
    pub unit: Option<Unit>,
    /// Raw values are `log10` of the physical value
    pub log_stored: bool,
    /// Raw value meaning "no measurement"
    pub sentinel: Option<f64>,
    pub proper: ProperCorrection,
}

macro_rules! property_table {
    ($(
        $(#[$attr:meta])*
        $variant:ident = $name:literal => $ns:ident {
            unit: $unit:expr,
            log: $log:expr,
            sentinel: $sentinel:expr,
            proper: $proper:ident $(,)?
        }
    ),* $(,)?) => {
        /// A declared catalog property
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Property {
            $( $(#[$attr])* $variant, )*
        }

        impl Property {
            /// Every declared property, in table order
            pub const ALL: &'static [Property] = &[ $( Property::$variant, )* ];

            const SPECS: &'static [PropertySpec] = &[ $(
                PropertySpec {
                    name: $name,
                    namespace: Namespace::$ns,
                    unit: $unit,
                    log_stored: $log,
                    sentinel: $sentinel,
                    proper: ProperCorrection::$proper,
                },
            )* ];
        }
    };
}

property_table! {
    /// Central galaxy flag
    CenGal = "CenGal" => Scalar { unit: None, log: false, sentinel: None, proper: None },
    /// Contamination flag
    ContFlag = "ContFlag" => Scalar { unit: None, log: false, sentinel: None, proper: None },
    /// Satellite flag
    SatFlag = "SatFlag" => Scalar { unit: None, log: false, sentinel: None, proper: None },
    Shi = "SHI" => Scalar { unit: None, log: false, sentinel: None, proper: None },
    M200 = "M200" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    Mbh = "MBH" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    Mdm = "MDM" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    MGas = "MGas" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    Mgas30kpc = "Mgas30kpc" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    Mstar = "Mstar" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    Mstar30kpc = "Mstar30kpc" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    MstarInit = "MstarInit" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    Msub = "Msub" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    Mhi = "MHI" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    MHneutral = "MHneutral" => Scalar { unit: Some(Unit::MSUN), log: true, sentinel: Some(-1.0), proper: None },
    R200 = "R200" => Scalar { unit: Some(Unit::MPC), log: false, sentinel: None, proper: SnapshotAxis },
    StellarHalfMassRad = "StellarHalfMassRad" => Scalar { unit: Some(Unit::MPC), log: false, sentinel: None, proper: SnapshotAxis },
    Sfr = "SFR" => Scalar { unit: Some(Unit::MSUN_PER_YR), log: true, sentinel: None, proper: None },
    Vmax = "Vmax" => Scalar { unit: Some(Unit::KM_PER_S), log: false, sentinel: None, proper: None },
    VmaxRadius = "VmaxRadius" => Scalar { unit: Some(Unit::MPC), log: false, sentinel: None, proper: None },

    Centre = "Centre" => Positional { unit: Some(Unit::MPC), log: false, sentinel: None, proper: SnapshotAxis },
    Velocity = "Velocity" => Positional { unit: Some(Unit::KM_PER_S), log: false, sentinel: None, proper: None },

    SnipCoordinateDispersion = "snipCoordinateDispersion" => Snip { unit: Some(Unit::MPC), log: false, sentinel: None, proper: None },
    SnipCoordinates = "snipCoordinates" => Snip { unit: Some(Unit::MPC), log: false, sentinel: None, proper: None },
    SnipVelocity = "snipVelocity" => Snip { unit: Some(Unit::KM_PER_S), log: false, sentinel: None, proper: None },
    SnipVelocityDispersion = "snipVelocityDispersion" => Snip { unit: Some(Unit::KM_PER_S), log: false, sentinel: None, proper: None },

    InterpGalaxy = "interpGalaxy" => Track { unit: None, log: false, sentinel: None, proper: None },
    /// Per-object row into the track table; negative means no track
    InterpGalaxyRevIndex = "interpGalaxyRevIndex" => Track { unit: None, log: false, sentinel: None, proper: None },
    InterpInterpolatedPositions = "interpInterpolatedPositions" => Track { unit: Some(Unit::MPC), log: false, sentinel: None, proper: TrackTimes },
    InterpInterpolationTimes = "interpInterpolationTimes" => Track { unit: Some(Unit::GYR), log: false, sentinel: None, proper: None },
}

impl Property {
    pub fn spec(&self) -> &'static PropertySpec {
        &Self::SPECS[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn namespace(&self) -> Namespace {
        self.spec().namespace
    }

    /// Unit attached on load
    pub fn unit(&self) -> Unit {
        self.spec().unit.unwrap_or(Unit::DIMENSIONLESS)
    }

    pub fn is_track(&self) -> bool {
        self.namespace() == Namespace::Track
    }

    /// Key in the backing table, with the namespace prefix stripped
    pub fn disk_key(&self) -> &'static str {
        let spec = self.spec();
        &spec.name[spec.namespace.prefix().len()..]
    }

    /// Look a property up by its catalog name
    pub fn from_name(name: &str) -> Result<Property> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or_else(|| CatalogError::name_not_found(name))
    }

    /// Properties of one namespace, in table order
    pub fn in_namespace(namespace: Namespace) -> impl Iterator<Item = Property> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |p| p.namespace() == namespace)
    }

    /// Scalar and positional properties; what a full load materializes
    pub fn declared_keys() -> impl Iterator<Item = Property> {
        Self::ALL
            .iter()
            .copied()
            .filter(|p| matches!(p.namespace(), Namespace::Scalar | Namespace::Positional))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Property::from_name(s)
    }
}
