//! Age/redshift conversion and the snapshot time axis

use hlev_units::{Quantity, Scalar, Unit};

use crate::error::{CatalogError, Result};

/// Hubble time in Gyr for H0 = 1 km/s/Mpc
const HUBBLE_TIME_GYR: f64 = 977.792_221_680_789_1;

/// Conversion between cosmic age and redshift.
///
/// Implementations work in Gyr; undefined inputs (`NaN`, non-positive ages)
/// yield `NaN` rather than an error so that missing samples propagate.
pub trait AgeRedshift: Send + Sync {
    /// Age of the universe at redshift `z`, in Gyr
    fn age_at_redshift(&self, z: f64) -> f64;

    /// Redshift at which the universe had the given age in Gyr
    fn redshift_at_age(&self, age_gyr: f64) -> f64;

    /// [`AgeRedshift::redshift_at_age`] for a unit-tagged age
    fn redshift_at(&self, age: Scalar) -> Result<f64> {
        Ok(self.redshift_at_age(age.value_in(Unit::GYR)?))
    }

    /// Scale factor `1/(1+z)` at the given age in Gyr
    fn scale_at_age(&self, age_gyr: f64) -> f64 {
        1.0 / (1.0 + self.redshift_at_age(age_gyr))
    }
}

/// Flat ΛCDM without radiation, with closed-form age and inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatLambdaCdm {
    /// Hubble constant in km/s/Mpc
    pub h0: f64,
    /// Matter density parameter today
    pub omega_m: f64,
}

impl FlatLambdaCdm {
    /// Planck 2013 parameters
    pub const PLANCK13: FlatLambdaCdm = FlatLambdaCdm {
        h0: 67.77,
        omega_m: 0.30712,
    };

    pub fn new(h0: f64, omega_m: f64) -> Result<Self> {
        if h0.is_nan() || h0 <= 0.0 {
            return Err(CatalogError::configuration(format!(
                "Hubble constant must be positive, got {}",
                h0
            )));
        }
        if omega_m.is_nan() || omega_m <= 0.0 || omega_m >= 1.0 {
            return Err(CatalogError::configuration(format!(
                "omega_m must lie in (0, 1) for a flat universe, got {}",
                omega_m
            )));
        }
        Ok(Self { h0, omega_m })
    }

    pub fn omega_lambda(&self) -> f64 {
        1.0 - self.omega_m
    }

    /// Hubble time 1/H0 in Gyr
    pub fn hubble_time(&self) -> f64 {
        HUBBLE_TIME_GYR / self.h0
    }
}

impl Default for FlatLambdaCdm {
    fn default() -> Self {
        Self::PLANCK13
    }
}

impl AgeRedshift for FlatLambdaCdm {
    fn age_at_redshift(&self, z: f64) -> f64 {
        if z.is_nan() || z <= -1.0 {
            return f64::NAN;
        }
        let ol = self.omega_lambda();
        let x = (ol / self.omega_m).sqrt() * (1.0 + z).powf(-1.5);
        self.hubble_time() * 2.0 / (3.0 * ol.sqrt()) * x.asinh()
    }

    fn redshift_at_age(&self, age_gyr: f64) -> f64 {
        if !age_gyr.is_finite() || age_gyr <= 0.0 {
            return f64::NAN;
        }
        let ol = self.omega_lambda();
        let s = (1.5 * ol.sqrt() * age_gyr / self.hubble_time()).sinh();
        ((self.omega_m / ol).sqrt() * s).powf(-2.0 / 3.0) - 1.0
    }
}

/// Redshift, scale factor and age of every snapshot in a run.
///
/// Built once at configuration time and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotAxis {
    redshifts: Vec<f64>,
    scales: Vec<f64>,
    ages: Vec<f64>,
}

impl SnapshotAxis {
    /// Axis from snapshot redshifts in file order
    pub fn from_redshifts(redshifts: Vec<f64>, cosmology: &dyn AgeRedshift) -> Self {
        let scales = redshifts.iter().map(|z| 1.0 / (1.0 + z)).collect();
        let ages = redshifts
            .iter()
            .map(|&z| cosmology.age_at_redshift(z))
            .collect();
        Self {
            redshifts,
            scales,
            ages,
        }
    }

    /// Axis from snapshot labels such as `029_z000p000`
    pub fn from_labels<S: AsRef<str>>(labels: &[S], cosmology: &dyn AgeRedshift) -> Result<Self> {
        let redshifts = labels
            .iter()
            .map(|l| parse_redshift_label(l.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_redshifts(redshifts, cosmology))
    }

    pub fn len(&self) -> usize {
        self.redshifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.redshifts.is_empty()
    }

    pub fn redshifts(&self) -> &[f64] {
        &self.redshifts
    }

    /// Scale factors `1/(1+z)`
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Ages in Gyr
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Snapshot ages as a quantity
    pub fn times(&self) -> Quantity {
        Quantity::from_vec(self.ages.clone(), Unit::GYR)
    }

    /// Resolve a possibly negative snapshot index; `-1` is the last snapshot.
    pub fn resolve(&self, index: i64) -> Result<usize> {
        let count = self.len();
        let resolved = if index < 0 {
            count as i64 + index
        } else {
            index
        };
        if resolved < 0 || resolved >= count as i64 {
            return Err(CatalogError::SnapshotOutOfRange { index, count });
        }
        Ok(resolved as usize)
    }
}

/// Parse the redshift out of a snapshot label: `z002p012` → 2.012.
pub fn parse_redshift_label(label: &str) -> Result<f64> {
    let invalid = || CatalogError::InvalidRedshiftLabel {
        label: label.to_string(),
    };

    let tail = label.rsplit('z').next().ok_or_else(invalid)?;
    if tail.len() == label.len() {
        return Err(invalid());
    }
    let (whole, frac) = tail.split_once('p').ok_or_else(invalid)?;
    if whole.is_empty()
        || frac.is_empty()
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: f64 = whole.parse().map_err(|_| invalid())?;
    let frac_value: f64 = frac.parse().map_err(|_| invalid())?;
    Ok(whole + frac_value * 10f64.powi(-(frac.len() as i32)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planck13_age_today() {
        let age = FlatLambdaCdm::PLANCK13.age_at_redshift(0.0);
        assert!((age - 13.8).abs() < 0.1, "age today {}", age);
    }

    #[test]
    fn test_age_redshift_inverse() {
        let cosmo = FlatLambdaCdm::default();
        for z in [0.0, 0.101, 0.5, 1.0, 2.012, 6.0, 20.0] {
            let age = cosmo.age_at_redshift(z);
            assert_relative_eq!(cosmo.redshift_at_age(age), z, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_age_decreases_with_redshift() {
        let cosmo = FlatLambdaCdm::default();
        assert!(cosmo.age_at_redshift(1.0) < cosmo.age_at_redshift(0.5));
        assert!(cosmo.scale_at_age(13.0) > cosmo.scale_at_age(3.0));
    }

    #[test]
    fn test_undefined_inputs() {
        let cosmo = FlatLambdaCdm::default();
        assert!(cosmo.redshift_at_age(f64::NAN).is_nan());
        assert!(cosmo.redshift_at_age(0.0).is_nan());
        assert!(cosmo.redshift_at_age(-1.0).is_nan());
        assert!(cosmo.age_at_redshift(f64::NAN).is_nan());
    }

    #[test]
    fn test_unit_tagged_age() {
        let cosmo = FlatLambdaCdm::default();
        let z = cosmo.redshift_at(Scalar::new(5.0e9, Unit::YR)).unwrap();
        assert_relative_eq!(z, cosmo.redshift_at_age(5.0), max_relative = 1e-12);
        assert!(cosmo.redshift_at(Scalar::new(1.0, Unit::MPC)).is_err());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(FlatLambdaCdm::new(0.0, 0.3).is_err());
        assert!(FlatLambdaCdm::new(70.0, 1.2).is_err());
        assert!(FlatLambdaCdm::new(70.0, 0.3).is_ok());
    }

    #[test]
    fn test_parse_labels() {
        assert_relative_eq!(parse_redshift_label("029_z000p000").unwrap(), 0.0);
        assert_relative_eq!(parse_redshift_label("028_z000p101").unwrap(), 0.101);
        assert_relative_eq!(parse_redshift_label("z002p012").unwrap(), 2.012);
        assert_relative_eq!(parse_redshift_label("000_z020p000").unwrap(), 20.0);

        for bad in ["029", "z000", "z0p", "zxp001", "029_z000p00a"] {
            assert!(
                matches!(parse_redshift_label(bad), Err(CatalogError::InvalidRedshiftLabel { .. })),
                "{} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_snapshot_axis() {
        let cosmo = FlatLambdaCdm::default();
        let axis = SnapshotAxis::from_labels(&["026_z000p503", "027_z000p366", "029_z000p000"], &cosmo)
            .unwrap();
        assert_eq!(axis.len(), 3);
        assert_relative_eq!(axis.scales()[2], 1.0);
        assert_relative_eq!(axis.scales()[0], 1.0 / 1.503);
        assert!(axis.ages()[0] < axis.ages()[1]);
        assert_eq!(axis.times().unit(), Unit::GYR);
    }

    #[test]
    fn test_resolve_negative_index() {
        let axis = SnapshotAxis::from_redshifts(vec![2.0, 1.0, 0.0], &FlatLambdaCdm::default());
        assert_eq!(axis.resolve(-1).unwrap(), 2);
        assert_eq!(axis.resolve(-3).unwrap(), 0);
        assert_eq!(axis.resolve(1).unwrap(), 1);
        assert!(matches!(
            axis.resolve(-4),
            Err(CatalogError::SnapshotOutOfRange { index: -4, count: 3 })
        ));
        assert!(axis.resolve(3).is_err());
    }
}
