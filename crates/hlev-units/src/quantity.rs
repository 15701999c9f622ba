use ndarray::{Array1, ArrayD, Axis, IxDyn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul, Neg};

use crate::error::{Result, UnitError};
use crate::unit::Unit;

/// A single value with a unit; used for thresholds, bounds and box sizes.
///
/// `NaN` is the "undefined" value and compares false against everything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    pub value: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Scalar {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Unit::DIMENSIONLESS)
    }

    /// The undefined value in `unit`
    pub fn undefined(unit: Unit) -> Self {
        Self::new(f64::NAN, unit)
    }

    pub fn is_undefined(&self) -> bool {
        self.value.is_nan()
    }

    /// Express this scalar in another unit
    pub fn to(&self, unit: Unit) -> Result<Scalar> {
        Ok(Scalar::new(self.value_in(unit)?, unit))
    }

    /// Raw value expressed in `unit`
    pub fn value_in(&self, unit: Unit) -> Result<f64> {
        Ok(self.value * self.unit.conversion_factor(unit)?)
    }
}

impl Mul<f64> for Scalar {
    type Output = Scalar;

    fn mul(self, rhs: f64) -> Scalar {
        Scalar::new(self.value * rhs, self.unit)
    }
}

/// Allow f64 * Scalar (commutative multiplication)
impl Mul<Scalar> for f64 {
    type Output = Scalar;

    fn mul(self, rhs: Scalar) -> Scalar {
        rhs * self
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_dimensionless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

/// A numeric array tagged with a physical unit.
///
/// The magnitude is an `f64` array of any rank; `NaN` entries mark undefined
/// values and propagate through every operation. Arithmetic between
/// quantities converts the right-hand side into the left-hand unit first and
/// fails for incompatible units instead of silently mixing them.
///
/// # Examples
///
/// ```rust
/// use hlev_units::{Quantity, Unit};
///
/// let r = Quantity::from_vec(vec![1.0, 2.0], Unit::MPC);
/// let kpc = r.to(Unit::KPC).unwrap();
/// assert_eq!(kpc.value().as_slice().unwrap(), &[1000.0, 2000.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    value: ArrayD<f64>,
    unit: Unit,
}

impl Quantity {
    pub fn new(value: ArrayD<f64>, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn dimensionless(value: ArrayD<f64>) -> Self {
        Self::new(value, Unit::DIMENSIONLESS)
    }

    /// One-dimensional quantity from a vector
    pub fn from_vec(values: Vec<f64>, unit: Unit) -> Self {
        Self::new(Array1::from(values).into_dyn(), unit)
    }

    /// Quantity of the given shape filled with the undefined value
    pub fn undefined(shape: &[usize], unit: Unit) -> Self {
        Self::new(ArrayD::from_elem(IxDyn(shape), f64::NAN), unit)
    }

    pub fn value(&self) -> &ArrayD<f64> {
        &self.value
    }

    pub fn into_value(self) -> ArrayD<f64> {
        self.value
    }

    pub fn into_parts(self) -> (ArrayD<f64>, Unit) {
        (self.value, self.unit)
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    pub fn ndim(&self) -> usize {
        self.value.ndim()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Number of elements that are not undefined
    pub fn count_defined(&self) -> usize {
        self.value.iter().filter(|v| !v.is_nan()).count()
    }

    /// Convert to another unit
    pub fn to(&self, unit: Unit) -> Result<Quantity> {
        Ok(Quantity::new(self.value_in(unit)?, unit))
    }

    /// Magnitude expressed in `unit`
    pub fn value_in(&self, unit: Unit) -> Result<ArrayD<f64>> {
        let factor = self.unit.conversion_factor(unit)?;
        if factor == 1.0 {
            Ok(self.value.clone())
        } else {
            Ok(self.value.mapv(|v| v * factor))
        }
    }

    /// Apply a unit-preserving transformation to the magnitude
    pub fn map_value<F>(self, f: F) -> Quantity
    where
        F: FnOnce(ArrayD<f64>) -> ArrayD<f64>,
    {
        Quantity::new(f(self.value), self.unit)
    }

    /// Sub-array at `index` along `axis`, dropping that axis
    pub fn index_axis(&self, axis: usize, index: usize) -> Quantity {
        Quantity::new(self.value.index_axis(Axis(axis), index).to_owned(), self.unit)
    }

    /// Gather `indices` along `axis`
    pub fn select(&self, axis: usize, indices: &[usize]) -> Quantity {
        Quantity::new(self.value.select(Axis(axis), indices), self.unit)
    }

    /// Element at `index` as a scalar
    pub fn scalar_at(&self, index: &[usize]) -> Option<Scalar> {
        self.value.get(index).map(|&v| Scalar::new(v, self.unit))
    }

    /// Elementwise sum, converting `rhs` into this unit. `rhs` may broadcast.
    pub fn try_add(&self, rhs: &Quantity) -> Result<Quantity> {
        self.zip_with(rhs, |a, b| a + b)
    }

    /// Elementwise difference, converting `rhs` into this unit. `rhs` may broadcast.
    pub fn try_sub(&self, rhs: &Quantity) -> Result<Quantity> {
        self.zip_with(rhs, |a, b| a - b)
    }

    /// Elementwise `self < threshold`; undefined entries compare false.
    pub fn lt(&self, threshold: Scalar) -> Result<ArrayD<bool>> {
        let cut = threshold.value_in(self.unit)?;
        Ok(self.value.mapv(|v| v < cut))
    }

    /// Elementwise `self > threshold`; undefined entries compare false.
    pub fn gt(&self, threshold: Scalar) -> Result<ArrayD<bool>> {
        let cut = threshold.value_in(self.unit)?;
        Ok(self.value.mapv(|v| v > cut))
    }

    fn zip_with<F>(&self, rhs: &Quantity, f: F) -> Result<Quantity>
    where
        F: Fn(f64, f64) -> f64,
    {
        let rhs_value = rhs.value_in(self.unit)?;
        let broadcast = rhs_value
            .broadcast(self.value.raw_dim())
            .ok_or_else(|| UnitError::ShapeMismatch {
                lhs: self.shape().to_vec(),
                rhs: rhs.shape().to_vec(),
            })?;

        let mut out = self.value.clone();
        out.zip_mut_with(&broadcast, |a, &b| *a = f(*a, b));
        Ok(Quantity::new(out, self.unit))
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        self.map_value(|v| v * rhs)
    }
}

impl Mul<f64> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(&self.value * rhs, self.unit)
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        self.map_value(|v| v / rhs)
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        self.map_value(|v| -v)
    }
}
