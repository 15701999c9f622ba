//! Periodic-box geometry

use hlev_units::{Quantity, Scalar};
use ndarray::{ArrayD, Axis};

use crate::error::{AnalysisError, Result};

/// Wrap offsets into `[-L/2, L/2]` for a periodic box of side `L`.
///
/// Components below `-L/2` gain `L`, then components above `L/2` lose `L`.
pub fn wrap_periodic(offsets: Quantity, box_length: Scalar) -> Result<Quantity> {
    let side = box_length.value_in(offsets.unit())?;
    let half = side / 2.0;
    Ok(offsets.map_value(|mut v| {
        v.mapv_inplace(|x| {
            let x = if x < -half { x + side } else { x };
            if x > half {
                x - side
            } else {
                x
            }
        });
        v
    }))
}

/// Positions relative to `centre` in a periodic box, in the unit of `positions`.
///
/// `centre` broadcasts against `positions`, so a `[3]` centre recentres an
/// `[N, 3]` array and a `[T, 3]` centre recentres an `[N, T, 3]` array.
pub fn recentre(positions: &Quantity, centre: &Quantity, box_length: Scalar) -> Result<Quantity> {
    let offsets = positions.try_sub(centre).map_err(|e| match e {
        hlev_units::UnitError::ShapeMismatch { lhs, rhs } => {
            AnalysisError::shape_mismatch("recentre", &lhs, &rhs)
        }
        other => other.into(),
    })?;
    wrap_periodic(offsets, box_length)
}

/// Sum of squares over the last (component) axis
pub fn squared_norms(offsets: &ArrayD<f64>) -> ArrayD<f64> {
    let last = offsets.ndim().saturating_sub(1);
    offsets.map_axis(Axis(last), |v| v.iter().map(|x| x * x).sum())
}

/// Periodic distances of `[N, T, 3]` positions from a `[T, 3]` host path
pub fn relative_distances(
    positions: &Quantity,
    host: &Quantity,
    box_length: Scalar,
) -> Result<Quantity> {
    let shape = positions.shape();
    if shape.len() != 3 || shape[2] != 3 || host.shape() != &shape[1..] {
        return Err(AnalysisError::shape_mismatch(
            "relative distances",
            shape,
            host.shape(),
        ));
    }
    let offsets = recentre(positions, host, box_length)?;
    let distances = squared_norms(offsets.value()).mapv(f64::sqrt);
    Ok(Quantity::new(distances, offsets.unit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hlev_units::Unit;
    use ndarray::{arr1, arr2, arr3};
    use proptest::prelude::*;

    fn mpc(values: Vec<f64>) -> Quantity {
        Quantity::from_vec(values, Unit::MPC)
    }

    #[test]
    fn test_recentre_wraps_both_ways() {
        let out = recentre(
            &mpc(vec![-51.0, 0.0, 51.0]),
            &mpc(vec![0.0, 0.0, 0.0]),
            Scalar::new(100.0, Unit::MPC),
        )
        .unwrap();
        assert_eq!(out.value(), &arr1(&[49.0, 0.0, -49.0]).into_dyn());
    }

    #[test]
    fn test_recentre_plain_offset() {
        let out = recentre(&mpc(vec![5.0]), &mpc(vec![10.0]), Scalar::new(100.0, Unit::MPC)).unwrap();
        assert_eq!(out.value(), &arr1(&[-5.0]).into_dyn());
    }

    #[test]
    fn test_recentre_across_boundary() {
        let positions = Quantity::new(arr2(&[[99.0, 1.0, 50.0], [2.0, 98.0, 50.0]]).into_dyn(), Unit::MPC);
        let centre = mpc(vec![1.0, 99.0, 50.0]);
        let out = recentre(&positions, &centre, Scalar::new(100.0, Unit::MPC)).unwrap();
        assert_eq!(out.value(), &arr2(&[[-2.0, 2.0, 0.0], [1.0, -1.0, 0.0]]).into_dyn());
    }

    #[test]
    fn test_recentre_converts_units() {
        let out = recentre(
            &Quantity::from_vec(vec![3100.0], Unit::KPC),
            &mpc(vec![0.1]),
            Scalar::new(3.2, Unit::MPC),
        )
        .unwrap();
        assert_eq!(out.unit(), Unit::KPC);
        assert_relative_eq!(out.value()[[0]], -200.0, epsilon = 1e-9);

        let bad = recentre(&mpc(vec![1.0]), &mpc(vec![0.0]), Scalar::new(1.0, Unit::GYR));
        assert!(matches!(bad, Err(AnalysisError::Unit { .. })));
    }

    #[test]
    fn test_recentre_shape_mismatch() {
        let err = recentre(&mpc(vec![1.0, 2.0, 3.0]), &mpc(vec![1.0, 2.0]), Scalar::new(10.0, Unit::MPC))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_relative_distances() {
        let positions = Quantity::new(
            arr3(&[[[3.0, 4.0, 0.0], [0.0, 0.0, 1.0]], [[99.0, 0.0, 0.0], [f64::NAN, 0.0, 0.0]]]).into_dyn(),
            Unit::MPC,
        );
        let host = Quantity::new(arr2(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]).into_dyn(), Unit::MPC);
        let r = relative_distances(&positions, &host, Scalar::new(100.0, Unit::MPC)).unwrap();
        assert_eq!(r.shape(), &[2, 2]);
        assert_relative_eq!(r.value()[[0, 0]], 5.0);
        assert_relative_eq!(r.value()[[0, 1]], 1.0);
        assert_relative_eq!(r.value()[[1, 0]], 1.0);
        assert!(r.value()[[1, 1]].is_nan());

        let wrong = Quantity::new(arr2(&[[0.0, 0.0, 0.0]]).into_dyn(), Unit::MPC);
        assert!(relative_distances(&positions, &wrong, Scalar::new(100.0, Unit::MPC)).is_err());
    }

    proptest! {
        #[test]
        fn prop_recentred_within_half_box(
            x in -100.0f64..100.0,
            c in -50.0f64..50.0,
        ) {
            let out = recentre(&mpc(vec![x]), &mpc(vec![c]), Scalar::new(100.0, Unit::MPC)).unwrap();
            let v = out.value()[[0]];
            prop_assert!(v >= -50.0 && v <= 50.0, "{} escaped the box", v);
            let shift = (x - c - v) / 100.0;
            prop_assert!((shift - shift.round()).abs() < 1e-9);
        }
    }
}
