//! Load-time transformations from raw backing arrays to quantities

use hlev_storage::RawArray;
use hlev_units::{Quantity, Unit};
use ndarray::{concatenate, ArrayView, Axis, IxDyn};

use crate::cosmology::AgeRedshift;
use crate::error::{CatalogError, Result};
use crate::property::PropertySpec;

/// Replace every occurrence of `sentinel` with `NaN`
pub fn replace_sentinel(raw: &mut RawArray, sentinel: f64) {
    raw.mapv_inplace(|v| if v == sentinel { f64::NAN } else { v });
}

/// Sentinel replacement, `10^x` for log-stored values, then unit attachment
pub fn format_raw(mut raw: RawArray, spec: &PropertySpec) -> Quantity {
    if let Some(sentinel) = spec.sentinel {
        replace_sentinel(&mut raw, sentinel);
    }
    if spec.log_stored {
        raw.mapv_inplace(|v| 10f64.powf(v));
    }
    Quantity::new(raw, spec.unit.unwrap_or(Unit::DIMENSIONLESS))
}

/// Divide by the scale factors along the time axis.
///
/// The time axis is the first axis after the object axis whose length equals
/// `scales.len()`; a 1-D array is divided along axis 0.
pub fn to_proper(quantity: Quantity, scales: &[f64]) -> Result<Quantity> {
    let shape = quantity.shape().to_vec();
    let axis = (1..shape.len())
        .chain(std::iter::once(0))
        .find(|&k| shape.get(k) == Some(&scales.len()))
        .ok_or_else(|| {
            CatalogError::shape_mismatch(
                "proper correction",
                format!("an axis of length {}", scales.len()),
                &shape,
            )
        })?;

    Ok(quantity.map_value(|mut value| {
        for (mut lane, &a) in value.axis_iter_mut(Axis(axis)).zip(scales) {
            lane.mapv_inplace(|v| v / a);
        }
        value
    }))
}

/// Snip numbers listed in a `RootIndex/<set>` array
pub fn snip_indices(raw: &RawArray) -> Result<Vec<usize>> {
    if raw.ndim() != 1 {
        return Err(CatalogError::shape_mismatch("snip index", "1-D", raw.shape()));
    }
    raw.iter()
        .map(|&v| {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(CatalogError::configuration(format!(
                    "snip index contains invalid entry {}",
                    v
                )))
            }
        })
        .collect()
}

/// Stack per-snip `[object, ...]` arrays along a new time axis 1
pub fn assemble_snips(parts: &[RawArray]) -> Result<RawArray> {
    let first = parts
        .first()
        .ok_or_else(|| CatalogError::configuration("no snips to assemble"))?;

    let views: Vec<ArrayView<'_, f64, IxDyn>> =
        parts.iter().map(|p| p.view().insert_axis(Axis(1))).collect();

    concatenate(Axis(1), &views).map_err(|_| {
        let mismatched = parts
            .iter()
            .find(|p| p.shape() != first.shape())
            .unwrap_or(first);
        CatalogError::shape_mismatch("snip assembly", format!("{:?}", first.shape()), mismatched.shape())
    })
}

/// Scale factor at each sample of a 1-D track time axis
pub fn track_scales(times: &Quantity, cosmology: &dyn AgeRedshift) -> Result<Vec<f64>> {
    if times.ndim() != 1 {
        return Err(CatalogError::shape_mismatch(
            "interpolation times",
            "1-D",
            times.shape(),
        ));
    }
    let gyr = times.value_in(Unit::GYR)?;
    Ok(gyr.iter().map(|&t| cosmology.scale_at_age(t)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmology::FlatLambdaCdm;
    use crate::property::Property;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2, arr3, Array2};
    use proptest::prelude::*;

    #[test]
    fn test_sentinel_replacement_keeps_shape() {
        let mut raw = arr2(&[[-1.0, 12.0], [11.5, -1.0]]).into_dyn();
        replace_sentinel(&mut raw, -1.0);
        assert_eq!(raw.shape(), &[2, 2]);
        assert!(raw[[0, 0]].is_nan());
        assert!(raw[[1, 1]].is_nan());
        assert_eq!(raw[[0, 1]], 12.0);
    }

    #[test]
    fn test_format_log_stored_mass() {
        let raw = arr2(&[[12.0, -1.0]]).into_dyn();
        let q = format_raw(raw, Property::M200.spec());
        assert_eq!(q.unit(), Unit::MSUN);
        assert_relative_eq!(q.value()[[0, 0]], 1.0e12, max_relative = 1e-12);
        assert!(q.value()[[0, 1]].is_nan());
    }

    #[test]
    fn test_format_linear_value() {
        let raw = arr1(&[0.5, -1.0]).into_dyn();
        let q = format_raw(raw, Property::R200.spec());
        assert_eq!(q.unit(), Unit::MPC);
        assert_eq!(q.value()[[1]], -1.0, "R200 has no sentinel");
    }

    #[test]
    fn test_to_proper_snapshot_axis() {
        let q = Quantity::new(arr2(&[[1.0, 1.0], [2.0, 4.0]]).into_dyn(), Unit::MPC);
        let proper = to_proper(q, &[0.5, 1.0]).unwrap();
        assert_eq!(proper.value(), &arr2(&[[2.0, 1.0], [4.0, 4.0]]).into_dyn());
    }

    #[test]
    fn test_to_proper_vector_property() {
        // [object, snapshot, component] with two snapshots
        let q = Quantity::new(arr3(&[[[1.0, 2.0, 3.0], [1.0, 2.0, 3.0]]]).into_dyn(), Unit::MPC);
        let proper = to_proper(q, &[0.5, 1.0]).unwrap();
        assert_eq!(proper.value()[[0, 0, 2]], 6.0);
        assert_eq!(proper.value()[[0, 1, 2]], 3.0);
    }

    #[test]
    fn test_to_proper_shape_mismatch() {
        let q = Quantity::new(arr2(&[[1.0, 1.0]]).into_dyn(), Unit::MPC);
        assert!(matches!(
            to_proper(q, &[0.5, 0.6, 0.7]),
            Err(CatalogError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_snip_indices() {
        assert_eq!(snip_indices(&arr1(&[0.0, 3.0, 7.0]).into_dyn()).unwrap(), vec![0, 3, 7]);
        assert!(snip_indices(&arr1(&[1.5]).into_dyn()).is_err());
        assert!(snip_indices(&arr2(&[[1.0]]).into_dyn()).is_err());
    }

    #[test]
    fn test_assemble_snips() {
        let parts = vec![
            arr1(&[1.0, 2.0]).into_dyn(),
            arr1(&[3.0, 4.0]).into_dyn(),
            arr1(&[5.0, 6.0]).into_dyn(),
        ];
        let out = assemble_snips(&parts).unwrap();
        assert_eq!(out, arr2(&[[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]]).into_dyn());

        let vectors = vec![
            arr2(&[[1.0, 2.0, 3.0]]).into_dyn(),
            arr2(&[[4.0, 5.0, 6.0]]).into_dyn(),
        ];
        let out = assemble_snips(&vectors).unwrap();
        assert_eq!(out.shape(), &[1, 2, 3]);
        assert_eq!(out[[0, 1, 0]], 4.0);
    }

    #[test]
    fn test_assemble_snips_errors() {
        assert!(assemble_snips(&[]).is_err());
        let parts = vec![arr1(&[1.0, 2.0]).into_dyn(), arr1(&[3.0]).into_dyn()];
        assert!(matches!(
            assemble_snips(&parts),
            Err(CatalogError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_track_scales() {
        let cosmo = FlatLambdaCdm::default();
        let today = cosmo.age_at_redshift(0.0);
        let times = Quantity::from_vec(vec![today, f64::NAN], Unit::GYR);
        let scales = track_scales(&times, &cosmo).unwrap();
        assert_relative_eq!(scales[0], 1.0, epsilon = 1e-9);
        assert!(scales[1].is_nan());
    }

    proptest! {
        #[test]
        fn prop_sentinel_replacement_keeps_shape(
            rows in 1usize..5,
            cols in 1usize..5,
            flags in prop::collection::vec(any::<bool>(), 16),
        ) {
            let values: Vec<f64> = flags
                .iter()
                .take(rows * cols)
                .enumerate()
                .map(|(i, &missing)| if missing { -1.0 } else { 10.0 + i as f64 })
                .collect();
            let sentinels = values.iter().filter(|&&v| v == -1.0).count();
            let mut raw = Array2::from_shape_vec((rows, cols), values).unwrap().into_dyn();
            replace_sentinel(&mut raw, -1.0);

            prop_assert_eq!(raw.shape(), &[rows, cols]);
            prop_assert_eq!(raw.iter().filter(|v| v.is_nan()).count(), sentinels);
        }
    }
}
