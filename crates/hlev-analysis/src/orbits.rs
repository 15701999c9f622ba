//! Pericenter and infall extraction from distance-versus-time matrices
//!
//! Every function takes an `[object, time]` distance matrix `r` and, where
//! times are needed, a 1-D `[time]` axis `t` in increasing order. Outputs are
//! per-object and carry the units of the inputs; objects with no qualifying
//! sample get `NaN`.

use hlev_units::{Quantity, Scalar};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Ix1, Ix2};

use crate::error::{AnalysisError, Result};

/// Time and distance of each object's first pericenter
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPericenter {
    pub time: Quantity,
    pub radius: Quantity,
}

/// First pericenter and first infall of each object
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSummary {
    pub first_pericenter: FirstPericenter,
    pub first_infall: Quantity,
}

fn distance_matrix(r: &Quantity) -> Result<ArrayView2<'_, f64>> {
    r.value()
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| AnalysisError::shape_mismatch("distance matrix", r.shape(), &[0, 0]))
}

fn time_axis<'a>(t: &'a Quantity, r: &ArrayView2<'_, f64>) -> Result<ArrayView1<'a, f64>> {
    let times = t
        .value()
        .view()
        .into_dimensionality::<Ix1>()
        .map_err(|_| AnalysisError::shape_mismatch("time axis", t.shape(), &[r.ncols()]))?;
    if times.len() != r.ncols() {
        return Err(AnalysisError::shape_mismatch(
            "time axis",
            t.shape(),
            &[r.ncols()],
        ));
    }
    Ok(times)
}

/// Flag local minima of each row that lie below `radius_cut`.
///
/// Sample `j` is flagged when the row does not rise into it (`j == 0` or
/// `r[j-1] >= r[j]`), rises out of it (`r[j] < r[j+1]`) and `r[j] < cut`.
/// The last sample is never flagged since the next value is unknown.
/// Comparisons with `NaN` are false, so undefined samples are never flagged.
pub fn find_pericenters(r: &Quantity, radius_cut: Scalar) -> Result<Array2<bool>> {
    let cut = radius_cut.value_in(r.unit())?;
    let r = distance_matrix(r)?;
    let (rows, cols) = r.dim();

    let mut peris = Array2::from_elem((rows, cols), false);
    for (i, row) in r.outer_iter().enumerate() {
        for j in 0..cols.saturating_sub(1) {
            let descends = j == 0 || row[j - 1] >= row[j];
            let rises = row[j] < row[j + 1];
            peris[[i, j]] = descends && rises && row[j] < cut;
        }
    }
    Ok(peris)
}

/// Time and radius of the earliest flagged sample of each row
pub fn first_pericenter(peris: &Array2<bool>, t: &Quantity, r: &Quantity) -> Result<FirstPericenter> {
    let r_view = distance_matrix(r)?;
    if peris.dim() != r_view.dim() {
        return Err(AnalysisError::shape_mismatch("pericenter flags", peris.shape(), r.shape()));
    }
    let times = time_axis(t, &r_view)?;

    let mut time = Array1::from_elem(peris.nrows(), f64::NAN);
    let mut radius = Array1::from_elem(peris.nrows(), f64::NAN);
    for (i, flags) in peris.outer_iter().enumerate() {
        if let Some(j) = flags.iter().position(|&f| f) {
            time[i] = times[j];
            radius[i] = r_view[[i, j]];
        }
    }

    Ok(FirstPericenter {
        time: Quantity::new(time.into_dyn(), t.unit()),
        radius: Quantity::new(radius.into_dyn(), r.unit()),
    })
}

/// Time of the earliest sample of each row with `r < radius_cut`
pub fn first_infall_time(r: &Quantity, t: &Quantity, radius_cut: Scalar) -> Result<Quantity> {
    let cut = radius_cut.value_in(r.unit())?;
    let r_view = distance_matrix(r)?;
    let times = time_axis(t, &r_view)?;

    let infall: Array1<f64> = r_view
        .outer_iter()
        .map(|row| {
            row.iter()
                .position(|&x| x < cut)
                .map_or(f64::NAN, |j| times[j])
        })
        .collect();
    Ok(Quantity::new(infall.into_dyn(), t.unit()))
}

/// First pericenter below `peri_cut` and first infall below `infall_cut`
pub fn summarize(r: &Quantity, t: &Quantity, peri_cut: Scalar, infall_cut: Scalar) -> Result<OrbitSummary> {
    let peris = find_pericenters(r, peri_cut)?;
    Ok(OrbitSummary {
        first_pericenter: first_pericenter(&peris, t, r)?,
        first_infall: first_infall_time(r, t, infall_cut)?,
    })
}
