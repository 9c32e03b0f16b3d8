//! Grid-to-grid interpolation.
//!
//! Scattered source points are triangulated and evaluated linearly at the
//! target grid points. Callers are expected to hand in comparable planar
//! coordinates, normally the ECEF x/y produced by [`geodesy::grid_to_ecef`].

pub mod bilinear;
pub mod common;
pub mod field;
pub mod geodesy;

use ndarray::{Array2, ArrayView2};

use crate::error::Result;

pub use bilinear::GridInterpolator;
pub use field::MaskedField;

/// Value written to files for cells outside the source hull
pub const FILL_VALUE: f64 = 9e9;

/// Interpolate `z(source_x, source_y)` onto `(target_x, target_y)` in one call.
///
/// Cells outside the convex hull of the source points hold [`FILL_VALUE`].
/// Prefer [`GridInterpolator`] when several fields share the same grids.
pub fn interpolate_to_grid(
    source_x: ArrayView2<f64>,
    source_y: ArrayView2<f64>,
    target_x: ArrayView2<f64>,
    target_y: ArrayView2<f64>,
    z: ArrayView2<f64>,
) -> Result<Array2<f64>> {
    let interpolator = GridInterpolator::new(source_x, source_y, target_x, target_y)?;
    Ok(interpolator.interpolate(z)?.to_sentinel_filled())
}
