//! Interpolating one GridRad level onto a model grid.

use std::path::Path;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use super::source::GridRadVolume;
use super::store::ReflectivityStore;
use crate::error::Result;
use crate::grid::TargetGrid;
use crate::interpolation::geodesy::grid_to_ecef;
use crate::interpolation::GridInterpolator;
use crate::logging::{log_operation_end, log_operation_start};
use crate::time::is_on_hour;

/// What one interpolate-and-append call stored
#[derive(Debug, Clone, PartialEq)]
pub struct AppendSummary {
    /// Time index the entry was written at
    pub index: usize,
    pub valid: NaiveDateTime,
    pub max_original: Option<f64>,
    pub max_interpolated: Option<f64>,
}

/// Interpolate level `zlev` of `gridrad_file` onto the grid of
/// `interpto_file` and append it to the series at `out_file`.
pub fn horiz_interp_and_store_gridrad(
    gridrad_file: &Path,
    interpto_file: &Path,
    out_file: &Path,
    zlev: usize,
) -> Result<AppendSummary> {
    let start = Instant::now();
    log_operation_start("gridrad_interp", Some(&gridrad_file.display().to_string()));

    let volume = GridRadVolume::open(gridrad_file)?;
    let level = volume.level(zlev)?;
    let max_original = level
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
    info!(zlev = zlev, max_original = ?max_original, "GridRad level extracted");

    if !is_on_hour(volume.valid_time()) {
        warn!(valid = %volume.valid_time(), "GridRad time is not on the hour");
    }

    let grid = TargetGrid::from_file(interpto_file)?;
    let (lons, lats) = volume.mesh();
    let source_plane = grid_to_ecef(lons.view(), lats.view())?;
    let target_plane = grid.to_ecef()?;
    let interpolator = GridInterpolator::new(
        source_plane.x.view(),
        source_plane.y.view(),
        target_plane.x.view(),
        target_plane.y.view(),
    )?;

    // NaN (no echo) propagates into every triangle touching it
    let reflectivity = interpolator.interpolate(level.view())?;
    let max_interpolated = reflectivity.max();
    info!(max_interpolated = ?max_interpolated, "GridRad level interpolated");

    let mut store = ReflectivityStore::open_or_create(out_file, grid.shape())?;
    let index = store.append(&grid, zlev, volume.valid_time(), &reflectivity)?;

    log_operation_end("gridrad_interp", start, true);
    Ok(AppendSummary {
        index,
        valid: volume.valid_time(),
        max_original,
        max_interpolated,
    })
}
