//! RAP analysis interpolation onto a WRF grid.
//!
//! Every field in [`catalog::RAP_FIELDS`] is pulled out of the analysis,
//! interpolated with one shared triangulation and written to
//! `RAP_interp_to_WRF_{yyyy}{mm}{dd}{hhmm}.nc` beside the target grid's
//! `XLAT`/`XLONG`.

pub mod catalog;
pub mod source;

use chrono::NaiveDateTime;
use ndarray::Array2;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::data_loader::{open_netcdf, read_grid_plane, require_variable};
use crate::error::Result;
use crate::grid::{FieldLabel, TargetGrid};
use crate::interpolation::geodesy::grid_to_ecef;
use crate::interpolation::{GridInterpolator, MaskedField, FILL_VALUE};
use crate::logging::{log_field_stats, log_operation_end, log_operation_start};
use crate::time::analysis_components;

pub use catalog::{AnalysisField, VerticalLevel, RAP_FIELDS};
pub use source::{AnalysisDataset, AnalysisSource, LocalAnalysis, RemoteRapSource};

/// Name of the interpolated file for a valid time
pub fn rap_output_filename(valid: NaiveDateTime) -> String {
    let (yyyy, mm, dd, hhmm) = analysis_components(valid, true);
    format!("RAP_interp_to_WRF_{}{}{}{}.nc", yyyy, mm, dd, hhmm)
}

/// Fetch the analysis valid at `valid`, interpolate it onto the grid of
/// `wrfref` and write the result into `output_dir`.
///
/// Returns the path of the written file. An existing file of the same name
/// is overwritten.
pub fn interp_rap_to_wrf(
    source: &dyn AnalysisSource,
    valid: NaiveDateTime,
    wrfref: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let start = Instant::now();
    log_operation_start("rap_interp", Some(&valid.to_string()));

    let analysis = source.fetch(valid)?;
    let (rap_lons, rap_lats) = analysis.lon_lat()?;

    let fields = RAP_FIELDS
        .iter()
        .map(|field| Ok((field.field_label()?, field.extract(analysis.file(), analysis.origin())?)))
        .collect::<Result<Vec<(FieldLabel, Array2<f64>)>>>()?;

    let grid = TargetGrid::from_file(wrfref)?;
    let source_plane = grid_to_ecef(rap_lons.view(), rap_lats.view())?;
    let target_plane = grid.to_ecef()?;
    let interpolator = GridInterpolator::new(
        source_plane.x.view(),
        source_plane.y.view(),
        target_plane.x.view(),
        target_plane.y.view(),
    )?;

    let total = grid.shape().0 * grid.shape().1;
    let mut interpolated = Vec::with_capacity(fields.len());
    for (label, values) in fields {
        let field = interpolator.interpolate(values.view())?;
        log_field_stats(label.as_str(), field.valid_count(), total, field.max());
        interpolated.push((label, field));
    }

    let out_path = output_dir.join(rap_output_filename(valid));
    write_interpolated(&out_path, &grid, &interpolated)?;

    info!(
        path = %out_path.display(),
        fields = interpolated.len(),
        covered_cells = interpolator.covered_cells(),
        "Wrote interpolated RAP analysis"
    );
    log_operation_end("rap_interp", start, true);
    Ok(out_path)
}

/// Write interpolated fields as `(lat, lon)` variables named by storage key
pub fn write_interpolated(
    path: &Path,
    grid: &TargetGrid,
    fields: &[(FieldLabel, MaskedField)],
) -> Result<()> {
    let (ny, nx) = grid.shape();
    let mut file = netcdf::create(path)?;
    file.add_dimension("lat", ny)?;
    file.add_dimension("lon", nx)?;
    file.add_unlimited_dimension("time")?;

    let mut xlat = file.add_variable::<f64>("XLAT", &["lat", "lon"])?;
    xlat.put_attribute("units", "degree_north")?;
    xlat.put_values(&row_major(&grid.lats().to_owned()), ..)?;

    let mut xlong = file.add_variable::<f64>("XLONG", &["lat", "lon"])?;
    xlong.put_attribute("units", "degree_east")?;
    xlong.put_values(&row_major(&grid.lons().to_owned()), ..)?;

    for (label, field) in fields {
        let mut var = file.add_variable::<f64>(&label.storage_key(), &["lat", "lon"])?;
        var.set_fill_value(FILL_VALUE)?;
        var.put_attribute("long_name", label.as_str())?;
        var.put_values(&row_major(&field.to_sentinel_filled()), ..)?;
    }

    Ok(())
}

/// Read one field of an interpolated RAP file together with its grid
pub fn read_interpolated(path: &Path, key: &str) -> Result<(TargetGrid, MaskedField)> {
    let grid = TargetGrid::from_file(path)?;
    let file = open_netcdf(path)?;
    let values = read_grid_plane(&require_variable(&file, key, &path.display().to_string())?)?;
    Ok((grid, MaskedField::from_filled(values.view(), FILL_VALUE)))
}

fn row_major(values: &Array2<f64>) -> Vec<f64> {
    values.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_output_filename() {
        let t = NaiveDate::from_ymd_opt(2019, 5, 7)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap();
        assert_eq!(rap_output_filename(t), "RAP_interp_to_WRF_201905070300.nc");
    }

    #[test]
    fn test_written_fields_read_back_with_missing_cells() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("interp.nc");

        let grid = TargetGrid::new(array![[-100.0, -99.0]], array![[35.0, 35.0]])?;
        let label = FieldLabel::new("SLP")?;
        let field = MaskedField::new(array![[Some(101325.0), None]]);
        write_interpolated(&path, &grid, &[(label, field.clone())])?;

        let (read_grid, read_field) = read_interpolated(&path, "SLP")?;
        assert_eq!(read_grid, grid);
        assert_eq!(read_field, field);
        Ok(())
    }
}
