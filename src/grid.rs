//! Target model grids and field labels.

use ndarray::{Array2, ArrayView2};
use std::fmt;
use std::path::Path;

use crate::data_loader::{open_netcdf, read_grid_plane, require_variable};
use crate::error::{Result, WrfInterpError};
use crate::interpolation::geodesy::{grid_to_ecef, EcefPlane};

/// Longitude/latitude of a model grid, shaped (south_north, west_east)
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGrid {
    lons: Array2<f64>,
    lats: Array2<f64>,
}

impl TargetGrid {
    /// Build a grid from matching longitude and latitude arrays
    pub fn new(lons: Array2<f64>, lats: Array2<f64>) -> Result<Self> {
        if lons.dim() != lats.dim() {
            return Err(WrfInterpError::ShapeMismatch {
                message: format!(
                    "XLONG {:?} and XLAT {:?} differ",
                    lons.dim(),
                    lats.dim()
                ),
            });
        }
        Ok(Self { lons, lats })
    }

    /// Read `XLONG`/`XLAT` from a reference file (wrfout or an interpolated output)
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = open_netcdf(path)?;
        let source = path.display().to_string();
        let lons = read_grid_plane(&require_variable(&file, "XLONG", &source)?)?;
        let lats = read_grid_plane(&require_variable(&file, "XLAT", &source)?)?;
        Self::new(lons, lats)
    }

    pub fn lons(&self) -> ArrayView2<'_, f64> {
        self.lons.view()
    }

    pub fn lats(&self) -> ArrayView2<'_, f64> {
        self.lats.view()
    }

    /// (south_north, west_east)
    pub fn shape(&self) -> (usize, usize) {
        self.lons.dim()
    }

    /// ECEF x/y of every grid point
    pub fn to_ecef(&self) -> Result<EcefPlane> {
        grid_to_ecef(self.lons.view(), self.lats.view())
    }
}

/// A physical variable's display label.
///
/// The label is shown on plots; the storage key used as a NetCDF variable
/// name is derived from it by replacing spaces with underscores. Labels may
/// not contain underscores, which keeps the mapping reversible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldLabel(String);

impl FieldLabel {
    pub fn new(label: &str) -> Result<Self> {
        if label.is_empty() || label.contains('_') || label.trim() != label {
            return Err(WrfInterpError::InvalidParameter {
                param: "label".to_string(),
                message: format!(
                    "'{}' must be non-empty, trimmed and free of underscores",
                    label
                ),
            });
        }
        Ok(Self(label.to_string()))
    }

    /// Recover a label from its storage key
    pub fn from_storage_key(key: &str) -> Result<Self> {
        Self::new(&key.replace('_', " "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Variable name used in files
    pub fn storage_key(&self) -> String {
        self.0.replace(' ', "_")
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
