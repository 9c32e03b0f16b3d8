//! GridRad volumes.
//!
//! GridRad stores reflectivity sparsely: `Reflectivity[i]` belongs at flat
//! position `index[i]` of the (Altitude, Latitude, Longitude) volume. Cells
//! without an entry hold no echo and are NaN once expanded.

use chrono::NaiveDateTime;
use ndarray::{s, Array1, Array2, Array3};
use netcdf::Variable;
use std::path::Path;
use tracing::debug;

use crate::data_loader::{global_text_attribute, open_netcdf, read_1d, read_1d_i64, require_variable};
use crate::error::{Result, WrfInterpError};
use crate::time::parse_datehour;

/// GridRad longitudes run 0–360 °E; subtracting this maps them onto the
/// negative western-hemisphere convention of WRF grids
pub const LONGITUDE_SHIFT: f64 = 360.0;

/// A dense GridRad reflectivity volume
#[derive(Debug, Clone)]
pub struct GridRadVolume {
    longitudes: Array1<f64>,
    latitudes: Array1<f64>,
    altitudes: Array1<f64>,
    reflectivity: Array3<f64>,
    valid: NaiveDateTime,
}

impl GridRadVolume {
    /// Expand sparse `(index, value)` pairs into a dense volume.
    ///
    /// `longitudes` are taken as already shifted into −180..180.
    pub fn from_sparse(
        longitudes: Array1<f64>,
        latitudes: Array1<f64>,
        altitudes: Array1<f64>,
        index: &[i64],
        values: &[f64],
        valid: NaiveDateTime,
    ) -> Result<Self> {
        if index.len() != values.len() {
            return Err(WrfInterpError::ShapeMismatch {
                message: format!(
                    "{} sparse indices for {} reflectivity values",
                    index.len(),
                    values.len()
                ),
            });
        }

        let shape = (altitudes.len(), latitudes.len(), longitudes.len());
        let total = shape.0 * shape.1 * shape.2;
        let mut dense = vec![f64::NAN; total];

        for (&flat, &value) in index.iter().zip(values) {
            let slot = usize::try_from(flat)
                .ok()
                .filter(|&i| i < total)
                .ok_or_else(|| WrfInterpError::InvalidParameter {
                    param: "index".to_string(),
                    message: format!("sparse index {} outside volume of {} cells", flat, total),
                })?;
            dense[slot] = value;
        }

        Ok(Self {
            longitudes,
            latitudes,
            altitudes,
            reflectivity: Array3::from_shape_vec(shape, dense)?,
            valid,
        })
    }

    /// Read a GridRad file
    pub fn open(path: &Path) -> Result<Self> {
        let file = open_netcdf(path)?;
        let source = path.display().to_string();

        let longitudes =
            read_1d(&require_variable(&file, "Longitude", &source)?)?.mapv(|lon| lon - LONGITUDE_SHIFT);
        let latitudes = read_1d(&require_variable(&file, "Latitude", &source)?)?;
        let altitudes = read_1d(&require_variable(&file, "Altitude", &source)?)?;
        let index = read_1d_i64(&require_variable(&file, "index", &source)?)?;
        let values = read_1d(&require_variable(&file, "Reflectivity", &source)?)?.to_vec();
        let valid = parse_datehour(&read_datehour(&file, &source)?)?;

        debug!(
            path = %path.display(),
            levels = altitudes.len(),
            latitudes = latitudes.len(),
            longitudes = longitudes.len(),
            echoes = index.len(),
            "Read GridRad volume"
        );

        Self::from_sparse(
            longitudes,
            latitudes,
            altitudes,
            &index,
            &values,
            valid,
        )
    }

    pub fn valid_time(&self) -> NaiveDateTime {
        self.valid
    }

    pub fn altitudes(&self) -> &Array1<f64> {
        &self.altitudes
    }

    /// (levels, latitudes, longitudes)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.reflectivity.dim()
    }

    /// Reflectivity on one level, NaN where there is no echo
    pub fn level(&self, zlev: usize) -> Result<Array2<f64>> {
        let levels = self.altitudes.len();
        if zlev >= levels {
            return Err(WrfInterpError::InvalidParameter {
                param: "zlev".to_string(),
                message: format!("level {} requested from a volume with {} levels", zlev, levels),
            });
        }
        Ok(self.reflectivity.slice(s![zlev, .., ..]).to_owned())
    }

    /// Longitude and latitude of every cell of a level, shaped (lat, lon)
    pub fn mesh(&self) -> (Array2<f64>, Array2<f64>) {
        let shape = (self.latitudes.len(), self.longitudes.len());
        let lons = Array2::from_shape_fn(shape, |(_, c)| self.longitudes[c]);
        let lats = Array2::from_shape_fn(shape, |(r, _)| self.latitudes[r]);
        (lons, lats)
    }
}

/// The `datehour` stamp, stored either as a global attribute or as a
/// variable holding a string or an integer
fn read_datehour(file: &netcdf::File, source: &str) -> Result<String> {
    if let Some(text) = global_text_attribute(file, "datehour")? {
        return Ok(text);
    }
    let var = require_variable(file, "datehour", source)?;
    datehour_from_variable(&var)
}

fn datehour_from_variable(var: &Variable) -> Result<String> {
    if let Ok(values) = var.get_values::<i64, _>(..) {
        if let Some(first) = values.first() {
            return Ok(first.to_string());
        }
    }
    Ok(var.get_string(..)?.trim_end_matches('\0').to_string())
}
