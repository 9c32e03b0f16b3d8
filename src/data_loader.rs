//! NetCDF reading helpers.
//!
//! Thin wrappers around the `netcdf` crate that turn variables into ndarray
//! arrays and map lookups that find nothing into crate errors naming the file
//! and variable involved.

use ndarray::{Array1, Array2};
use netcdf::{AttributeValue, Variable};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, WrfInterpError};

/// Open a NetCDF file for reading, failing early with a clear IO error
pub fn open_netcdf(path: &Path) -> Result<netcdf::File> {
    if !path.exists() {
        return Err(WrfInterpError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = netcdf::open(path)?;
    info!("Opened NetCDF file: {}", path.display());
    debug!(
        variables = file.variables().count(),
        dimensions = file.dimensions().count(),
        "File contents"
    );
    Ok(file)
}

/// Look up a variable, naming the file in the error when it is absent
pub fn require_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
    source_name: &str,
) -> Result<Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| WrfInterpError::MissingVariable {
            name: name.to_string(),
            source_name: source_name.to_string(),
        })
}

/// Read a whole 1-D variable as f64
pub fn read_1d(var: &Variable) -> Result<Array1<f64>> {
    let values: Vec<f64> = var.get_values(..)?;
    Ok(Array1::from_vec(values))
}

/// Read a whole 1-D integer variable (used for sparse indices)
pub fn read_1d_i64(var: &Variable) -> Result<Vec<i64>> {
    Ok(var.get_values(..)?)
}

/// Read the trailing 2-D plane of a variable at fixed leading indices.
///
/// A `(time, level, y, x)` variable read with `leading = [0, k]` yields the
/// `(y, x)` plane at time 0 and level `k`.
pub fn read_plane(var: &Variable, leading: &[usize]) -> Result<Array2<f64>> {
    let dims = var.dimensions();
    if dims.len() != leading.len() + 2 {
        return Err(WrfInterpError::ShapeMismatch {
            message: format!(
                "variable {} has {} dimensions, expected {}",
                var.name(),
                dims.len(),
                leading.len() + 2
            ),
        });
    }

    for (i, (&index, dim)) in leading.iter().zip(dims.iter()).enumerate() {
        if index >= dim.len() {
            return Err(WrfInterpError::InvalidParameter {
                param: format!("{} index {}", var.name(), i),
                message: format!(
                    "index {} out of range for dimension {} of length {}",
                    index,
                    dim.name(),
                    dim.len()
                ),
            });
        }
    }

    let ny = dims[leading.len()].len();
    let nx = dims[leading.len() + 1].len();

    let values: Vec<f64> = match *leading {
        [] => var.get_values((.., ..))?,
        [a] => var.get_values((a, .., ..))?,
        [a, b] => var.get_values((a, b, .., ..))?,
        _ => {
            return Err(WrfInterpError::InvalidParameter {
                param: var.name(),
                message: "at most two leading dimensions are supported".to_string(),
            })
        }
    };

    Ok(Array2::from_shape_vec((ny, nx), values)?)
}

/// Read a 2-D grid that is stored either as `(y, x)` or `(time, y, x)`.
///
/// For the 3-D layout the first time is used.
pub fn read_grid_plane(var: &Variable) -> Result<Array2<f64>> {
    match var.dimensions().len() {
        2 => read_plane(var, &[]),
        3 => read_plane(var, &[0]),
        n => Err(WrfInterpError::ShapeMismatch {
            message: format!("grid variable {} has {} dimensions", var.name(), n),
        }),
    }
}

/// Find the position of `value` in a coordinate by exact equality
pub fn exact_level_index(coordinate: &str, values: &[f64], value: f64) -> Result<usize> {
    values
        .iter()
        .position(|&v| v == value)
        .ok_or_else(|| WrfInterpError::LevelNotFound {
            coordinate: coordinate.to_string(),
            value,
        })
}

/// Render an attribute as text, formatting numbers without a fraction part
pub fn attribute_text(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Str(s) => Some(s.clone()),
        AttributeValue::Strs(v) => v.first().cloned(),
        AttributeValue::Int(v) => Some(v.to_string()),
        AttributeValue::Ints(v) => v.first().map(|v| v.to_string()),
        AttributeValue::Longlong(v) => Some(v.to_string()),
        AttributeValue::Longlongs(v) => v.first().map(|v| v.to_string()),
        AttributeValue::Uint(v) => Some(v.to_string()),
        AttributeValue::Ulonglong(v) => Some(v.to_string()),
        AttributeValue::Double(v) => Some(format!("{:.0}", v)),
        AttributeValue::Doubles(v) => v.first().map(|v| format!("{:.0}", v)),
        AttributeValue::Float(v) => Some(format!("{:.0}", v)),
        _ => None,
    }
}

/// Read a global attribute as text
pub fn global_text_attribute(file: &netcdf::File, name: &str) -> Result<Option<String>> {
    match file.attribute(name) {
        Some(attr) => Ok(attribute_text(&attr.value()?)),
        None => Ok(None),
    }
}

/// Length of a named dimension, zero when it does not exist
pub fn dimension_len(file: &netcdf::File, name: &str) -> usize {
    file.dimension(name).map(|d| d.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_file(path: &Path) -> Result<()> {
        let mut file = netcdf::create(path)?;
        file.add_dimension("time", 2)?;
        file.add_dimension("level", 3)?;
        file.add_dimension("y", 2)?;
        file.add_dimension("x", 4)?;
        file.add_attribute("datehour", "2020050112")?;

        let mut level = file.add_variable::<f64>("level", &["level"])?;
        level.put_values(&[92500.0, 85000.0, 70000.0], ..)?;

        let data: Vec<f32> = (0..48).map(|i| i as f32).collect();
        let mut var = file.add_variable::<f32>("field", &["time", "level", "y", "x"])?;
        var.put_values(&data, ..)?;
        Ok(())
    }

    #[test]
    fn test_file_not_found() {
        let result = open_netcdf(Path::new("/nonexistent/file.nc"));
        match result.unwrap_err() {
            WrfInterpError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected IO error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_plane_at_level() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("test.nc");
        create_test_file(&path)?;

        let file = open_netcdf(&path)?;
        let var = require_variable(&file, "field", "test.nc")?;
        let plane = read_plane(&var, &[1, 2])?;

        assert_eq!(plane.dim(), (2, 4));
        // time 1, level 2 starts at 1*24 + 2*8
        assert_eq!(plane[[0, 0]], 40.0);
        assert_eq!(plane[[1, 3]], 47.0);
        Ok(())
    }

    #[test]
    fn test_missing_variable() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("test.nc");
        create_test_file(&path)?;

        let file = open_netcdf(&path)?;
        let err = require_variable(&file, "nope", "test.nc").unwrap_err();
        assert!(matches!(err, WrfInterpError::MissingVariable { .. }));
        Ok(())
    }

    #[test]
    fn test_exact_level_lookup() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("test.nc");
        create_test_file(&path)?;

        let file = open_netcdf(&path)?;
        let levels = read_1d(&require_variable(&file, "level", "test.nc")?)?;
        let levels = levels.to_vec();

        assert_eq!(exact_level_index("level", &levels, 85000.0)?, 1);
        // 850 hPa expressed in hPa is not a match: no unit guessing
        assert!(matches!(
            exact_level_index("level", &levels, 850.0),
            Err(WrfInterpError::LevelNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_global_text_attribute() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("test.nc");
        create_test_file(&path)?;

        let file = open_netcdf(&path)?;
        assert_eq!(
            global_text_attribute(&file, "datehour")?,
            Some("2020050112".to_string())
        );
        assert_eq!(global_text_attribute(&file, "absent")?, None);
        assert_eq!(dimension_len(&file, "level"), 3);
        Ok(())
    }
}
