//! Time series of interpolated reflectivity.
//!
//! One file holds any number of entries along an unlimited `Time`
//! dimension. Each entry keeps its own valid time and level; the file-level
//! `STARTDATE` attribute mirrors the latest append.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::data_loader::{
    dimension_len, global_text_attribute, open_netcdf, read_plane, require_variable,
};
use crate::error::{Result, WrfInterpError};
use crate::grid::TargetGrid;
use crate::interpolation::{MaskedField, FILL_VALUE};
use crate::time::{format_datehour, from_hours_since_epoch, hours_since_epoch, parse_datehour};

pub const REFLECTIVITY_VAR: &str = "GridRad_Refl";
const VALID_TIME_VAR: &str = "valid_time";
const MISSING_TIME: i64 = i64::MIN;

/// One stored time entry
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectivityEntry {
    /// `None` for entries written before per-entry times were recorded
    pub valid_time: Option<NaiveDateTime>,
    pub zlev: i32,
    pub reflectivity: MaskedField,
}

/// Everything read back from a reflectivity file
#[derive(Debug, Clone)]
pub struct ReflectivitySeries {
    pub grid: TargetGrid,
    /// Parsed `STARTDATE`, if present
    pub start_date: Option<NaiveDateTime>,
    pub entries: Vec<ReflectivityEntry>,
}

impl ReflectivitySeries {
    /// Valid time of entry `i`.
    ///
    /// Files without per-entry times only identify their latest entry, by
    /// `STARTDATE`.
    pub fn entry_valid_time(&self, i: usize) -> Option<NaiveDateTime> {
        let entry = self.entries.get(i)?;
        let latest = i + 1 == self.entries.len();
        entry
            .valid_time
            .or(if latest { self.start_date } else { None })
    }
}

/// An open reflectivity file accepting appends
pub struct ReflectivityStore {
    file: netcdf::FileMut,
    path: PathBuf,
    shape: (usize, usize),
}

impl ReflectivityStore {
    /// Open `path` for appending, creating it with an empty `Time`
    /// dimension when it does not exist.
    ///
    /// Creation refuses to overwrite a file that appears in the meantime.
    /// An existing file must have the grid shape `shape`.
    pub fn open_or_create(path: &Path, shape: (usize, usize)) -> Result<Self> {
        let file = if path.exists() {
            let mut file = netcdf::append(path)?;
            let existing = (
                dimension_len(&file, "south_north"),
                dimension_len(&file, "west_east"),
            );
            if existing != shape {
                return Err(WrfInterpError::ShapeMismatch {
                    message: format!(
                        "{} holds a {:?} grid, cannot append {:?}",
                        path.display(),
                        existing,
                        shape
                    ),
                });
            }
            if file.variable(VALID_TIME_VAR).is_none() {
                Self::add_valid_times(&mut file, path)?;
            }
            debug!(path = %path.display(), "Opened reflectivity series for append");
            file
        } else {
            let file = Self::create(path, shape)?;
            info!(path = %path.display(), "Created reflectivity series");
            file
        };

        Ok(Self {
            file,
            path: path.to_path_buf(),
            shape,
        })
    }

    fn create(path: &Path, (ny, nx): (usize, usize)) -> Result<netcdf::FileMut> {
        let mut file =
            netcdf::create_with(path, netcdf::Options::NETCDF4 | netcdf::Options::NOCLOBBER)?;
        file.add_unlimited_dimension("Time")?;
        file.add_dimension("south_north", ny)?;
        file.add_dimension("west_east", nx)?;

        let dims = ["Time", "south_north", "west_east"];
        file.add_variable::<f64>("XLAT", &dims)?;
        file.add_variable::<f64>("XLONG", &dims)?;

        let mut refl = file.add_variable::<f64>(REFLECTIVITY_VAR, &dims)?;
        refl.set_fill_value(FILL_VALUE)?;
        refl.put_attribute("units", "dBZ")?;

        file.add_variable::<i32>("zlev", &["Time"])?;

        let mut valid = file.add_variable::<i64>(VALID_TIME_VAR, &["Time"])?;
        valid.set_fill_value(MISSING_TIME)?;
        valid.put_attribute("units", "hours since 1970-01-01 00:00:00")?;

        Ok(file)
    }

    /// Give a file written without per-entry times a `valid_time` variable.
    ///
    /// Such files only date their latest entry, through `STARTDATE`, so that
    /// entry is backfilled before the next append replaces the attribute.
    fn add_valid_times(file: &mut netcdf::FileMut, path: &Path) -> Result<()> {
        let count = dimension_len(file, "Time");
        let latest = global_text_attribute(file, "STARTDATE")?
            .map(|text| parse_datehour(&text))
            .transpose()?;

        let mut var = file.add_variable::<i64>(VALID_TIME_VAR, &["Time"])?;
        var.set_fill_value(MISSING_TIME)?;
        var.put_attribute("units", "hours since 1970-01-01 00:00:00")?;

        if let (Some(latest), Some(last)) = (latest, count.checked_sub(1)) {
            let mut times = vec![MISSING_TIME; count];
            times[last] = hours_since_epoch(latest);
            var.put_values(&times, 0..count)?;
        }
        info!(
            path = %path.display(),
            entries = count,
            latest = ?latest,
            "Added per-entry valid times to reflectivity series"
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        dimension_len(&self.file, "Time")
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one entry at the next time index and return that index
    pub fn append(
        &mut self,
        grid: &TargetGrid,
        zlev: usize,
        valid: NaiveDateTime,
        reflectivity: &MaskedField,
    ) -> Result<usize> {
        if grid.shape() != self.shape || reflectivity.shape() != self.shape {
            return Err(WrfInterpError::ShapeMismatch {
                message: format!(
                    "entry grid {:?} / field {:?} do not match series grid {:?}",
                    grid.shape(),
                    reflectivity.shape(),
                    self.shape
                ),
            });
        }
        let zlev = i32::try_from(zlev).map_err(|_| WrfInterpError::InvalidParameter {
            param: "zlev".to_string(),
            message: format!("{} does not fit the stored level type", zlev),
        })?;

        let n = self.len();
        let source = self.path.display().to_string();
        let lats: Vec<f64> = grid.lats().iter().copied().collect();
        let lons: Vec<f64> = grid.lons().iter().copied().collect();
        let values: Vec<f64> = reflectivity.to_sentinel_filled().iter().copied().collect();

        self.put_plane("XLAT", &lats, n, &source)?;
        self.put_plane("XLONG", &lons, n, &source)?;
        self.put_plane(REFLECTIVITY_VAR, &values, n, &source)?;

        self.variable_mut("zlev", &source)?
            .put_values(&[zlev], n..n + 1)?;
        self.variable_mut(VALID_TIME_VAR, &source)?
            .put_values(&[hours_since_epoch(valid)], n..n + 1)?;

        self.file
            .add_attribute("STARTDATE", format_datehour(valid).as_str())?;

        debug!(path = %source, index = n, zlev = zlev, valid = %valid, "Appended reflectivity entry");
        Ok(n)
    }

    fn put_plane(&mut self, name: &str, values: &[f64], n: usize, source: &str) -> Result<()> {
        let (ny, nx) = self.shape;
        self.variable_mut(name, source)?
            .put_values(values, (n..n + 1, 0..ny, 0..nx))?;
        Ok(())
    }

    fn variable_mut(&mut self, name: &str, source: &str) -> Result<netcdf::VariableMut<'_>> {
        self.file
            .variable_mut(name)
            .ok_or_else(|| WrfInterpError::MissingVariable {
                name: name.to_string(),
                source_name: source.to_string(),
            })
    }

    /// Read every entry of a reflectivity file
    pub fn read_entries(path: &Path) -> Result<ReflectivitySeries> {
        let file = open_netcdf(path)?;
        let source = path.display().to_string();
        let count = dimension_len(&file, "Time");

        let grid = TargetGrid::new(
            read_plane(&require_variable(&file, "XLONG", &source)?, &[0])?,
            read_plane(&require_variable(&file, "XLAT", &source)?, &[0])?,
        )?;

        let refl = require_variable(&file, REFLECTIVITY_VAR, &source)?;
        let zlevs: Vec<i32> = require_variable(&file, "zlev", &source)?.get_values(..)?;
        let valid_times: Vec<i64> = match file.variable(VALID_TIME_VAR) {
            Some(var) => var.get_values(..)?,
            None => Vec::new(),
        };

        let start_date = global_text_attribute(&file, "STARTDATE")?
            .map(|text| parse_datehour(&text))
            .transpose()?;

        let entries = (0..count)
            .map(|i| {
                let plane = read_plane(&refl, &[i])?;
                let valid_time = match valid_times.get(i) {
                    Some(&hours) if hours != MISSING_TIME => Some(from_hours_since_epoch(hours)?),
                    _ => None,
                };
                Ok(ReflectivityEntry {
                    valid_time,
                    zlev: zlevs.get(i).copied().unwrap_or_default(),
                    reflectivity: MaskedField::from_filled(plane.view(), FILL_VALUE),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ReflectivitySeries {
            grid,
            start_date,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn grid() -> TargetGrid {
        TargetGrid::new(array![[-100.0, -99.0]], array![[35.0, 35.0]]).unwrap()
    }

    #[test]
    fn test_two_appends_grow_time_by_one_each() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("refl.nc");
        let t0 = parse_datehour("2020050101")?;
        let t1 = parse_datehour("2020050102")?;

        let first = MaskedField::new(array![[Some(42.0), None]]);
        let second = MaskedField::new(array![[Some(5.0), Some(50.0)]]);

        {
            let mut store = ReflectivityStore::open_or_create(&path, (1, 2))?;
            assert!(store.is_empty());
            assert_eq!(store.append(&grid(), 0, t0, &first)?, 0);
            assert_eq!(store.len(), 1);
        }
        {
            let mut store = ReflectivityStore::open_or_create(&path, (1, 2))?;
            assert_eq!(store.append(&grid(), 3, t1, &second)?, 1);
            assert_eq!(store.len(), 2);
        }

        let series = ReflectivityStore::read_entries(&path)?;
        assert_eq!(series.entries.len(), 2);
        assert_eq!(series.entries[0].reflectivity, first);
        assert_eq!(series.entries[0].zlev, 0);
        assert_eq!(series.entries[1].zlev, 3);
        assert_eq!(series.entry_valid_time(0), Some(t0));
        assert_eq!(series.entry_valid_time(1), Some(t1));
        assert_eq!(series.start_date, Some(t1));
        assert_eq!(series.grid, grid());
        Ok(())
    }

    /// A one-entry file as written before `valid_time` existed
    fn write_undated_series(path: &Path, datehour: &str, dbz: f64) -> Result<()> {
        let mut file = netcdf::create(path)?;
        file.add_unlimited_dimension("Time")?;
        file.add_dimension("south_north", 1)?;
        file.add_dimension("west_east", 2)?;
        file.add_attribute("STARTDATE", datehour)?;

        let dims = ["Time", "south_north", "west_east"];
        file.add_variable::<f64>("XLAT", &dims)?
            .put_values(&[35.0, 35.0], (0..1, 0..1, 0..2))?;
        file.add_variable::<f64>("XLONG", &dims)?
            .put_values(&[-100.0, -99.0], (0..1, 0..1, 0..2))?;
        let mut refl = file.add_variable::<f64>(REFLECTIVITY_VAR, &dims)?;
        refl.set_fill_value(FILL_VALUE)?;
        refl.put_values(&[dbz, FILL_VALUE], (0..1, 0..1, 0..2))?;
        file.add_variable::<i32>("zlev", &["Time"])?
            .put_values(&[0], 0..1)?;
        Ok(())
    }

    #[test]
    fn test_undated_series_reports_startdate_for_latest_entry() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("refl.nc");
        write_undated_series(&path, "2020050101", 42.0)?;

        let series = ReflectivityStore::read_entries(&path)?;
        assert_eq!(series.entries[0].valid_time, None);
        assert_eq!(series.entry_valid_time(0), Some(parse_datehour("2020050101")?));
        Ok(())
    }

    #[test]
    fn test_append_to_undated_series_keeps_old_entry_time() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("refl.nc");
        let t0 = parse_datehour("2020050101")?;
        let t1 = parse_datehour("2020050102")?;
        write_undated_series(&path, "2020050101", 42.0)?;

        {
            let mut store = ReflectivityStore::open_or_create(&path, (1, 2))?;
            assert_eq!(store.len(), 1);
            let field = MaskedField::new(array![[Some(5.0), Some(50.0)]]);
            assert_eq!(store.append(&grid(), 0, t1, &field)?, 1);
        }

        let series = ReflectivityStore::read_entries(&path)?;
        assert_eq!(series.entries.len(), 2);
        assert_eq!(series.entries[0].valid_time, Some(t0));
        assert_eq!(series.entry_valid_time(0), Some(t0));
        assert_eq!(series.entry_valid_time(1), Some(t1));
        assert_eq!(series.start_date, Some(t1));
        assert_eq!(
            series.entries[0].reflectivity,
            MaskedField::new(array![[Some(42.0), None]])
        );
        Ok(())
    }

    #[test]
    fn test_grid_shape_must_match_existing_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("refl.nc");
        ReflectivityStore::open_or_create(&path, (1, 2))?;
        assert!(matches!(
            ReflectivityStore::open_or_create(&path, (2, 2)),
            Err(WrfInterpError::ShapeMismatch { .. })
        ));
        Ok(())
    }
}
