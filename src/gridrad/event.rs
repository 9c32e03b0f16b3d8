//! Hit/miss grids from interpolated reflectivity.

use chrono::NaiveDateTime;
use ndarray::{Array2, ArrayView2, Zip};
use std::path::Path;
use tracing::info;

use super::store::ReflectivityStore;
use crate::error::{Result, WrfInterpError};
use crate::grid::TargetGrid;
use crate::time::ResponseWindow;

/// Cells where any in-window sample exceeded the threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventGrid {
    hits: Array2<bool>,
}

impl EventGrid {
    /// An all-false grid
    pub fn empty(shape: (usize, usize)) -> Self {
        Self {
            hits: Array2::from_elem(shape, false),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.hits.dim()
    }

    pub fn hits(&self) -> ArrayView2<'_, bool> {
        self.hits.view()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|&&h| h).count()
    }

    /// Mark every cell whose sample is strictly above `threshold`.
    ///
    /// Missing and NaN samples never mark a cell, and marked cells stay marked.
    pub fn accumulate(&mut self, samples: ArrayView2<Option<f64>>, threshold: f64) -> Result<()> {
        if samples.dim() != self.hits.dim() {
            return Err(WrfInterpError::ShapeMismatch {
                message: format!(
                    "reflectivity {:?} does not match event grid {:?}",
                    samples.dim(),
                    self.hits.dim()
                ),
            });
        }
        Zip::from(&mut self.hits)
            .and(&samples)
            .for_each(|hit, sample| {
                if matches!(sample, Some(v) if *v > threshold) {
                    *hit = true;
                }
            });
        Ok(())
    }

    /// Write the grid as a `u8` `event_grid` variable beside the grid's coordinates
    pub fn write(&self, path: &Path, grid: &TargetGrid) -> Result<()> {
        if grid.shape() != self.shape() {
            return Err(WrfInterpError::ShapeMismatch {
                message: format!(
                    "event grid {:?} does not match coordinates {:?}",
                    self.shape(),
                    grid.shape()
                ),
            });
        }
        let (ny, nx) = self.shape();
        let mut file = netcdf::create(path)?;
        file.add_dimension("south_north", ny)?;
        file.add_dimension("west_east", nx)?;

        let dims = ["south_north", "west_east"];
        let lats: Vec<f64> = grid.lats().iter().copied().collect();
        let lons: Vec<f64> = grid.lons().iter().copied().collect();
        file.add_variable::<f64>("XLAT", &dims)?.put_values(&lats, ..)?;
        file.add_variable::<f64>("XLONG", &dims)?.put_values(&lons, ..)?;

        let flags: Vec<u8> = self.hits.iter().map(|&h| u8::from(h)).collect();
        let mut var = file.add_variable::<u8>("event_grid", &dims)?;
        var.put_attribute("description", "1 where reflectivity exceeded the threshold")?;
        var.put_values(&flags, ..)?;
        Ok(())
    }
}

/// OR together every stored entry whose valid time is an instant of the
/// response window.
///
/// Entries outside the window are skipped. With no matching entries, or no
/// files at all, the result is an all-false grid of `shape`.
pub fn reflectivity_to_event_grid<P: AsRef<Path>>(
    files: &[P],
    init: NaiveDateTime,
    six_hour: bool,
    response_hours: i64,
    threshold: f64,
    shape: (usize, usize),
) -> Result<EventGrid> {
    let window = ResponseWindow::new(init, six_hour, response_hours);
    let mut events = EventGrid::empty(shape);
    let mut used = 0usize;

    for path in files {
        let path = path.as_ref();
        let series = ReflectivityStore::read_entries(path)?;

        for (i, entry) in series.entries.iter().enumerate() {
            match series.entry_valid_time(i) {
                Some(valid) if window.contains(valid) => {
                    info!(
                        path = %path.display(),
                        valid = %valid,
                        max_reflectivity = ?entry.reflectivity.max(),
                        "Aggregating reflectivity entry"
                    );
                    events.accumulate(entry.reflectivity.values(), threshold)?;
                    used += 1;
                }
                other => {
                    info!(
                        path = %path.display(),
                        entry = i,
                        valid = ?other,
                        "Entry not in response window, skipping"
                    );
                }
            }
        }
    }

    info!(
        entries = used,
        hits = events.hit_count(),
        window = ?window.instants(),
        "Event grid built"
    );
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::MaskedField;
    use crate::time::parse_datehour;
    use ndarray::array;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_accumulate_is_strict_and_monotonic() {
        let mut events = EventGrid::empty((1, 4));
        events
            .accumulate(array![[Some(41.0), Some(40.0), None, Some(f64::NAN)]].view(), 40.0)
            .unwrap();
        assert_eq!(events.hits(), array![[true, false, false, false]]);

        events
            .accumulate(array![[Some(0.0), Some(45.0), None, None]].view(), 40.0)
            .unwrap();
        assert_eq!(events.hits(), array![[true, true, false, false]]);
        assert_eq!(events.hit_count(), 2);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut events = EventGrid::empty((2, 2));
        assert!(events
            .accumulate(array![[Some(50.0)]].view(), 40.0)
            .is_err());
    }

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_skipped_entries_are_logged_at_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refl.nc");
        let grid = TargetGrid::new(array![[-100.0, -99.0]], array![[35.0, 35.0]]).unwrap();
        let valid = parse_datehour("2020050106").unwrap();
        ReflectivityStore::open_or_create(&path, (1, 2))
            .unwrap()
            .append(&grid, 0, valid, &MaskedField::new(array![[Some(50.0), None]]))
            .unwrap();

        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(log.clone())
            .finish();
        let init = parse_datehour("2020050100").unwrap();
        let events = tracing::subscriber::with_default(subscriber, || {
            reflectivity_to_event_grid(&[&path], init, true, 6, 40.0, (1, 2)).unwrap()
        });
        assert_eq!(events.hit_count(), 0);

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output
            .lines()
            .any(|line| line.contains("INFO") && line.contains("not in response window")));
    }

    #[test]
    fn test_no_files_gives_all_false_grid() {
        let init = crate::time::parse_datehour("2020050100").unwrap();
        let files: Vec<&Path> = Vec::new();
        let events = reflectivity_to_event_grid(&files, init, true, 6, 40.0, (3, 5)).unwrap();
        assert_eq!(events.shape(), (3, 5));
        assert_eq!(events.hit_count(), 0);
    }
}
