//! Reflectivity maps around a response box.

use chrono::{Duration, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use super::canvas::{auto_levels, MapCanvas, MapExtent, GREEN};
use super::colormap::get_colormap;
use crate::config::PlotConfig;
use crate::error::{Result, WrfInterpError};
use crate::gridrad::ReflectivityStore;
use crate::logging::{log_operation_end, log_operation_start};
use crate::time::format_valid_stamp;

/// Data rows (zero-based, after comments and blank lines) holding the box
const BOX_ROWS: std::ops::Range<usize> = 4..8;

/// Bounds of the sensitivity response box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl ResponseBox {
    /// Parse a sensitivity input file.
    ///
    /// Blank lines and `#` comments are ignored; the first value of data rows
    /// 4 through 7 are west, east, south and north.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .collect();

        if rows.len() < BOX_ROWS.end {
            return Err(WrfInterpError::ResponseBox {
                message: format!(
                    "expected at least {} data rows, found {}",
                    BOX_ROWS.end,
                    rows.len()
                ),
            });
        }

        let mut bounds = [0.0; 4];
        for (slot, row) in bounds.iter_mut().zip(&rows[BOX_ROWS]) {
            let token = row.split_whitespace().next().unwrap_or("");
            *slot = token.parse().map_err(|_| WrfInterpError::ResponseBox {
                message: format!("'{}' is not a number", token),
            })?;
        }
        let [west, east, south, north] = bounds;

        if west >= east || south >= north {
            return Err(WrfInterpError::ResponseBox {
                message: format!(
                    "box west {} east {} south {} north {} is empty",
                    west, east, south, north
                ),
            });
        }
        Ok(Self {
            west,
            east,
            south,
            north,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Map extent reaching `margin_lon`/`margin_lat` degrees past the box
    pub fn extent(&self, margin_lon: f64, margin_lat: f64) -> Result<MapExtent> {
        MapExtent::new(
            self.west - margin_lon,
            self.east + margin_lon,
            self.south - margin_lat,
            self.north + margin_lat,
        )
    }
}

/// Image name for one entry; `zlev` is zero-based and shown one-based
pub fn region_plot_filename(zlev: i32, valid: NaiveDateTime) -> String {
    format!(
        "interp_gridrad_zlev{}_valid{}.png",
        zlev + 1,
        format_valid_stamp(valid)
    )
}

/// Render every entry of a reflectivity series around the response box.
///
/// Entries without a stored valid time are dated `analysis_time` plus one
/// hour per index. An entry with nothing to contour is still written, with
/// only the box drawn.
pub fn plot_interp_refl_rbox(
    gridrad_interpfile: &Path,
    rboxpath: &Path,
    analysis_time: NaiveDateTime,
    output_dir: &Path,
    config: &PlotConfig,
) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    log_operation_start("plot_refl", Some(&gridrad_interpfile.display().to_string()));

    let rbox = ResponseBox::from_file(rboxpath)?;
    let extent = rbox.extent(config.margin_lon, config.margin_lat)?;
    let series = ReflectivityStore::read_entries(gridrad_interpfile)?;
    let cmap = get_colormap(&config.reflectivity_colormap)?;

    // Every frame shares one size and extent
    let sampler =
        MapCanvas::new(extent, config.width, config.height, true).sampler(&series.grid)?;

    let mut written = Vec::with_capacity(series.entries.len());
    let mut skipped = 0usize;

    for (i, entry) in series.entries.iter().enumerate() {
        let valid = entry
            .valid_time
            .unwrap_or(analysis_time + Duration::hours(i as i64));
        info!(
            valid = %valid,
            max_reflectivity = ?entry.reflectivity.max(),
            "Plotting reflectivity entry"
        );

        let mut canvas = MapCanvas::new(extent, config.width, config.height, true);
        match auto_levels(&entry.reflectivity, config.filled_levels) {
            Ok(levels) => {
                let pixels = sampler.sample(&entry.reflectivity)?;
                canvas.fill_bands(&pixels, &levels, cmap.as_ref());
                canvas.draw_colorbar(levels.len() - 1, cmap.as_ref());
                info!(
                    title = %format!(
                        "Interpolated GridRad Vertical-Level-{} Reflectivity Data valid {}",
                        entry.zlev + 1,
                        format_valid_stamp(valid)
                    ),
                    "Rendered reflectivity"
                );
            }
            Err(WrfInterpError::NothingToContour { message }) => {
                warn!(valid = %valid, reason = %message, "No values to contour");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
        canvas.draw_box(rbox.west, rbox.east, rbox.south, rbox.north, GREEN);

        let out_path = output_dir.join(region_plot_filename(entry.zlev, valid));
        canvas.save(&out_path)?;
        written.push(out_path);
    }

    info!(
        images = written.len(),
        without_data = skipped,
        "Reflectivity region plots written"
    );
    log_operation_end("plot_refl", start, skipped == 0);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_datehour;
    use pretty_assertions::assert_eq;

    const SENS_INPUT: &str = "\
# ensemble sensitivity input
20200501
00
12
6

-100.0   west
-95.5
33.0
37.25
500 hPa GPH
";

    #[test]
    fn test_parse_response_box() {
        let rbox = ResponseBox::parse(SENS_INPUT).unwrap();
        assert_eq!(
            rbox,
            ResponseBox {
                west: -100.0,
                east: -95.5,
                south: 33.0,
                north: 37.25,
            }
        );
        let extent = rbox.extent(10.0, 5.0).unwrap();
        assert_eq!((extent.west, extent.east), (-110.0, -85.5));
        assert_eq!((extent.south, extent.north), (28.0, 42.25));
    }

    #[test]
    fn test_parse_rejects_short_or_bad_files() {
        assert!(ResponseBox::parse("1\n2\n3\n").is_err());
        assert!(ResponseBox::parse("0\n0\n0\n0\nwest\n1\n2\n3\n").is_err());
        assert!(ResponseBox::parse("0\n0\n0\n0\n5\n1\n2\n3\n").is_err());
    }

    #[test]
    fn test_region_plot_filename() {
        let t = parse_datehour("2020050106").unwrap();
        assert_eq!(
            region_plot_filename(0, t),
            "interp_gridrad_zlev1_valid2020-05-01_06:00:00.png"
        );
    }
}
