//! Verification plots of interpolated RAP fields.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use super::canvas::{auto_levels, stepped_levels, MapCanvas, MapExtent, BLACK};
use super::colormap::get_colormap;
use crate::config::PlotConfig;
use crate::error::Result;
use crate::grid::FieldLabel;
use crate::logging::{log_operation_end, log_operation_start};
use crate::rap::read_interpolated;

/// Storage key plotted when none is given
pub const DEFAULT_PLOT_VARIABLE: &str = "500_hPa_GPH";

/// 500 hPa height contours, 5280 m to 5880 m every 60 m
pub fn gph_500_levels() -> Vec<f64> {
    stepped_levels(5280.0, 5940.0, 60.0)
}

pub fn rap_plot_filename(key: &str) -> String {
    format!("RAP_Analysis_{}.png", key)
}

/// Render one variable of an interpolated RAP file.
///
/// The 500 hPa height is drawn as black contour lines at fixed heights;
/// any other variable as auto-scaled filled bands with a colorbar.
pub fn plot_rap_interp(
    rapfile: &Path,
    key: &str,
    output_dir: &Path,
    config: &PlotConfig,
) -> Result<PathBuf> {
    let start = Instant::now();
    log_operation_start("plot_rap", Some(key));

    let (grid, field) = read_interpolated(rapfile, key)?;
    let title = match FieldLabel::from_storage_key(key) {
        Ok(label) => format!("RAP Analysis {}", label),
        Err(_) => format!("RAP Analysis {}", key),
    };

    let extent = MapExtent::covering(&grid)?;
    let contour_lines = key == DEFAULT_PLOT_VARIABLE;
    let mut canvas = MapCanvas::new(extent, config.width, config.height, !contour_lines);
    let pixels = canvas.sample(&grid, &field)?;

    if contour_lines {
        canvas.draw_contours(&pixels, &gph_500_levels(), BLACK);
    } else {
        let levels = auto_levels(&field, config.filled_levels)?;
        let cmap = get_colormap(&config.field_colormap)?;
        canvas.fill_bands(&pixels, &levels, cmap.as_ref());
        canvas.draw_colorbar(levels.len() - 1, cmap.as_ref());
        info!(
            min = levels[0],
            max = levels[levels.len() - 1],
            colormap = cmap.name(),
            "Filled contour levels"
        );
    }

    let out_path = output_dir.join(rap_plot_filename(key));
    canvas.save(&out_path)?;
    info!(title = %title, path = %out_path.display(), "Saved RAP plot");

    log_operation_end("plot_rap", start, true);
    Ok(out_path)
}
