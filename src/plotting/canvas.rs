//! Plate carrée map canvas.
//!
//! Fields living on a curvilinear model grid are resampled to pixel centres
//! with the same triangulated linear interpolation used for the analyses,
//! then drawn as filled bands or contour lines.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use ndarray::Array2;
use std::path::Path;
use tracing::debug;

use super::colormap::Colormap;
use crate::error::{Result, WrfInterpError};
use crate::grid::TargetGrid;
use crate::interpolation::{GridInterpolator, MaskedField};

/// Height of the strip reserved below the map for a colorbar
pub const COLORBAR_HEIGHT: u32 = 40;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 128, 0, 255]);
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Longitude/latitude bounds of a map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl MapExtent {
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Result<Self> {
        let finite = [west, east, south, north].iter().all(|v| v.is_finite());
        if !finite || west >= east || south >= north {
            return Err(WrfInterpError::InvalidParameter {
                param: "extent".to_string(),
                message: format!(
                    "[{}, {}, {}, {}] is not a west < east, south < north box",
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

    /// Smallest extent containing every finite point of a grid
    pub fn covering(grid: &TargetGrid) -> Result<Self> {
        let bounds = |values: ndarray::ArrayView2<f64>| {
            values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                })
        };
        let (west, east) = bounds(grid.lons());
        let (south, north) = bounds(grid.lats());
        Self::new(west, east, south, north)
    }
}

/// A resampled field: one value per map pixel, NaN where missing
pub struct PixelField {
    values: Array2<f64>,
}

impl PixelField {
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

/// Pixel stencils of one map size and extent on one grid
pub struct PixelSampler {
    interpolator: GridInterpolator,
}

impl PixelSampler {
    /// Map pixels that fall inside the grid
    pub fn covered_pixels(&self) -> usize {
        self.interpolator.covered_cells()
    }

    pub fn sample(&self, field: &MaskedField) -> Result<PixelField> {
        let values = self.interpolator.interpolate_masked(field.values())?.to_nan_filled();
        Ok(PixelField { values })
    }
}

/// An RGBA image with a geographic extent
pub struct MapCanvas {
    extent: MapExtent,
    width: u32,
    height: u32,
    image: RgbaImage,
}

impl MapCanvas {
    /// A blank map of `width` × `height` pixels, plus a colorbar strip when asked
    pub fn new(extent: MapExtent, width: u32, height: u32, colorbar: bool) -> Self {
        let total_height = if colorbar {
            height + COLORBAR_HEIGHT
        } else {
            height
        };
        Self {
            extent,
            width,
            height,
            image: RgbaImage::from_pixel(width, total_height, BACKGROUND),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixel position of a longitude/latitude, row 0 at the north edge
    pub fn pixel_of(&self, lon: f64, lat: f64) -> (f32, f32) {
        let e = &self.extent;
        let x = (lon - e.west) / (e.east - e.west) * self.width as f64;
        let y = (e.north - lat) / (e.north - e.south) * self.height as f64;
        (x as f32, y as f32)
    }

    fn pixel_centres(&self) -> (Array2<f64>, Array2<f64>) {
        let e = self.extent;
        let shape = (self.height as usize, self.width as usize);
        let dlon = (e.east - e.west) / self.width as f64;
        let dlat = (e.north - e.south) / self.height as f64;
        let lons = Array2::from_shape_fn(shape, |(_, c)| e.west + (c as f64 + 0.5) * dlon);
        let lats = Array2::from_shape_fn(shape, |(r, _)| e.north - (r as f64 + 0.5) * dlat);
        (lons, lats)
    }

    /// Locate the pixel centres of this map on `grid`, for resampling any
    /// number of fields on that grid
    pub fn sampler(&self, grid: &TargetGrid) -> Result<PixelSampler> {
        let (px_lons, px_lats) = self.pixel_centres();
        let interpolator =
            GridInterpolator::new(grid.lons(), grid.lats(), px_lons.view(), px_lats.view())?;
        debug!(
            pixels = px_lons.len(),
            covered = interpolator.covered_cells(),
            "Located map pixels on grid"
        );
        Ok(PixelSampler { interpolator })
    }

    /// Resample a single field on `grid` to the pixel centres of this map
    pub fn sample(&self, grid: &TargetGrid, field: &MaskedField) -> Result<PixelField> {
        self.sampler(grid)?.sample(field)
    }

    /// Paint each pixel with the color of the band its value falls in.
    ///
    /// `levels` holds band edges in ascending order; values outside them
    /// and missing pixels are left untouched.
    pub fn fill_bands(&mut self, field: &PixelField, levels: &[f64], cmap: &dyn Colormap) {
        let bands = levels.len().saturating_sub(1);
        if bands == 0 {
            return;
        }
        let (lo, hi) = (levels[0], levels[bands]);

        for ((row, col), &v) in field.values.indexed_iter() {
            if !v.is_finite() || v < lo || v > hi {
                continue;
            }
            let band = levels[1..bands]
                .iter()
                .take_while(|&&edge| v >= edge)
                .count();
            self.image
                .put_pixel(col as u32, row as u32, band_color(cmap, band, bands));
        }
    }

    /// Draw one horizontal band per interval below the map
    pub fn draw_colorbar(&mut self, bands: usize, cmap: &dyn Colormap) {
        if bands == 0 || self.image.height() < self.height + COLORBAR_HEIGHT {
            return;
        }
        let margin = self.width / 20;
        let span = self.width.saturating_sub(2 * margin).max(1);
        let top = self.height + COLORBAR_HEIGHT / 4;
        let bottom = self.height + COLORBAR_HEIGHT * 3 / 4;

        for x in margin..margin + span {
            let band = (((x - margin) as usize * bands) / span as usize).min(bands - 1);
            let color = band_color(cmap, band, bands);
            for y in top..bottom {
                self.image.put_pixel(x, y, color);
            }
        }
        let outline = Rect::at(margin as i32, top as i32).of_size(span, bottom - top);
        draw_hollow_rect_mut(&mut self.image, outline, BLACK);
    }

    /// Draw iso-lines of a resampled field with marching squares
    pub fn draw_contours(&mut self, field: &PixelField, levels: &[f64], color: Rgba<u8>) {
        for &level in levels {
            let segments = march_squares(&field.values, level);
            debug!(level = level, segments = segments.len(), "Contour level traced");
            for (start, end) in segments {
                draw_line_segment_mut(&mut self.image, start, end, color);
            }
        }
    }

    /// Outline a longitude/latitude box, two pixels wide
    pub fn draw_box(&mut self, west: f64, east: f64, south: f64, north: f64, color: Rgba<u8>) {
        let (x0, y0) = self.pixel_of(west, north);
        let (x1, y1) = self.pixel_of(east, south);
        let width = (x1 - x0).round().max(1.0) as u32;
        let height = (y1 - y0).round().max(1.0) as u32;
        for inset in 0..2u32 {
            let rect = Rect::at(x0.round() as i32 + inset as i32, y0.round() as i32 + inset as i32)
                .of_size(
                    width.saturating_sub(2 * inset).max(1),
                    height.saturating_sub(2 * inset).max(1),
                );
            draw_hollow_rect_mut(&mut self.image, rect, color);
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

fn band_color(cmap: &dyn Colormap, band: usize, bands: usize) -> Rgba<u8> {
    let t = if bands > 1 {
        band as f64 / (bands - 1) as f64
    } else {
        0.5
    };
    Rgba(cmap.map_normalized(t))
}

/// `count` evenly spaced levels spanning the finite values of `field`
pub fn auto_levels(field: &MaskedField, count: usize) -> Result<Vec<f64>> {
    let (min, max) = field.finite_range().ok_or_else(|| WrfInterpError::NothingToContour {
        message: "field has no finite values".to_string(),
    })?;
    if min == max {
        return Err(WrfInterpError::NothingToContour {
            message: format!("field is uniformly {}", min),
        });
    }
    if count < 2 {
        return Err(WrfInterpError::InvalidParameter {
            param: "levels".to_string(),
            message: "at least two levels are needed".to_string(),
        });
    }
    let step = (max - min) / (count - 1) as f64;
    Ok((0..count)
        .map(|i| if i == count - 1 { max } else { min + step * i as f64 })
        .collect())
}

/// Levels `start, start + step, …` strictly below `stop`
pub fn stepped_levels(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || stop <= start {
        return Vec::new();
    }
    let count = ((stop - start) / step).ceil() as usize;
    (0..count).map(|i| start + step * i as f64).collect()
}

type Segment = ((f32, f32), (f32, f32));

/// Marching squares over a NaN-masked grid; cells touching NaN are skipped.
///
/// Segment endpoints are in (column, row) coordinates of `values`.
fn march_squares(values: &Array2<f64>, level: f64) -> Vec<Segment> {
    let (rows, cols) = values.dim();
    if rows < 2 || cols < 2 {
        return Vec::new();
    }
    let mut segments = Vec::new();

    for y in 0..rows - 1 {
        for x in 0..cols - 1 {
            let tl = values[[y, x]];
            let tr = values[[y, x + 1]];
            let bl = values[[y + 1, x]];
            let br = values[[y + 1, x + 1]];
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }
            if case == 0 || case == 15 {
                continue;
            }

            let (fx, fy) = (x as f64, y as f64);
            let top = edge_point((fx, fy), (fx + 1.0, fy), tl, tr, level);
            let right = edge_point((fx + 1.0, fy), (fx + 1.0, fy + 1.0), tr, br, level);
            let bottom = edge_point((fx, fy + 1.0), (fx + 1.0, fy + 1.0), bl, br, level);
            let left = edge_point((fx, fy), (fx, fy + 1.0), tl, bl, level);

            match case {
                1 | 14 => segments.push((left, top)),
                2 | 13 => segments.push((top, right)),
                3 | 12 => segments.push((left, right)),
                4 | 11 => segments.push((right, bottom)),
                5 => {
                    segments.push((left, top));
                    segments.push((right, bottom));
                }
                6 | 9 => segments.push((top, bottom)),
                7 | 8 => segments.push((left, bottom)),
                10 => {
                    segments.push((top, right));
                    segments.push((left, bottom));
                }
                _ => {}
            }
        }
    }
    segments
}

fn edge_point(a: (f64, f64), b: (f64, f64), va: f64, vb: f64, level: f64) -> (f32, f32) {
    let t = if (vb - va).abs() < 1e-12 {
        0.5
    } else {
        ((level - va) / (vb - va)).clamp(0.0, 1.0)
    };
    (
        (a.0 + t * (b.0 - a.0)) as f32,
        (a.1 + t * (b.1 - a.1)) as f32,
    )
}
