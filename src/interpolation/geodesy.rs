//! Geographic to Earth-Centered, Earth-Fixed conversion.
//!
//! Source and target grids are compared in ECEF metres so that distances are
//! consistent regardless of the native map projection of either grid.

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{Result, WrfInterpError};

/// WGS84 semi-major axis in metres
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// A point in the ECEF frame (metres)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Convert a geodetic position (degrees, metres) to ECEF on the WGS84 ellipsoid
pub fn to_ecef(lon_deg: f64, lat_deg: f64, alt_m: f64) -> Ecef {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    // Prime vertical radius of curvature
    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    Ecef {
        x: (n + alt_m) * cos_lat * cos_lon,
        y: (n + alt_m) * cos_lat * sin_lon,
        z: (n * (1.0 - e2) + alt_m) * sin_lat,
    }
}

/// ECEF x and y planes of a surface (zero altitude) lon/lat grid
#[derive(Debug, Clone)]
pub struct EcefPlane {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

/// Convert 2-D longitude/latitude arrays to their ECEF x/y components
pub fn grid_to_ecef(lons: ArrayView2<f64>, lats: ArrayView2<f64>) -> Result<EcefPlane> {
    if lons.dim() != lats.dim() {
        return Err(WrfInterpError::ShapeMismatch {
            message: format!(
                "longitude grid {:?} and latitude grid {:?} differ",
                lons.dim(),
                lats.dim()
            ),
        });
    }

    let mut x = Array2::zeros(lons.dim());
    let mut y = Array2::zeros(lons.dim());
    Zip::from(&mut x)
        .and(&mut y)
        .and(&lons)
        .and(&lats)
        .for_each(|x, y, &lon, &lat| {
            let p = to_ecef(lon, lat, 0.0);
            *x = p.x;
            *y = p.y;
        });

    Ok(EcefPlane { x, y })
}
