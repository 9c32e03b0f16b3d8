//! Test data generation utilities.
//!
//! Each function writes a small NetCDF file laid out like the real product:
//! a wrfout reference grid, a RAP NetCDF Subset Service response and a sparse
//! GridRad volume.

use netcdf::Error;
use std::path::Path;

type Result<T> = std::result::Result<T, Error>;

/// Target grid: 8 rows × 10 columns, 0.5° spacing from (-104 °E, 32 °N)
pub const WRF_SHAPE: (usize, usize) = (8, 10);

/// Constant sea-level pressure in the RAP fixture
pub const RAP_SLP: f64 = 101325.0;

/// Pressure levels (Pa) written to the RAP fixture by default
pub const RAP_ISOBARIC: [f64; 6] = [30000.0, 50000.0, 70000.0, 85000.0, 92500.0, 100000.0];

/// South-west corner of the wide wrfout fixture, 1° spacing
pub const WIDE_WRF_ORIGIN: (f64, f64) = (-110.5, 26.5);

/// Creates a wrfout-like file with `XLONG`/`XLAT` on (Time, south_north, west_east).
pub fn create_wrfout_nc(path: &Path) -> Result<()> {
    create_wrfout_grid(path, (-104.0, 32.0), 0.5)
}

/// Creates a wrfout grid spanning -110.5..-101.5 °E and 26.5..33.5 °N.
///
/// Its western columns and southern rows fall outside both the RAP and the
/// GridRad fixtures.
pub fn create_wide_wrfout_nc(path: &Path) -> Result<()> {
    create_wrfout_grid(path, WIDE_WRF_ORIGIN, 1.0)
}

fn create_wrfout_grid(path: &Path, (west, south): (f64, f64), step: f64) -> Result<()> {
    let (ny, nx) = WRF_SHAPE;
    let mut file = netcdf::create(path)?;

    file.add_unlimited_dimension("Time")?;
    file.add_dimension("south_north", ny)?;
    file.add_dimension("west_east", nx)?;
    file.add_attribute("TITLE", "OUTPUT FROM WRF V4.1 MODEL")?;

    let lons: Vec<f32> = (0..ny * nx)
        .map(|i| (west + step * (i % nx) as f64) as f32)
        .collect();
    let lats: Vec<f32> = (0..ny * nx)
        .map(|i| (south + step * (i / nx) as f64) as f32)
        .collect();

    let dims = ["Time", "south_north", "west_east"];
    {
        let mut var = file.add_variable::<f32>("XLONG", &dims)?;
        var.put_attribute("units", "degree_east")?;
        var.put_values(&lons, (0..1, 0..ny, 0..nx))?;
    }
    {
        let mut var = file.add_variable::<f32>("XLAT", &dims)?;
        var.put_attribute("units", "degree_north")?;
        var.put_values(&lats, (0..1, 0..ny, 0..nx))?;
    }
    Ok(())
}

/// Creates a RAP analysis as served by NCSS with `addLatLon=true`.
///
/// The grid spans -108..-95 °E and 28..39 °N at 1°, enclosing the wrfout
/// fixture. Heights grow eastwards so 500 hPa GPH crosses the standard
/// contour levels; sea-level pressure is constant.
pub fn create_rap_nc(path: &Path, isobaric: &[f64]) -> Result<()> {
    let (ny, nx) = (12usize, 14usize);
    let mut file = netcdf::create(path)?;

    file.add_dimension("time", 1)?;
    file.add_dimension("isobaric", isobaric.len())?;
    file.add_dimension("height_above_ground", 1)?;
    file.add_dimension("height_above_ground4", 1)?;
    file.add_dimension("y", ny)?;
    file.add_dimension("x", nx)?;

    let lons: Vec<f64> = (0..ny * nx).map(|i| -108.0 + (i % nx) as f64).collect();
    let lats: Vec<f64> = (0..ny * nx).map(|i| 28.0 + (i / nx) as f64).collect();
    file.add_variable::<f64>("lon", &["y", "x"])?.put_values(&lons, ..)?;
    file.add_variable::<f64>("lat", &["y", "x"])?.put_values(&lats, ..)?;

    file.add_variable::<f32>("isobaric", &["isobaric"])?
        .put_values(&isobaric.iter().map(|&v| v as f32).collect::<Vec<_>>(), ..)?;
    file.add_variable::<f32>("height_above_ground", &["height_above_ground"])?
        .put_values(&[2.0f32], ..)?;
    file.add_variable::<f32>("height_above_ground4", &["height_above_ground4"])?
        .put_values(&[10.0f32], ..)?;

    let plane = ny * nx;
    let isobaric_field = |base: f64, per_column: f64| -> Vec<f32> {
        (0..isobaric.len() * plane)
            .map(|i| {
                let level = (i / plane) as f64;
                let col = (i % nx) as f64;
                (base + 100.0 * level + per_column * col) as f32
            })
            .collect()
    };

    // 500 hPa sits at level index 1: heights 5300 + 100 + 40·col
    let isobaric_dims = ["time", "isobaric", "y", "x"];
    for (name, base, slope) in [
        ("Geopotential_height_isobaric", 5300.0, 40.0),
        ("Temperature_isobaric", 250.0, 0.5),
        ("u-component_of_wind_isobaric", 10.0, 1.0),
        ("v-component_of_wind_isobaric", -5.0, 0.5),
    ] {
        file.add_variable::<f32>(name, &isobaric_dims)?
            .put_values(&isobaric_field(base, slope), ..)?;
    }

    let surface_field = |base: f64, per_column: f64| -> Vec<f32> {
        (0..plane)
            .map(|i| (base + per_column * (i % nx) as f64) as f32)
            .collect()
    };
    for (name, dim, base, slope) in [
        ("Temperature_height_above_ground", "height_above_ground", 295.0, 0.25),
        ("Specific_humidity_height_above_ground", "height_above_ground", 0.012, 0.0),
        ("Dewpoint_temperature_height_above_ground", "height_above_ground", 285.0, -0.5),
        ("u-component_of_wind_height_above_ground", "height_above_ground4", 3.0, 0.1),
        ("v-component_of_wind_height_above_ground", "height_above_ground4", 4.0, 0.1),
    ] {
        file.add_variable::<f32>(name, &["time", dim, "y", "x"])?
            .put_values(&surface_field(base, slope), ..)?;
    }

    file.add_variable::<f64>("MSLP_MAPS_System_Reduction_msl", &["time", "y", "x"])?
        .put_values(&vec![RAP_SLP; plane], ..)?;

    Ok(())
}

/// Creates a GridRad file whose level-0 cells all hold `level0_dbz`.
///
/// Longitudes are stored 0–360 °E (255..264.5), latitudes 31..36.5, three
/// altitude levels. With `None` the only echo is one cell on the top level,
/// leaving level 0 empty.
pub fn create_gridrad_nc(path: &Path, datehour: &str, level0_dbz: Option<f32>) -> Result<()> {
    let (nlon, nlat, nalt) = (20usize, 12usize, 3usize);
    let mut file = netcdf::create(path)?;

    file.add_dimension("Longitude", nlon)?;
    file.add_dimension("Latitude", nlat)?;
    file.add_dimension("Altitude", nalt)?;
    file.add_attribute("datehour", datehour)?;

    let lons: Vec<f64> = (0..nlon).map(|i| 255.0 + 0.5 * i as f64).collect();
    let lats: Vec<f64> = (0..nlat).map(|j| 31.0 + 0.5 * j as f64).collect();
    let alts: Vec<f64> = (0..nalt).map(|k| 1.0 + k as f64).collect();
    file.add_variable::<f64>("Longitude", &["Longitude"])?.put_values(&lons, ..)?;
    file.add_variable::<f64>("Latitude", &["Latitude"])?.put_values(&lats, ..)?;
    file.add_variable::<f64>("Altitude", &["Altitude"])?.put_values(&alts, ..)?;

    let (index, values): (Vec<i64>, Vec<f32>) = match level0_dbz {
        Some(dbz) => ((0..(nlat * nlon) as i64).map(|i| (i, dbz)).unzip()),
        None => (vec![((nalt - 1) * nlat * nlon) as i64], vec![30.0]),
    };
    file.add_dimension("Index", index.len())?;
    file.add_variable::<i64>("index", &["Index"])?.put_values(&index, ..)?;
    file.add_variable::<f32>("Reflectivity", &["Index"])?.put_values(&values, ..)?;

    Ok(())
}

/// Writes a sensitivity input file with the response box on data rows 4–7
pub fn create_rbox_file(path: &Path, west: f64, east: f64, south: f64, north: f64) -> std::io::Result<()> {
    let text = format!(
        "# sensitivity input\n2020050100\n6\n12\n1\n{}\n{}\n{}\n{}\n500 hPa GPH\n",
        west, east, south, north
    );
    std::fs::write(path, text)
}
