//! The RAP variables interpolated for sensitivity verification.

use ndarray::Array2;

use crate::data_loader::{exact_level_index, read_1d, read_plane, require_variable};
use crate::error::{Result, WrfInterpError};
use crate::grid::FieldLabel;

/// Vertical coordinate of a RAP field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalLevel {
    /// Pressure level in Pa, looked up in the `isobaric` coordinate
    Isobaric(f64),
    /// Height above ground in metres, looked up in the named coordinate
    AboveGround {
        coordinate: &'static str,
        meters: f64,
    },
    /// Field without a vertical dimension
    Single,
}

impl VerticalLevel {
    /// Name of the coordinate variable and the value to match exactly
    pub fn coordinate(&self) -> Option<(&'static str, f64)> {
        match *self {
            VerticalLevel::Isobaric(pa) => Some(("isobaric", pa)),
            VerticalLevel::AboveGround { coordinate, meters } => Some((coordinate, meters)),
            VerticalLevel::Single => None,
        }
    }
}

/// One output variable: its label, source variable and level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisField {
    pub label: &'static str,
    pub variable: &'static str,
    pub level: VerticalLevel,
}

const GPH: &str = "Geopotential_height_isobaric";
const TEMP: &str = "Temperature_isobaric";
const UWIND: &str = "u-component_of_wind_isobaric";
const VWIND: &str = "v-component_of_wind_isobaric";
const SLP: &str = "MSLP_MAPS_System_Reduction_msl";
const T_AGL: &str = "Temperature_height_above_ground";
const Q_AGL: &str = "Specific_humidity_height_above_ground";
const TD_AGL: &str = "Dewpoint_temperature_height_above_ground";
const U_AGL: &str = "u-component_of_wind_height_above_ground";
const V_AGL: &str = "v-component_of_wind_height_above_ground";

const TWO_METRE: VerticalLevel = VerticalLevel::AboveGround {
    coordinate: "height_above_ground",
    meters: 2.0,
};
const TEN_METRE: VerticalLevel = VerticalLevel::AboveGround {
    coordinate: "height_above_ground4",
    meters: 10.0,
};

const fn isobaric(label: &'static str, variable: &'static str, pa: f64) -> AnalysisField {
    AnalysisField {
        label,
        variable,
        level: VerticalLevel::Isobaric(pa),
    }
}

const fn above_ground(
    label: &'static str,
    variable: &'static str,
    level: VerticalLevel,
) -> AnalysisField {
    AnalysisField {
        label,
        variable,
        level,
    }
}

/// Every field written to an interpolated RAP file, in file order
pub const RAP_FIELDS: [AnalysisField; 25] = [
    isobaric("300 hPa GPH", GPH, 30000.0),
    isobaric("500 hPa GPH", GPH, 50000.0),
    isobaric("700 hPa GPH", GPH, 70000.0),
    isobaric("850 hPa GPH", GPH, 85000.0),
    isobaric("300 hPa T", TEMP, 30000.0),
    isobaric("500 hPa T", TEMP, 50000.0),
    isobaric("700 hPa T", TEMP, 70000.0),
    isobaric("850 hPa T", TEMP, 85000.0),
    isobaric("925 hPa T", TEMP, 92500.0),
    isobaric("300 hPa U-Wind", UWIND, 30000.0),
    isobaric("500 hPa U-Wind", UWIND, 50000.0),
    isobaric("700 hPa U-Wind", UWIND, 70000.0),
    isobaric("850 hPa U-Wind", UWIND, 85000.0),
    isobaric("925 hPa U-Wind", UWIND, 92500.0),
    isobaric("300 hPa V-Wind", VWIND, 30000.0),
    isobaric("500 hPa V-Wind", VWIND, 50000.0),
    isobaric("700 hPa V-Wind", VWIND, 70000.0),
    isobaric("850 hPa V-Wind", VWIND, 85000.0),
    isobaric("925 hPa V-Wind", VWIND, 92500.0),
    above_ground("SLP", SLP, VerticalLevel::Single),
    above_ground("2m Temp", T_AGL, TWO_METRE),
    above_ground("2m Q", Q_AGL, TWO_METRE),
    above_ground("2m Dewpt", TD_AGL, TWO_METRE),
    above_ground("10m U-Wind", U_AGL, TEN_METRE),
    above_ground("10m V-Wind", V_AGL, TEN_METRE),
];

impl AnalysisField {
    pub fn field_label(&self) -> Result<FieldLabel> {
        FieldLabel::new(self.label)
    }

    /// Read this field's (y, x) plane at the first time from an analysis file
    pub fn extract(&self, file: &netcdf::File, source_name: &str) -> Result<Array2<f64>> {
        let var = require_variable(file, self.variable, source_name)?;

        match self.level.coordinate() {
            Some((coordinate, value)) => {
                let levels = read_1d(&require_variable(file, coordinate, source_name)?)?;
                let index = exact_level_index(coordinate, &levels.to_vec(), value)?;
                read_plane(&var, &[0, index])
            }
            None => match var.dimensions().len() {
                3 => read_plane(&var, &[0]),
                2 => read_plane(&var, &[]),
                n => Err(WrfInterpError::ShapeMismatch {
                    message: format!("single-level variable {} has {} dimensions", self.variable, n),
                }),
            },
        }
    }
}
