//! # wrfinterp
//!
//! Interpolate meteorological analyses onto a WRF model grid so they can be
//! compared point by point with ensemble forecasts.
//!
//! ## Key Features
//!
//! - **RAP analyses**: fetch 25 upper-air and surface fields for a valid time
//!   and interpolate them onto the grid of a `wrfout` file
//! - **GridRad reflectivity**: expand the sparse radar volume, interpolate one
//!   level and append it to a per-entry-timestamped time series
//! - **Event grids**: OR-reduce threshold exceedances over a response window
//! - **Plots**: verification maps of interpolated fields and of reflectivity
//!   around a response box
//!
//! ## Architecture
//!
//! - **Interpolation**: Delaunay-based linear interpolation in ECEF x/y, no
//!   extrapolation outside the source hull
//! - **Jobs**: synchronous functions that read NetCDF, interpolate, then write
//!   NetCDF or PNG output

pub mod config;
pub mod data_loader;
pub mod error;
pub mod grid;
pub mod gridrad;
pub mod interpolation;
pub mod logging;
pub mod plotting;
pub mod rap;
pub mod time;

pub use config::Config;
pub use error::{Result, WrfInterpError};
pub use grid::{FieldLabel, TargetGrid};
pub use gridrad::{horiz_interp_and_store_gridrad, reflectivity_to_event_grid, EventGrid};
pub use interpolation::{interpolate_to_grid, GridInterpolator, MaskedField, FILL_VALUE};
pub use logging::{
    generate_run_id, init_tracing, log_error, log_field_stats, log_operation_end,
    log_operation_start, log_timed_operation,
};
pub use plotting::{plot_interp_refl_rbox, plot_rap_interp};
pub use rap::interp_rap_to_wrf;
