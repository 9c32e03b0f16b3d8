//! Configuration management for wrfinterp.
//!
//! Layered configuration with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, WrfInterpError};
use crate::plotting::colormap::is_known_colormap;

/// Default NCEI THREDDS path for RAP 13 km analyses
pub const DEFAULT_RAP_URL_TEMPLATE: &str = "https://www.ncei.noaa.gov/thredds/ncss/grid/rap130anl/{yyyy}{mm}/{yyyy}{mm}{dd}/rap_130_{yyyy}{mm}{dd}_{hhmm}_000.grb2";

/// Command-line arguments for wrfinterp
#[derive(Parser, Debug)]
#[command(name = "wrfinterp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to JSON configuration file
    #[arg(short, long, env = "WRFINTERP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WRFINTERP_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Directory for generated NetCDF files and images
    #[arg(short, long, env = "WRFINTERP_OUTPUT_DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Batch jobs exposed on the command line
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a RAP analysis and interpolate it onto a WRF grid
    Rap {
        /// Analysis time as YYYYMMDDHH
        #[arg(value_parser = parse_datehour_arg)]
        time: NaiveDateTime,
        /// wrfout file providing XLONG/XLAT
        wrfref: PathBuf,
        /// Use an already downloaded NCSS NetCDF file instead of the remote service
        #[arg(long)]
        local: Option<PathBuf>,
    },
    /// Plot one variable of an interpolated RAP file
    PlotRap {
        rapfile: PathBuf,
        /// Storage key of the variable to plot
        #[arg(long, default_value = crate::plotting::rap::DEFAULT_PLOT_VARIABLE)]
        var: String,
    },
    /// Interpolate one GridRad level onto a WRF grid and append it to a time series
    Gridrad {
        gridrad_file: PathBuf,
        interpto_file: PathBuf,
        out_file: PathBuf,
        /// Zero-based vertical level
        #[arg(long, default_value_t = 0)]
        zlev: usize,
    },
    /// Build a hit/miss grid from interpolated reflectivity files
    EventGrid {
        /// Model initialization time as YYYYMMDDHH
        #[arg(long, value_parser = parse_datehour_arg)]
        init: NaiveDateTime,
        /// Response time in hours after initialization
        #[arg(long)]
        rtime: i64,
        /// Aggregate over the six-hour window instead of a single hour
        #[arg(long)]
        six_hour: bool,
        /// Reflectivity threshold (dBZ)
        #[arg(long, default_value_t = 40.0)]
        threshold: f64,
        /// Where to write the event grid
        #[arg(long)]
        out_file: PathBuf,
        /// Interpolated GridRad files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Plot interpolated reflectivity around a response box
    PlotRefl {
        gridrad_interpfile: PathBuf,
        rboxpath: PathBuf,
        /// First analysis hour in the file as YYYYMMDDHH
        #[arg(value_parser = parse_datehour_arg)]
        analysis_time: NaiveDateTime,
    },
}

fn parse_datehour_arg(value: &str) -> std::result::Result<NaiveDateTime, String> {
    crate::time::parse_datehour(value).map_err(|e| e.to_string())
}

/// Remote analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RapConfig {
    /// URL template with {yyyy}, {mm}, {dd} and {hhmm} placeholders
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Query string appended to the dataset URL
    #[serde(default = "default_query")]
    pub query: String,

    /// Request timeout in seconds (None = wait indefinitely)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for files whose names are derived from their contents
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

/// Plot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Image width in pixels
    #[serde(default = "default_image_size")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_image_size")]
    pub height: u32,

    /// Longitude margin around the response box (degrees)
    #[serde(default = "default_margin_lon")]
    pub margin_lon: f64,

    /// Latitude margin around the response box (degrees)
    #[serde(default = "default_margin_lat")]
    pub margin_lat: f64,

    /// Number of filled-contour levels for auto-scaled plots
    #[serde(default = "default_filled_levels")]
    pub filled_levels: usize,

    /// Colormap for interpolated RAP fields
    #[serde(default = "default_field_colormap")]
    pub field_colormap: String,

    /// Colormap for reflectivity
    #[serde(default = "default_reflectivity_colormap")]
    pub reflectivity_colormap: String,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rap: RapConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub plot: PlotConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        if let Some(level) = &cli.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &cli.output_dir {
            config.output.directory = dir.clone();
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.rap.url_template = other.rap.url_template;
        self.rap.query = other.rap.query;
        if other.rap.timeout_secs.is_some() {
            self.rap.timeout_secs = other.rap.timeout_secs;
        }
        self.output = other.output;
        self.plot = other.plot;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for placeholder in ["{yyyy}", "{mm}", "{dd}", "{hhmm}"] {
            if !self.rap.url_template.contains(placeholder) {
                return Err(WrfInterpError::Config {
                    message: format!("RAP url_template is missing {}", placeholder),
                });
            }
        }

        if self.rap.timeout_secs == Some(0) {
            return Err(WrfInterpError::Config {
                message: "RAP timeout_secs cannot be 0".to_string(),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(WrfInterpError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(WrfInterpError::Config {
                message: "Plot width and height must be positive".to_string(),
            });
        }

        if self.plot.filled_levels < 2 {
            return Err(WrfInterpError::Config {
                message: "At least two filled-contour levels are required".to_string(),
            });
        }

        if self.plot.margin_lon < 0.0 || self.plot.margin_lat < 0.0 {
            return Err(WrfInterpError::Config {
                message: "Plot margins cannot be negative".to_string(),
            });
        }

        for name in [&self.plot.field_colormap, &self.plot.reflectivity_colormap] {
            if !is_known_colormap(name) {
                return Err(WrfInterpError::Config {
                    message: format!("Unknown colormap: {}", name),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rap: RapConfig::default(),
            output: OutputConfig::default(),
            plot: PlotConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for RapConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            query: default_query(),
            timeout_secs: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_image_size(),
            height: default_image_size(),
            margin_lon: default_margin_lon(),
            margin_lat: default_margin_lat(),
            filled_levels: default_filled_levels(),
            field_colormap: default_field_colormap(),
            reflectivity_colormap: default_reflectivity_colormap(),
        }
    }
}

// Default value functions for serde
fn default_url_template() -> String {
    DEFAULT_RAP_URL_TEMPLATE.to_string()
}

fn default_query() -> String {
    "var=all&addLatLon=true&accept=netcdf".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_image_size() -> u32 {
    1000
}

fn default_margin_lon() -> f64 {
    10.0
}

fn default_margin_lat() -> f64 {
    5.0
}

fn default_filled_levels() -> usize {
    21
}

fn default_field_colormap() -> String {
    "viridis".to_string()
}

fn default_reflectivity_colormap() -> String {
    "turbo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
