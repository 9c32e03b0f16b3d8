//! Error types for wrfinterp.
//!
//! A single error enum covers every failure the interpolation jobs can hit:
//! file and network I/O, missing variables or levels in the inputs, and
//! rendering problems.

use thiserror::Error;

/// The main error type for wrfinterp operations.
#[derive(Error, Debug)]
pub enum WrfInterpError {
    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote analysis request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Array shape errors raised by ndarray
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// PNG encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A variable the job needs is absent from the input file
    #[error("Variable '{name}' not found in {source_name}")]
    MissingVariable { name: String, source_name: String },

    /// A vertical level lookup by exact value found nothing
    #[error("Level {value} not present in coordinate '{coordinate}'")]
    LevelNotFound { coordinate: String, value: f64 },

    /// Arrays that must share a shape do not
    #[error("Shape mismatch: {message}")]
    ShapeMismatch { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// The triangulation of the source points could not be built
    #[error("Triangulation error: {message}")]
    Triangulation { message: String },

    /// Malformed date/time values
    #[error("Invalid time '{value}': {message}")]
    InvalidTime { value: String, message: String },

    /// The response box file could not be parsed
    #[error("Response box error: {message}")]
    ResponseBox { message: String },

    /// A field has no finite, non-uniform range to contour
    #[error("Nothing to contour: {message}")]
    NothingToContour { message: String },
}

/// Convenience type alias for Results with WrfInterpError
pub type Result<T> = std::result::Result<T, WrfInterpError>;
