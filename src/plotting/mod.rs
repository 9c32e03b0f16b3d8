//! PNG plots of interpolated fields.
//!
//! Maps are drawn in plate carrée. Titles are reported through the log
//! rather than rendered into the image.

pub mod canvas;
pub mod colormap;
pub mod rap;
pub mod region;

pub use canvas::{MapCanvas, MapExtent, PixelSampler};
pub use colormap::{get_colormap, is_known_colormap, Colormap};
pub use rap::{plot_rap_interp, DEFAULT_PLOT_VARIABLE};
pub use region::{plot_interp_refl_rbox, ResponseBox};
