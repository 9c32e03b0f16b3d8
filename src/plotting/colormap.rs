//! Colormap trait and the named gradients behind it.

use crate::error::{Result, WrfInterpError};

/// Names accepted by [`get_colormap`]
pub const COLORMAP_NAMES: [&str; 9] = [
    "viridis", "plasma", "inferno", "magma", "cividis", "turbo", "rainbow", "spectral", "rdbu",
];

/// Trait for color mapping implementations
pub trait Colormap {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// A colormap backed by a `colorgrad` preset
pub struct GradientColormap {
    name: &'static str,
    gradient: colorgrad::Gradient,
}

impl Colormap for GradientColormap {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        self.gradient.at(value.clamp(0.0, 1.0)).to_rgba8()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Whether `name` is a colormap [`get_colormap`] can build
pub fn is_known_colormap(name: &str) -> bool {
    COLORMAP_NAMES.contains(&name.to_lowercase().as_str())
}

/// Get a colormap by name
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    let lower = name.to_lowercase();
    let (name, gradient) = match lower.as_str() {
        "viridis" => ("viridis", colorgrad::viridis()),
        "plasma" => ("plasma", colorgrad::plasma()),
        "inferno" => ("inferno", colorgrad::inferno()),
        "magma" => ("magma", colorgrad::magma()),
        "cividis" => ("cividis", colorgrad::cividis()),
        "turbo" => ("turbo", colorgrad::turbo()),
        "rainbow" => ("rainbow", colorgrad::rainbow()),
        "spectral" => ("spectral", colorgrad::spectral()),
        "rdbu" => ("rdbu", colorgrad::rd_bu()),
        _ => {
            return Err(WrfInterpError::InvalidParameter {
                param: "colormap".to_string(),
                message: format!("Unknown colormap: {}", name),
            })
        }
    };
    Ok(Box::new(GradientColormap { name, gradient }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_name_builds() {
        for name in COLORMAP_NAMES {
            let cmap = get_colormap(name).unwrap();
            assert_eq!(cmap.name(), name);
            assert_eq!(cmap.map_normalized(0.3)[3], 255);
        }
        assert!(get_colormap("Viridis").is_ok());
        assert!(get_colormap("pyart_HomeyerRainbow").is_err());
    }

    #[test]
    fn test_map_clamps_and_handles_flat_range() {
        let cmap = get_colormap("viridis").unwrap();
        assert_eq!(cmap.map(-10.0, 0.0, 1.0), cmap.map_normalized(0.0));
        assert_eq!(cmap.map(10.0, 0.0, 1.0), cmap.map_normalized(1.0));
        assert_eq!(cmap.map(3.0, 3.0, 3.0), cmap.map_normalized(0.5));
        assert_ne!(cmap.map_normalized(0.0), cmap.map_normalized(1.0));
    }
}
