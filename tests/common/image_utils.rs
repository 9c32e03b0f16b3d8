//! Image inspection utilities for testing.

use image::{DynamicImage, GenericImageView, ImageError, Rgba};
use std::path::Path;

/// Load an image from a file
pub fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    image::open(path)
}

/// Count pixels exactly matching `color`
pub fn count_pixels(image: &DynamicImage, color: Rgba<u8>) -> usize {
    image.pixels().filter(|(_, _, p)| *p == color).count()
}

/// Count pixels that are neither white background nor `except`
pub fn count_painted_pixels(image: &DynamicImage, except: &[Rgba<u8>]) -> usize {
    let white = Rgba([255, 255, 255, 255]);
    image
        .pixels()
        .filter(|(_, _, p)| *p != white && !except.contains(p))
        .count()
}

/// Check the dimensions of an image
pub fn assert_image_dimensions(
    image: &DynamicImage,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), String> {
    let (actual_width, actual_height) = image.dimensions();

    if actual_width != expected_width || actual_height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            actual_width, actual_height, expected_width, expected_height
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_pixel_counts() {
        let mut img = ImageBuffer::from_pixel(3, 2, Rgba([255u8, 255, 255, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 128, 0, 255]));
        let img = DynamicImage::ImageRgba8(img);

        assert_eq!(count_pixels(&img, Rgba([0, 0, 0, 255])), 1);
        assert_eq!(count_painted_pixels(&img, &[Rgba([0, 128, 0, 255])]), 1);
        assert!(assert_image_dimensions(&img, 3, 2).is_ok());
    }
}
