//! Pixel buffer helpers on top of the `image` crate

use crate::geometry::Size;
use image::{imageops, DynamicImage, RgbImage, RgbaImage};

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Drop the alpha channel of a captured surface
    pub fn rgba_to_rgb(rgba_image: RgbaImage) -> RgbImage {
        DynamicImage::ImageRgba8(rgba_image).to_rgb8()
    }

    /// Resize with bilinear filtering, skipping the copy when the size
    /// already matches
    pub fn resize_to(image: &RgbImage, size: Size) -> Option<RgbImage> {
        if image.dimensions() == (size.width, size.height) {
            return None;
        }
        Some(imageops::resize(
            image,
            size.width,
            size.height,
            imageops::FilterType::Triangle,
        ))
    }

    /// Crop a region given in the image's own pixel grid.
    ///
    /// Returns `None` if any part of the region falls outside the image.
    pub fn crop_checked(image: &RgbImage, x: i64, y: i64, size: Size) -> Option<RgbImage> {
        let (width, height) = image.dimensions();
        let in_bounds = x >= 0
            && y >= 0
            && x + i64::from(size.width) <= i64::from(width)
            && y + i64::from(size.height) <= i64::from(height);
        if !in_bounds {
            return None;
        }
        Some(imageops::crop_imm(image, x as u32, y as u32, size.width, size.height).to_image())
    }
}
