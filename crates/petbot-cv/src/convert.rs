//! `image` to OpenCV `Mat` conversion

use crate::Result;
use anyhow::{ensure, Context};
use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar},
    prelude::*,
};

/// Image utility functions for crossing into OpenCV
pub struct ImageUtils;

impl ImageUtils {
    /// Copy an RGB image into a new 8-bit BGR `Mat`
    pub fn rgb_to_bgr_mat(image: &RgbImage) -> Result<Mat> {
        let (width, height) = image.dimensions();
        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            core::CV_8UC3,
            Scalar::all(0.0),
        )
        .context("Failed to allocate Mat")?;

        let data = mat.data_bytes_mut().context("Mat is not continuous")?;
        ensure!(
            data.len() == image.as_raw().len(),
            "Mat buffer size {} does not match image size {}",
            data.len(),
            image.as_raw().len()
        );
        for (dst, src) in data.chunks_exact_mut(3).zip(image.as_raw().chunks_exact(3)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        }

        Ok(mat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_channel_order_swapped() -> Result<()> {
        let mut img = RgbImage::new(4, 3);
        img.put_pixel(2, 1, Rgb([255, 10, 0]));

        let mat = ImageUtils::rgb_to_bgr_mat(&img)?;
        assert_eq!((mat.cols(), mat.rows()), (4, 3));
        let px = mat.at_2d::<core::Vec3b>(1, 2)?;
        assert_eq!(px.0, [0, 10, 255]);
        assert_eq!(mat.at_2d::<core::Vec3b>(0, 0)?.0, [0, 0, 0]);
        Ok(())
    }
}
