//! Utility modules

pub mod image;
pub mod nms;

pub use image::ImageUtils;
pub use nms::{NmsParams, NonMaxSuppressionUtils};
