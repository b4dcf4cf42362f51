//! Captured frames and the screen-crop fallback.

use crate::geometry::{Rect, ScreenPoint, Size};
use crate::utils::ImageUtils;
use crate::window::WindowHandle;
use image::RgbImage;
use tracing::warn;

/// What a capturer is asked to grab on one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTarget {
    pub handle: WindowHandle,
    /// Outer window rectangle
    pub window: Rect,
    /// Client area inside `window`, the region frames should cover
    pub client: Rect,
}

/// A freshly captured RGB image plus the screen rectangle it covers.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
    origin: ScreenPoint,
}

impl Frame {
    pub fn new(image: RgbImage, origin: ScreenPoint) -> Self {
        Self { image, origin }
    }

    /// Crop a screenshot down to `region`.
    ///
    /// `screen_origin` is where the screenshot's top-left pixel sits on the
    /// virtual desktop. If `region` is not fully inside the screenshot the
    /// whole screenshot is returned instead; this never fails.
    pub fn from_screen(screen: RgbImage, screen_origin: ScreenPoint, region: Rect) -> Self {
        let rel_x = i64::from(region.x) - i64::from(screen_origin.x);
        let rel_y = i64::from(region.y) - i64::from(screen_origin.y);

        match ImageUtils::crop_checked(&screen, rel_x, rel_y, region.size()) {
            Some(cropped) => Self::new(cropped, region.origin()),
            None => {
                let (width, height) = screen.dimensions();
                warn!(
                    %region,
                    screen = %Size::new(width, height),
                    "window coordinates out of bounds, using full screenshot"
                );
                Self::new(screen, screen_origin)
            }
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn size(&self) -> Size {
        let (width, height) = self.image.dimensions();
        Size::new(width, height)
    }

    /// Screen rectangle covered by this frame.
    pub fn rect(&self) -> Rect {
        let size = self.size();
        Rect::new(self.origin.x, self.origin.y, size.width, size.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}
