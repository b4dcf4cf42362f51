//! HighGUI preview window with detection overlays

use crate::convert::ImageUtils;
use crate::Result;
use opencv::{
    core::{Point, Rect, Scalar},
    highgui,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};
use petbot_core::bbox::{Detection, DetectionSet};
use petbot_core::frame::Frame;
use petbot_core::traits::FrameSink;
use petbot_core::utils::ImageUtils as CoreImageUtils;

pub const WINDOW_NAME: &str = "Game Window - Press 'q' to quit";

/// Box colours in BGR order, picked by `class_id % 6`.
pub const PALETTE: [(u8, u8, u8); 6] = [
    (0, 0, 255),
    (0, 255, 0),
    (255, 0, 0),
    (255, 255, 0),
    (255, 0, 255),
    (0, 255, 255),
];

/// Key that stops the bot from the preview window
const QUIT_KEY: i32 = b'q' as i32;

/// Preview window, also the source of the `q` quit key
#[derive(Default)]
pub struct HighGuiPreview {
    opened: bool,
}

impl HighGuiPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(class_id: usize) -> Scalar {
        let (b, g, r) = PALETTE[class_id % PALETTE.len()];
        Scalar::new(f64::from(b), f64::from(g), f64::from(r), 255.0)
    }

    fn draw(image: &mut opencv::core::Mat, detection: &Detection) -> Result<()> {
        let color = Self::color_for(detection.class_id);
        let bbox = detection.bbox;

        imgproc::rectangle(
            image,
            Rect::new(bbox.x, bbox.y, bbox.width, bbox.height),
            color,
            2,
            LINE_8,
            0,
        )?;
        imgproc::put_text(
            image,
            &detection.class_name,
            Point::new(bbox.x, bbox.y - 10),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            color,
            2,
            LINE_8,
            false,
        )?;
        Ok(())
    }
}

impl FrameSink for HighGuiPreview {
    fn show(&mut self, frame: &Frame, detections: &DetectionSet) -> Result<()> {
        // Boxes are in detector space, so draw on an image of that size
        let space = detections.space;
        let resized = if space.is_empty() {
            None
        } else {
            CoreImageUtils::resize_to(frame.image(), space)
        };
        let base = resized.as_ref().unwrap_or(frame.image());

        let mut image = ImageUtils::rgb_to_bgr_mat(base)?;
        for detection in detections.iter() {
            Self::draw(&mut image, detection)?;
        }

        highgui::imshow(WINDOW_NAME, &image)?;
        self.opened = true;
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool> {
        if !self.opened {
            return Ok(false);
        }
        let key = highgui::wait_key(1)?;
        Ok(key >= 0 && (key & 0xFF) == QUIT_KEY)
    }

    fn close(&mut self) -> Result<()> {
        if self.opened {
            highgui::destroy_all_windows()?;
            self.opened = false;
        }
        Ok(())
    }
}
