//! Detector space -> capture space -> screen space.

use crate::bbox::BBox;
use crate::geometry::{Rect, ScreenPoint, Size};
use serde::{Deserialize, Serialize};

/// Per-axis scale from detector-input pixels back to captured pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeRatio {
    pub x: f64,
    pub y: f64,
}

impl ResizeRatio {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `captured / input` on each axis. An empty input size maps to identity.
    pub fn between(captured: Size, input: Size) -> Self {
        if captured == input || input.is_empty() {
            return Self::IDENTITY;
        }
        Self::new(
            f64::from(captured.width) / f64::from(input.width),
            f64::from(captured.height) / f64::from(input.height),
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    fn scale(factor: f64, value: i32) -> i32 {
        if factor == 1.0 {
            value
        } else {
            (f64::from(value) * factor).floor() as i32
        }
    }
}

impl Default for ResizeRatio {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Map a detector-space point to absolute screen coordinates.
///
/// The point is first scaled into the captured frame's pixel grid (floored),
/// then offset by the capture rectangle's screen origin.
pub fn to_screen(center: (i32, i32), capture_rect: Rect, ratio: ResizeRatio) -> ScreenPoint {
    let (cx, cy) = center;
    ScreenPoint::new(
        capture_rect.x.saturating_add(ResizeRatio::scale(ratio.x, cx)),
        capture_rect.y.saturating_add(ResizeRatio::scale(ratio.y, cy)),
    )
}

/// Screen coordinates of a detected box's center.
pub fn box_to_screen(bbox: &BBox, capture_rect: Rect, ratio: ResizeRatio) -> ScreenPoint {
    to_screen(bbox.center(), capture_rect, ratio)
}
