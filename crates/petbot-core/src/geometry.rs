//! Screen-space geometry primitives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute screen coordinates, valid input for the input injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pixel dimensions of an image or rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangle in absolute screen pixels.
///
/// `x` and `y` may be negative on multi-monitor setups. A rectangle that came
/// out of a successful window lookup always has a non-zero extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// Window decoration sizes separating the outer window rectangle from its
/// client area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInsets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ClientInsets {
    pub const NONE: Self = Self {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// Frame sizes of a standard win32 window (8 px border, 30 px title bar).
    pub const WIN32_FRAME: Self = Self {
        left: 8,
        top: 30,
        right: 8,
        bottom: 8,
    };

    /// Default for the platform this binary was built for.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "windows") {
            Self::WIN32_FRAME
        } else {
            Self::NONE
        }
    }

    /// Shrink a window rectangle to its client area. Returns `None` when the
    /// insets consume the whole window.
    pub fn client_area(&self, window: Rect) -> Option<Rect> {
        let width = window.width.checked_sub(self.left + self.right)?;
        let height = window.height.checked_sub(self.top + self.bottom)?;
        let client = Rect::new(
            window.x + self.left as i32,
            window.y + self.top as i32,
            width,
            height,
        );
        (!client.is_empty()).then_some(client)
    }
}
