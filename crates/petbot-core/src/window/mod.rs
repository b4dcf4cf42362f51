//! Located windows and how to find them

pub mod target;

pub use target::{Identifier, TitleMatch, WindowTarget, locate};

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform window identifier (X11 window id, HWND, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// A window as reported by a locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    /// Owning process id, 0 when unknown
    pub pid: u32,
    pub process_name: String,
    pub title: String,
    /// Outer window rectangle in screen pixels
    pub rect: Rect,
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let process = if self.process_name.is_empty() {
            "Unknown"
        } else {
            &self.process_name
        };
        write!(
            f,
            "PID: {} | Process: {} | Title: {} | Window ID: {}",
            self.pid, process, self.title, self.handle
        )
    }
}
