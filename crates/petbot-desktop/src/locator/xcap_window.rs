use crate::focus::focus_window;
use crate::Result;
use anyhow::Context;
use petbot_core::geometry::Rect;
use petbot_core::traits::WindowLocator;
use petbot_core::window::{WindowHandle, WindowInfo};
use petbot_core::BotError;
use tracing::debug;

/// Window list from `xcap`; works on Windows, macOS and X11.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapLocator;

impl XcapLocator {
    pub fn new() -> Self {
        Self
    }

    /// Live `xcap` window for a handle
    pub(crate) fn window(handle: WindowHandle) -> Result<xcap::Window> {
        let windows = xcap::Window::all().context("Failed to enumerate windows")?;
        for window in windows {
            if window.id().map(u64::from).ok() == Some(handle.0) {
                return Ok(window);
            }
        }
        Err(BotError::WindowNotFound(handle.to_string()).into())
    }

    pub(crate) fn rect(window: &xcap::Window) -> Result<Rect> {
        Ok(Rect::new(
            window.x()?,
            window.y()?,
            window.width()?,
            window.height()?,
        ))
    }

    fn info(window: &xcap::Window) -> Result<WindowInfo> {
        Ok(WindowInfo {
            handle: WindowHandle(u64::from(window.id()?)),
            pid: window.pid()?,
            process_name: window.app_name()?,
            title: window.title()?,
            rect: Self::rect(window)?,
        })
    }
}

impl WindowLocator for XcapLocator {
    fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        let windows = xcap::Window::all().context("Failed to enumerate windows")?;

        let mut infos = Vec::with_capacity(windows.len());
        for window in &windows {
            if window.is_minimized().unwrap_or(false) {
                continue;
            }
            match Self::info(window) {
                Ok(info) if !info.title.is_empty() => infos.push(info),
                Ok(_) => {}
                Err(err) => debug!(error = %err, "skipping unreadable window"),
            }
        }
        Ok(infos)
    }

    fn geometry(&self, handle: WindowHandle) -> Result<Rect> {
        Self::rect(&Self::window(handle)?)
    }

    fn activate(&self, handle: WindowHandle) -> Result<()> {
        focus_window(handle)
    }
}
