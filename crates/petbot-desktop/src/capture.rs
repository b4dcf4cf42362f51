//! Frame capture through `xcap`

use crate::locator::XcapLocator;
use crate::Result;
use anyhow::Context;
use petbot_core::config::CaptureStrategy;
use petbot_core::frame::{CaptureTarget, Frame};
use petbot_core::geometry::ScreenPoint;
use petbot_core::traits::FrameCapturer;
use petbot_core::utils::ImageUtils;
use petbot_core::BotError;
use tracing::{debug, warn};
use xcap::Monitor;

/// Window or screen-crop capture, per [`CaptureStrategy`]
#[derive(Debug, Clone, Copy)]
pub struct XcapCapturer {
    strategy: CaptureStrategy,
}

impl XcapCapturer {
    pub fn new(strategy: CaptureStrategy) -> Self {
        Self { strategy }
    }

    /// Grab the window's own surface, then trim the decorations
    fn capture_direct(target: &CaptureTarget) -> Result<Frame> {
        let window = XcapLocator::window(target.handle)?;
        let image = window
            .capture_image()
            .map_err(|e| BotError::Capture(format!("window {}: {e}", target.handle)))?;
        let window_origin = XcapLocator::rect(&window)
            .map(|rect| rect.origin())
            .unwrap_or_else(|_| target.window.origin());

        Ok(Frame::from_screen(
            ImageUtils::rgba_to_rgb(image),
            window_origin,
            target.client,
        ))
    }

    /// Grab the monitor showing the window and crop to the client area
    fn capture_screen(target: &CaptureTarget) -> Result<Frame> {
        let client = target.client;
        let monitor = match Monitor::from_point(client.x, client.y) {
            Ok(monitor) => monitor,
            Err(err) => {
                debug!(error = %err, "no monitor at window origin, using primary");
                primary_monitor()?
            }
        };

        let image = monitor
            .capture_image()
            .map_err(|e| BotError::Capture(format!("screen: {e}")))?;
        let origin = ScreenPoint::new(monitor.x()?, monitor.y()?);

        Ok(Frame::from_screen(ImageUtils::rgba_to_rgb(image), origin, client))
    }
}

impl FrameCapturer for XcapCapturer {
    fn capture(&mut self, target: &CaptureTarget) -> Result<Frame> {
        match self.strategy {
            CaptureStrategy::Direct => Self::capture_direct(target),
            CaptureStrategy::ScreenCrop => Self::capture_screen(target),
            CaptureStrategy::Auto => Self::capture_direct(target).or_else(|err| {
                warn!(error = %format!("{err:#}"), "direct capture failed, falling back to screen-crop");
                Self::capture_screen(target)
            }),
        }
    }
}

fn primary_monitor() -> Result<Monitor> {
    let monitors = Monitor::all().context("Failed to enumerate monitors")?;
    let primary = monitors
        .iter()
        .position(|m| m.is_primary().unwrap_or(false))
        .unwrap_or(0);
    monitors
        .into_iter()
        .nth(primary)
        .ok_or_else(|| BotError::Capture("no monitors found".into()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use petbot_core::geometry::Rect;
    use petbot_core::window::WindowHandle;

    #[test]
    #[ignore = "requires graphical display and screen recording permissions"]
    fn test_screen_crop_dimensions() -> Result<()> {
        let target = CaptureTarget {
            handle: WindowHandle(0),
            window: Rect::new(0, 0, 200, 100),
            client: Rect::new(0, 0, 200, 100),
        };
        let frame = XcapCapturer::new(CaptureStrategy::ScreenCrop).capture(&target)?;
        assert_eq!(frame.rect(), Rect::new(0, 0, 200, 100));
        Ok(())
    }
}
