//! PetBot core
//!
//! Platform-free building blocks of the click bot: window targets, frames,
//! YOLO post-processing, coordinate mapping and the control loop.

pub mod bbox;
pub mod config;
pub mod control;
pub mod dataset;
pub mod detection;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod mapper;
pub mod utils;
pub mod window;

// Re-export commonly used types
pub use bbox::{BBox, Detection, DetectionSet};
pub use config::{BotConfig, CaptureStrategy, LocatorBackend};
pub use control::{Capabilities, ControlLoop, LoopReport, LoopState};
pub use detection::{ClassNames, DetectorConfig, YoloDetector};
pub use error::BotError;
pub use frame::{CaptureTarget, Frame};
pub use geometry::{ClientInsets, Rect, ScreenPoint, Size};
pub use window::{WindowHandle, WindowInfo, WindowTarget};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Capabilities the bot drives. Platform crates implement these; the
/// concrete implementation is picked once at startup.
pub mod traits {
    use super::*;
    use image::RgbImage;
    use window::Identifier;

    /// Enumerates windows and reports their geometry
    pub trait WindowLocator {
        fn list_windows(&self) -> Result<Vec<WindowInfo>>;

        /// First window matching `identifier`, in enumeration order
        fn find(&self, identifier: &Identifier) -> Result<Option<WindowInfo>> {
            Ok(self
                .list_windows()?
                .into_iter()
                .find(|window| identifier.matches(window)))
        }

        /// Current outer rectangle of a window
        fn geometry(&self, handle: WindowHandle) -> Result<Rect>;

        /// Bring a window to the foreground
        fn activate(&self, _handle: WindowHandle) -> Result<()> {
            Ok(())
        }
    }

    /// Produces one frame of the target's client area
    pub trait FrameCapturer {
        fn capture(&mut self, target: &CaptureTarget) -> Result<Frame>;
    }

    /// Opaque network forward pass returning raw anchor rows
    pub trait Network {
        fn forward(&mut self, image: &RgbImage) -> Result<Vec<Vec<f32>>>;
    }

    /// Turns a frame into ordered detections
    pub trait Detect {
        /// Called once after the window is resolved with its client size
        fn prepare(&mut self, _client: Size) {}

        fn detect(&mut self, frame: &Frame) -> Result<DetectionSet>;
    }

    /// Moves the pointer and clicks
    pub trait InputInjector {
        fn click(&mut self, point: ScreenPoint) -> Result<()>;
    }

    /// External stop request, polled once per iteration
    pub trait QuitSignal {
        fn quit_requested(&mut self) -> Result<bool>;
    }

    /// On-screen display of frames and their detections
    pub trait FrameSink {
        fn show(&mut self, frame: &Frame, detections: &DetectionSet) -> Result<()>;

        /// Display-driven quit, e.g. a key pressed in the preview
        fn quit_requested(&mut self) -> Result<bool> {
            Ok(false)
        }

        /// Release display resources
        fn close(&mut self) -> Result<()>;
    }
}
