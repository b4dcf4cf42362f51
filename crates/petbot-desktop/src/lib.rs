//! PetBot desktop capabilities
//!
//! Window lookup, window capture, focusing and mouse input for the
//! platforms the bot runs on.

pub mod capture;
pub mod focus;
pub mod input;
pub mod locator;
pub mod signal;

pub use capture::XcapCapturer;
pub use input::EnigoInjector;
pub use locator::{locator_for, X11ToolsLocator, XcapLocator};
pub use signal::CtrlCQuit;

pub use petbot_core::Result;
