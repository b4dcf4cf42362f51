//! Window locators

pub mod x11_tools;
pub mod xcap_window;

pub use x11_tools::X11ToolsLocator;
pub use xcap_window::XcapLocator;

use petbot_core::config::LocatorBackend;
use petbot_core::traits::WindowLocator;

/// Build the locator for `backend`
pub fn locator_for(backend: LocatorBackend) -> Box<dyn WindowLocator> {
    match backend {
        LocatorBackend::Xcap => Box::new(XcapLocator::new()),
        LocatorBackend::X11Tools => Box::new(X11ToolsLocator::new()),
    }
}
