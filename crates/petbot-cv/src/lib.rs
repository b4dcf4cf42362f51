//! PetBot OpenCV backend
//!
//! Darknet inference through `opencv::dnn` and a HighGUI preview window.

pub mod convert;
pub mod darknet;
pub mod preview;

pub use darknet::DarknetNetwork;
pub use preview::HighGuiPreview;

pub use petbot_core::Result;
