//! YOLO output decoding and the detection pipeline

pub mod config;
pub mod decode;
pub mod detector;
pub mod labels;

pub use config::DetectorConfig;
pub use decode::decode_outputs;
pub use detector::YoloDetector;
pub use labels::ClassNames;
