//! Detection configuration

use crate::geometry::Size;
use crate::utils::NmsParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Model files and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Darknet network definition
    pub cfg_file: PathBuf,
    /// Trained weights
    pub weights_file: PathBuf,
    /// Class labels, one per line
    pub names_file: PathBuf,
    /// Blob size fed to the network
    pub network_size: Size,
    /// Size frames are resized to before inference and that decoded boxes
    /// are expressed in. Defaults to the client area size found at startup.
    pub reference_size: Option<Size>,
    /// Minimum class score, exclusive
    pub confidence_threshold: f32,
    /// Overlap threshold for suppression; `confidence_threshold - 0.1` when unset
    pub nms_threshold: Option<f32>,
}

impl DetectorConfig {
    pub fn nms_params(&self) -> NmsParams {
        match self.nms_threshold {
            Some(overlap) => NmsParams::new(self.confidence_threshold, overlap),
            None => NmsParams::coupled(self.confidence_threshold),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cfg_file: "./yolov4-tiny/yolov4-tiny-custom.cfg".into(),
            weights_file: "yolov4-tiny-custom_last.weights".into(),
            names_file: "yolov4-tiny/obj.names".into(),
            network_size: Size::new(416, 416),
            reference_size: None,
            confidence_threshold: 0.5,
            nms_threshold: None,
        }
    }
}
