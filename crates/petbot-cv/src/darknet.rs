//! Darknet (YOLOv4-tiny) forward pass through OpenCV DNN

use crate::convert::ImageUtils;
use crate::Result;
use anyhow::{ensure, Context};
use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar, Vector},
    dnn,
    prelude::*,
};
use petbot_core::detection::DetectorConfig;
use petbot_core::geometry::Size;
use petbot_core::traits::Network;
use petbot_core::BotError;
use std::path::Path;
use tracing::debug;

/// Pixel scale applied when building the input blob
const BLOB_SCALE: f64 = 1.0 / 255.0;

/// A loaded darknet model and its output layer names
pub struct DarknetNetwork {
    net: dnn::Net,
    output_layers: Vector<String>,
    input_size: core::Size,
}

impl DarknetNetwork {
    /// Load a network from its `.cfg` and `.weights` files
    pub fn load<P: AsRef<Path>>(cfg_file: P, weights_file: P, input_size: Size) -> Result<Self> {
        let cfg = cfg_file.as_ref().to_string_lossy();
        let weights = weights_file.as_ref().to_string_lossy();
        ensure!(!input_size.is_empty(), "network input size must be non-zero");

        let mut net = dnn::read_net_from_darknet(&cfg, &weights)
            .with_context(|| format!("Failed to load darknet model: {} / {}", cfg, weights))?;
        net.set_preferable_backend(dnn::DNN_BACKEND_OPENCV)?;
        net.set_preferable_target(dnn::DNN_TARGET_CPU)?;

        let output_layers = net
            .get_unconnected_out_layers_names()
            .context("Failed to query output layers")?;
        debug!(layers = ?output_layers.to_vec(), "darknet model loaded");

        Ok(Self {
            net,
            output_layers,
            input_size: core::Size::new(input_size.width as i32, input_size.height as i32),
        })
    }

    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        Self::load(&config.cfg_file, &config.weights_file, config.network_size)
    }
}

impl Network for DarknetNetwork {
    fn forward(&mut self, image: &RgbImage) -> Result<Vec<Vec<f32>>> {
        self.forward_rows(image)
            .map_err(|err| anyhow::Error::from(BotError::Detection(format!("{err:#}"))))
    }
}

impl DarknetNetwork {
    fn forward_rows(&mut self, image: &RgbImage) -> Result<Vec<Vec<f32>>> {
        let bgr = ImageUtils::rgb_to_bgr_mat(image)?;

        // Scaled to [0, 1], resized to the network size, swapped back to RGB
        let blob = dnn::blob_from_image(
            &bgr,
            BLOB_SCALE,
            self.input_size,
            Scalar::default(),
            true,
            false,
            core::CV_32F,
        )
        .context("Failed to build input blob")?;
        self.net.set_input(&blob, "", 1.0, Scalar::default())?;

        let mut outputs: Vector<Mat> = Vector::new();
        self.net
            .forward(&mut outputs, &self.output_layers)
            .context("Network forward pass failed")?;

        let mut rows = Vec::new();
        for output in outputs.iter() {
            for r in 0..output.rows() {
                rows.push(output.at_row::<f32>(r)?.to_vec());
            }
        }
        Ok(rows)
    }
}
