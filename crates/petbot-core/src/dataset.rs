//! Training image dumping

use crate::config::BotConfig;
use crate::frame::{CaptureTarget, Frame};
use crate::traits::{FrameCapturer, QuitSignal, WindowLocator};
use crate::window::locate;
use crate::{BotError, Result};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use tracing::{info, warn};

/// Writes frames as `img_<n>.jpeg`, continuing the numbering from the number
/// of entries already in the directory.
#[derive(Debug)]
pub struct DatasetWriter {
    dir: PathBuf,
    next_index: usize,
}

impl DatasetWriter {
    /// Open `dir`, creating it if absent
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create dataset directory: {:?}", dir))?;
        let next_index = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory: {:?}", dir))?
            .count();
        Ok(Self { dir, next_index })
    }

    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("img_{}.jpeg", self.next_index))
    }

    /// Save one frame and return its path
    pub fn save(&mut self, frame: &Frame) -> Result<PathBuf> {
        let path = self.next_path();
        frame
            .image()
            .save(&path)
            .with_context(|| format!("Failed to save image: {:?}", path))?;
        self.next_index += 1;
        Ok(path)
    }
}

/// Resolve the window, then save one frame per interval until quit.
///
/// Returns the number of images written.
pub fn dump_dataset(
    config: &BotConfig,
    locator: &dyn WindowLocator,
    capturer: &mut dyn FrameCapturer,
    quit: &mut dyn QuitSignal,
) -> Result<usize> {
    let window = locate(locator, &config.target)?;
    let mut writer = DatasetWriter::open(&config.dataset.dir)?;
    let interval = std::time::Duration::from_millis(config.dataset.interval_ms);
    let insets = config.capture.client_insets;
    let mut written = 0;
    let mut window_rect = window.rect;

    info!(dir = ?config.dataset.dir, "dumping dataset images");
    loop {
        window_rect = match locator.geometry(window.handle) {
            Ok(rect) => rect,
            Err(err) => {
                warn!(error = %err, "geometry query failed, keeping last known");
                window_rect
            }
        };

        match insets.client_area(window_rect) {
            Some(client) => {
                let target = CaptureTarget {
                    handle: window.handle,
                    window: window_rect,
                    client,
                };
                if capture_one(capturer, &mut writer, &target) {
                    written += 1;
                }
            }
            None => warn!(
                error = %BotError::InvalidGeometry(window_rect),
                "window too small for its client insets, skipping"
            ),
        }

        if !interval.is_zero() {
            sleep(interval);
        }
        if quit.quit_requested()? {
            return Ok(written);
        }
    }
}

/// Capture and save one frame; failures are logged
fn capture_one(
    capturer: &mut dyn FrameCapturer,
    writer: &mut DatasetWriter,
    target: &CaptureTarget,
) -> bool {
    match capturer.capture(target) {
        Ok(frame) if !frame.is_empty() => match writer.save(&frame) {
            Ok(path) => {
                info!(?path, "saved");
                true
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed to save image");
                false
            }
        },
        Ok(_) => {
            warn!("invalid screenshot, skipping");
            false
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "screenshot failed, skipping");
            false
        }
    }
}
