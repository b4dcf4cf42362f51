//! Bot configuration

use crate::detection::DetectorConfig;
use crate::geometry::ClientInsets;
use crate::window::WindowTarget;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration, built once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub target: WindowTarget,
    pub detector: DetectorConfig,
    pub capture: CaptureConfig,
    pub control: ControlConfig,
    pub dataset: DatasetConfig,
}

/// How window pixels are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStrategy {
    /// Capture the window surface itself
    Direct,
    /// Capture the monitor and crop to the window rectangle
    ScreenCrop,
    /// Direct, falling back to screen-crop when it fails
    #[default]
    Auto,
}

/// Which window enumeration backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorBackend {
    /// `xcap` window list (Windows, macOS, X11)
    Xcap,
    /// `wmctrl`, `xdotool`, `xprop` and `xwininfo`
    X11Tools,
}

impl Default for LocatorBackend {
    fn default() -> Self {
        if cfg!(all(unix, not(target_os = "macos"))) {
            Self::X11Tools
        } else {
            Self::Xcap
        }
    }
}

/// Capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub strategy: CaptureStrategy,
    pub locator: LocatorBackend,
    pub client_insets: ClientInsets,
    /// Re-query window geometry before every capture. When off, the startup
    /// rectangle is used for the whole run and goes stale if the window moves.
    pub refresh_geometry: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            strategy: CaptureStrategy::default(),
            locator: LocatorBackend::default(),
            client_insets: ClientInsets::platform_default(),
            refresh_geometry: true,
        }
    }
}

/// Control loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Sleep between iterations
    pub interval_ms: u64,
    /// Random delay range between pointer move and click, inclusive
    pub click_delay_ms: [u64; 2],
    /// Bring the window to the foreground before clicking
    pub focus_before_click: bool,
    /// Show detections in a preview window
    pub preview: bool,
}

impl ControlConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Click delay bounds with `min <= max`
    pub fn click_delay(&self) -> (Duration, Duration) {
        let [a, b] = self.click_delay_ms;
        (
            Duration::from_millis(a.min(b)),
            Duration::from_millis(a.max(b)),
        )
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            click_delay_ms: [10, 50],
            focus_before_click: cfg!(target_os = "windows"),
            preview: true,
        }
    }
}

/// Dataset dumping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub dir: PathBuf,
    pub interval_ms: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: "images".into(),
            interval_ms: 1000,
        }
    }
}

impl BotConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse config JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::TitleMatch;

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config = BotConfig::from_json(
            r#"{
                "target": { "title": "PetStar", "title_match": "exact" },
                "detector": { "confidence_threshold": 0.6 },
                "capture": { "strategy": "screen_crop" },
                "control": { "interval_ms": 500 }
            }"#,
        )?;

        assert_eq!(config.target.title.as_deref(), Some("PetStar"));
        assert_eq!(config.target.title_match, TitleMatch::Exact);
        assert_eq!(config.detector.confidence_threshold, 0.6);
        assert_eq!(config.detector.nms_threshold, None);
        assert_eq!(config.capture.strategy, CaptureStrategy::ScreenCrop);
        assert!(config.capture.refresh_geometry);
        assert_eq!(config.control.interval(), Duration::from_millis(500));
        assert_eq!(config.control.click_delay_ms, [10, 50]);
        assert_eq!(config.dataset.dir, PathBuf::from("images"));
        Ok(())
    }

    #[test]
    fn test_json_round_trip() -> Result<()> {
        let mut config = BotConfig::default();
        config.target.pid = Some(13503);
        config.detector.nms_threshold = Some(0.3);
        let parsed = BotConfig::from_json(&config.to_json()?)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("petbot.json");
        std::fs::write(&path, r#"{ "target": { "process_name": "PetStarClient.exe" } }"#)?;

        let config = BotConfig::load(&path)?;
        assert_eq!(config.target.process_name.as_deref(), Some("PetStarClient.exe"));
        assert!(BotConfig::load(dir.path().join("missing.json")).is_err());
        Ok(())
    }

    #[test]
    fn test_click_delay_ordered() {
        let control = ControlConfig {
            click_delay_ms: [50, 10],
            ..Default::default()
        };
        assert_eq!(
            control.click_delay(),
            (Duration::from_millis(10), Duration::from_millis(50))
        );
    }
}
