//! The capture -> detect -> click loop.

use crate::bbox::DetectionSet;
use crate::config::BotConfig;
use crate::error::BotError;
use crate::frame::CaptureTarget;
use crate::geometry::Rect;
use crate::mapper::{box_to_screen, ResizeRatio};
use crate::traits::{Detect, FrameCapturer, FrameSink, InputInjector, QuitSignal, WindowLocator};
use crate::window::{locate, WindowInfo};
use crate::Result;
use std::fmt;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Settle time between focusing the window and clicking.
const FOCUS_SETTLE: Duration = Duration::from_millis(10);

/// Lifecycle of one bot run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Running,
    Stopping,
    Failed(String),
    Terminated,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Running => f.write_str("running"),
            Self::Stopping => f.write_str("stopping"),
            Self::Failed(cause) => write!(f, "failed: {cause}"),
            Self::Terminated => f.write_str("terminated"),
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub iterations: u64,
    pub capture_failures: u64,
    pub detection_failures: u64,
    pub clicks: u64,
    pub injection_failures: u64,
}

/// Everything the loop drives, chosen once at startup.
pub struct Capabilities {
    pub locator: Box<dyn WindowLocator>,
    pub capturer: Box<dyn FrameCapturer>,
    pub detector: Box<dyn Detect>,
    pub injector: Box<dyn InputInjector>,
    pub quit: Box<dyn QuitSignal>,
    pub sink: Option<Box<dyn FrameSink>>,
}

/// Single-threaded polling loop. Acts on at most one detection per iteration.
pub struct ControlLoop {
    config: BotConfig,
    caps: Capabilities,
    state: LoopState,
}

impl ControlLoop {
    pub fn new(config: BotConfig, caps: Capabilities) -> Self {
        Self {
            config,
            caps,
            state: LoopState::Init,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Resolve the window and loop until quit.
    ///
    /// Fails without retrying when the window cannot be resolved. Per-iteration
    /// failures are logged and counted; the loop carries on.
    pub fn run(&mut self) -> Result<LoopReport> {
        let (window, client) = match self.init() {
            Ok(resolved) => resolved,
            Err(err) => {
                self.transition(LoopState::Failed(format!("{err:#}")));
                return Err(err);
            }
        };

        self.caps.detector.prepare(client.size());
        self.transition(LoopState::Running);

        let mut report = LoopReport::default();
        let outcome = self.run_iterations(&window, &mut report);

        self.transition(LoopState::Stopping);
        self.close_sink();

        match outcome {
            Ok(()) => {
                self.transition(LoopState::Terminated);
                info!(
                    iterations = report.iterations,
                    clicks = report.clicks,
                    "bot stopped"
                );
                Ok(report)
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "bot aborted");
                self.transition(LoopState::Failed(format!("{err:#}")));
                Err(err)
            }
        }
    }

    fn init(&mut self) -> Result<(WindowInfo, Rect)> {
        let window = locate(self.caps.locator.as_ref(), &self.config.target)?;
        let client = self
            .config
            .capture
            .client_insets
            .client_area(window.rect)
            .ok_or(BotError::InvalidGeometry(window.rect))?;
        info!(client = %client, "capturing client area");
        Ok((window, client))
    }

    fn run_iterations(&mut self, window: &WindowInfo, report: &mut LoopReport) -> Result<()> {
        let interval = self.config.control.interval();
        let mut window_rect = window.rect;

        loop {
            report.iterations += 1;

            if self.config.capture.refresh_geometry {
                window_rect = self.refresh_geometry(window, window_rect);
            }
            self.step(window, window_rect, report);

            if !interval.is_zero() {
                sleep(interval);
            }

            if self.quit_requested()? {
                info!("quit signal received");
                return Ok(());
            }
        }
    }

    /// One capture/detect/click pass. Never fails; problems are counted.
    fn step(&mut self, window: &WindowInfo, window_rect: Rect, report: &mut LoopReport) {
        let Some(client) = self.config.capture.client_insets.client_area(window_rect) else {
            report.capture_failures += 1;
            warn!(geometry = %window_rect, "window too small for its client insets, skipping");
            return;
        };

        let target = CaptureTarget {
            handle: window.handle,
            window: window_rect,
            client,
        };

        let frame = match self.caps.capturer.capture(&target) {
            Ok(frame) if !frame.is_empty() => frame,
            Ok(_) => {
                report.capture_failures += 1;
                warn!("invalid screenshot, skipping");
                return;
            }
            Err(err) => {
                report.capture_failures += 1;
                warn!(error = %format!("{err:#}"), "screenshot failed, skipping");
                return;
            }
        };

        let detections = match self.caps.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(err) => {
                report.detection_failures += 1;
                warn!(error = %format!("{err:#}"), "detection failed");
                DetectionSet::new(frame.size())
            }
        };

        for detection in detections.iter() {
            debug!(
                class = %detection.class_name,
                confidence = detection.confidence,
                x = detection.bbox.x,
                y = detection.bbox.y,
                w = detection.bbox.width,
                h = detection.bbox.height,
                "detected"
            );
        }

        if let Some(sink) = self.caps.sink.as_mut() {
            if let Err(err) = sink.show(&frame, &detections) {
                warn!(error = %err, "preview update failed");
            }
        }

        let Some(first) = detections.first() else {
            return;
        };

        let ratio = ResizeRatio::between(frame.size(), detections.space);
        if !ratio.is_identity() {
            debug!(x = ratio.x, y = ratio.y, "scaling detection back to the captured frame");
        }
        let point = box_to_screen(&first.bbox, frame.rect(), ratio);

        if self.config.control.focus_before_click {
            match self.caps.locator.activate(window.handle) {
                Ok(()) => sleep(FOCUS_SETTLE),
                Err(err) => warn!(error = %err, "failed to focus window"),
            }
        }

        info!(class = %first.class_name, x = point.x, y = point.y, "clicking");
        match self.caps.injector.click(point) {
            Ok(()) => report.clicks += 1,
            Err(err) => {
                report.injection_failures += 1;
                warn!(error = %format!("{err:#}"), %point, "click failed");
            }
        }
    }

    fn refresh_geometry(
        &self,
        window: &WindowInfo,
        last: Rect,
    ) -> Rect {
        match self.caps.locator.geometry(window.handle) {
            Ok(rect) if !rect.is_empty() => {
                if rect != last {
                    debug!(geometry = %rect, "window geometry changed");
                }
                rect
            }
            Ok(rect) => {
                warn!(geometry = %rect, "window reported empty geometry, keeping last known");
                last
            }
            Err(err) => {
                warn!(error = %err, "geometry query failed, keeping last known");
                last
            }
        }
    }

    fn quit_requested(&mut self) -> Result<bool> {
        let mut requested = self.caps.quit.quit_requested()?;
        if let Some(sink) = self.caps.sink.as_mut() {
            requested |= sink.quit_requested()?;
        }
        Ok(requested)
    }

    fn close_sink(&mut self) {
        if let Some(sink) = self.caps.sink.as_mut() {
            if let Err(err) = sink.close() {
                warn!(error = %err, "failed to close preview");
            }
        }
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = %self.state, to = %next, "loop state");
        self.state = next;
    }
}
