// tests/control_loop_tests.rs
use anyhow::anyhow;
use image::RgbImage;
use petbot_core::{
    bbox::{BBox, Detection, DetectionSet},
    config::BotConfig,
    control::{Capabilities, ControlLoop, LoopState},
    dataset::dump_dataset,
    frame::{CaptureTarget, Frame},
    geometry::{ClientInsets, Rect, ScreenPoint, Size},
    traits::{Detect, FrameCapturer, FrameSink, InputInjector, QuitSignal, WindowLocator},
    window::{WindowHandle, WindowInfo, WindowTarget},
    BotError, Result,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

const HANDLE: WindowHandle = WindowHandle(0x0400_0001);

/// Ordered record of focus and click calls
type Events = Rc<RefCell<Vec<&'static str>>>;

struct FakeLocator {
    windows: Vec<WindowInfo>,
    /// Geometry answers replayed before falling back to the listed rect
    geometry: RefCell<VecDeque<Result<Rect>>>,
    events: Events,
}

impl FakeLocator {
    fn with_window(rect: Rect) -> Self {
        Self {
            windows: vec![WindowInfo {
                handle: HANDLE,
                pid: 13503,
                process_name: "PetStarClient".into(),
                title: "PetStar".into(),
                rect,
            }],
            geometry: RefCell::default(),
            events: Events::default(),
        }
    }

    fn empty() -> Self {
        Self {
            windows: vec![],
            geometry: RefCell::default(),
            events: Events::default(),
        }
    }

    fn with_geometry(self, script: Vec<Result<Rect>>) -> Self {
        *self.geometry.borrow_mut() = script.into();
        self
    }
}

impl WindowLocator for FakeLocator {
    fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        Ok(self.windows.clone())
    }

    fn geometry(&self, handle: WindowHandle) -> Result<Rect> {
        if let Some(answer) = self.geometry.borrow_mut().pop_front() {
            return answer;
        }
        self.windows
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.rect)
            .ok_or_else(|| anyhow!("gone"))
    }

    fn activate(&self, _handle: WindowHandle) -> Result<()> {
        self.events.borrow_mut().push("activate");
        Ok(())
    }
}

/// Replays scripted results, then keeps returning a blank frame of the client area
struct ScriptedCapturer {
    script: VecDeque<Result<Frame>>,
}

impl ScriptedCapturer {
    fn new(script: Vec<Result<Frame>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl FrameCapturer for ScriptedCapturer {
    fn capture(&mut self, target: &CaptureTarget) -> Result<Frame> {
        self.script.pop_front().unwrap_or_else(|| {
            let size = target.client.size();
            Ok(Frame::new(
                RgbImage::new(size.width, size.height),
                target.client.origin(),
            ))
        })
    }
}

struct ScriptedDetector {
    script: VecDeque<Result<DetectionSet>>,
    fallback: DetectionSet,
}

impl ScriptedDetector {
    fn always(detections: DetectionSet) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: detections,
        }
    }
}

impl Detect for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<DetectionSet> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[derive(Clone, Default)]
struct RecordingInjector {
    clicks: Rc<RefCell<Vec<ScreenPoint>>>,
    events: Events,
    fail: bool,
}

impl InputInjector for RecordingInjector {
    fn click(&mut self, point: ScreenPoint) -> Result<()> {
        if self.fail {
            return Err(BotError::Injection("no input device".into()).into());
        }
        self.events.borrow_mut().push("click");
        self.clicks.borrow_mut().push(point);
        Ok(())
    }
}

/// Requests quit on the n-th poll
struct QuitAfter {
    remaining: usize,
}

impl QuitSignal for QuitAfter {
    fn quit_requested(&mut self) -> Result<bool> {
        self.remaining = self.remaining.saturating_sub(1);
        Ok(self.remaining == 0)
    }
}

struct BrokenQuit;

impl QuitSignal for BrokenQuit {
    fn quit_requested(&mut self) -> Result<bool> {
        Err(anyhow!("signal source closed"))
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    shown: Rc<RefCell<usize>>,
    closed: Rc<RefCell<bool>>,
}

impl FrameSink for RecordingSink {
    fn show(&mut self, _frame: &Frame, _detections: &DetectionSet) -> Result<()> {
        *self.shown.borrow_mut() += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        *self.closed.borrow_mut() = true;
        Ok(())
    }
}

fn config() -> BotConfig {
    let mut config = BotConfig::default();
    config.target = WindowTarget::by_title("PetStar");
    config.capture.client_insets = ClientInsets::NONE;
    config.control.interval_ms = 0;
    config.control.focus_before_click = false;
    config
}

fn single(bbox: BBox, space: Size) -> DetectionSet {
    DetectionSet::from_vec(vec![Detection::new(0, 0.9, bbox).with_name("pet")], space)
}

fn blank(width: u32, height: u32, origin: ScreenPoint) -> Frame {
    Frame::new(RgbImage::new(width, height), origin)
}

#[test]
fn test_clicks_detection_center_in_screen_space() -> Result<()> {
    let injector = RecordingInjector::default();
    let clicks = Rc::clone(&injector.clicks);

    let caps = Capabilities {
        locator: Box::new(FakeLocator::with_window(Rect::new(100, 50, 800, 600))),
        capturer: Box::new(ScriptedCapturer::new(vec![])),
        detector: Box::new(ScriptedDetector::always(single(
            BBox::new(40, 30, 20, 20),
            Size::new(800, 600),
        ))),
        injector: Box::new(injector),
        quit: Box::new(QuitAfter { remaining: 1 }),
        sink: None,
    };

    let mut bot = ControlLoop::new(config(), caps);
    let report = bot.run()?;

    assert_eq!(*clicks.borrow(), vec![ScreenPoint::new(150, 90)]);
    assert_eq!(report.iterations, 1);
    assert_eq!(report.clicks, 1);
    assert_eq!(bot.state(), &LoopState::Terminated);
    Ok(())
}

#[test]
fn test_scales_back_from_reference_size() -> Result<()> {
    let injector = RecordingInjector::default();
    let clicks = Rc::clone(&injector.clicks);

    // Client captured at 832x624, detections expressed at 416x416
    let caps = Capabilities {
        locator: Box::new(FakeLocator::with_window(Rect::new(0, 0, 832, 624))),
        capturer: Box::new(ScriptedCapturer::new(vec![])),
        detector: Box::new(ScriptedDetector::always(single(
            BBox::new(90, 90, 20, 20),
            Size::new(416, 416),
        ))),
        injector: Box::new(injector),
        quit: Box::new(QuitAfter { remaining: 1 }),
        sink: None,
    };

    ControlLoop::new(config(), caps).run()?;
    assert_eq!(*clicks.borrow(), vec![ScreenPoint::new(200, 150)]);
    Ok(())
}

#[test]
fn test_survives_capture_failures() -> Result<()> {
    let injector = RecordingInjector::default();
    let clicks = Rc::clone(&injector.clicks);
    let origin = ScreenPoint::new(0, 0);

    let caps = Capabilities {
        locator: Box::new(FakeLocator::with_window(Rect::new(0, 0, 640, 480))),
        capturer: Box::new(ScriptedCapturer::new(vec![
            Err(BotError::Capture("BitBlt failed".into()).into()),
            Ok(blank(0, 0, origin)),
            Err(BotError::Capture("BitBlt failed".into()).into()),
            Ok(blank(640, 480, origin)),
        ])),
        detector: Box::new(ScriptedDetector::always(single(
            BBox::new(10, 10, 4, 4),
            Size::new(640, 480),
        ))),
        injector: Box::new(injector),
        quit: Box::new(QuitAfter { remaining: 4 }),
        sink: None,
    };

    let mut bot = ControlLoop::new(config(), caps);
    let report = bot.run()?;

    assert_eq!(report.iterations, 4);
    assert_eq!(report.capture_failures, 3);
    assert_eq!(*clicks.borrow(), vec![ScreenPoint::new(12, 12)]);
    assert_eq!(bot.state(), &LoopState::Terminated);
    Ok(())
}

#[test]
fn test_counts_detection_and_injection_failures() -> Result<()> {
    let detector = ScriptedDetector {
        script: VecDeque::from(vec![Err(BotError::Detection("forward failed".into()).into())]),
        fallback: single(BBox::new(0, 0, 10, 10), Size::new(320, 240)),
    };
    let sink = RecordingSink::default();
    let shown = Rc::clone(&sink.shown);

    let caps = Capabilities {
        locator: Box::new(FakeLocator::with_window(Rect::new(0, 0, 320, 240))),
        capturer: Box::new(ScriptedCapturer::new(vec![])),
        detector: Box::new(detector),
        injector: Box::new(RecordingInjector {
            fail: true,
            ..Default::default()
        }),
        quit: Box::new(QuitAfter { remaining: 3 }),
        sink: Some(Box::new(sink)),
    };

    let report = ControlLoop::new(config(), caps).run()?;

    assert_eq!(report.iterations, 3);
    assert_eq!(report.detection_failures, 1);
    assert_eq!(report.injection_failures, 2);
    assert_eq!(report.clicks, 0);
    // Frames are still shown when detection fails
    assert_eq!(*shown.borrow(), 3);
    Ok(())
}

#[test]
fn test_missing_window_fails_at_init() {
    let caps = Capabilities {
        locator: Box::new(FakeLocator::empty()),
        capturer: Box::new(ScriptedCapturer::new(vec![])),
        detector: Box::new(ScriptedDetector::always(DetectionSet::new(Size::new(1, 1)))),
        injector: Box::new(RecordingInjector::default()),
        quit: Box::new(QuitAfter { remaining: 1 }),
        sink: None,
    };

    let mut bot = ControlLoop::new(config(), caps);
    let err = bot.run().unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BotError>(),
        Some(BotError::WindowNotFound(_))
    ));
    assert!(matches!(bot.state(), LoopState::Failed(_)));
}

#[test]
fn test_quit_poll_error_releases_preview() {
    let sink = RecordingSink::default();
    let closed = Rc::clone(&sink.closed);

    let caps = Capabilities {
        locator: Box::new(FakeLocator::with_window(Rect::new(0, 0, 100, 100))),
        capturer: Box::new(ScriptedCapturer::new(vec![])),
        detector: Box::new(ScriptedDetector::always(DetectionSet::new(Size::new(100, 100)))),
        injector: Box::new(RecordingInjector::default()),
        quit: Box::new(BrokenQuit),
        sink: Some(Box::new(sink)),
    };

    let mut bot = ControlLoop::new(config(), caps);
    assert!(bot.run().is_err());
    assert!(*closed.borrow());
    assert!(matches!(bot.state(), LoopState::Failed(_)));
}

#[test]
fn test_dump_continues_numbering() -> Result<()> {
    let root = tempfile::tempdir()?;
    let mut config = config();
    config.dataset.dir = root.path().join("images");
    config.dataset.interval_ms = 0;
    std::fs::create_dir_all(&config.dataset.dir)?;
    std::fs::write(config.dataset.dir.join("notes.txt"), "labels pending")?;

    let locator = FakeLocator::with_window(Rect::new(0, 0, 64, 48));
    let mut capturer = ScriptedCapturer::new(vec![Err(anyhow!("window occluded"))]);
    let mut quit = QuitAfter { remaining: 3 };

    let written = dump_dataset(&config, &locator, &mut capturer, &mut quit)?;

    assert_eq!(written, 2);
    assert!(config.dataset.dir.join("img_1.jpeg").is_file());
    assert!(config.dataset.dir.join("img_2.jpeg").is_file());
    assert!(!config.dataset.dir.join("img_3.jpeg").exists());
    Ok(())
}

fn clicks_with_geometry(window: Rect, geometry: Vec<Result<Rect>>, iterations: usize) -> Result<Vec<ScreenPoint>> {
    let injector = RecordingInjector::default();
    let clicks = Rc::clone(&injector.clicks);

    let caps = Capabilities {
        locator: Box::new(FakeLocator::with_window(window).with_geometry(geometry)),
        capturer: Box::new(ScriptedCapturer::new(vec![])),
        detector: Box::new(ScriptedDetector::always(single(
            BBox::new(10, 10, 20, 20),
            Size::new(400, 300),
        ))),
        injector: Box::new(injector),
        quit: Box::new(QuitAfter { remaining: iterations }),
        sink: None,
    };

    ControlLoop::new(config(), caps).run()?;
    let clicks = clicks.borrow().clone();
    Ok(clicks)
}

#[test]
fn test_follows_moved_window() -> Result<()> {
    let clicks = clicks_with_geometry(
        Rect::new(100, 50, 400, 300),
        vec![Ok(Rect::new(100, 50, 400, 300)), Ok(Rect::new(300, 200, 400, 300))],
        2,
    )?;
    assert_eq!(clicks, vec![ScreenPoint::new(120, 70), ScreenPoint::new(320, 220)]);
    Ok(())
}

#[test]
fn test_keeps_last_geometry_when_query_fails() -> Result<()> {
    let clicks = clicks_with_geometry(
        Rect::new(100, 50, 400, 300),
        vec![
            Ok(Rect::new(300, 200, 400, 300)),
            Err(anyhow!("BadWindow")),
            Ok(Rect::new(0, 0, 0, 0)),
        ],
        3,
    )?;
    assert_eq!(clicks, vec![ScreenPoint::new(320, 220); 3]);
    Ok(())
}

#[test]
fn test_focuses_window_before_click() -> Result<()> {
    let locator = FakeLocator::with_window(Rect::new(0, 0, 200, 100));
    let events = Rc::clone(&locator.events);
    let injector = RecordingInjector {
        events: Rc::clone(&events),
        ..Default::default()
    };

    let mut config = config();
    config.control.focus_before_click = true;
    let caps = Capabilities {
        locator: Box::new(locator),
        capturer: Box::new(ScriptedCapturer::new(vec![])),
        detector: Box::new(ScriptedDetector::always(single(
            BBox::new(0, 0, 10, 10),
            Size::new(200, 100),
        ))),
        injector: Box::new(injector),
        quit: Box::new(QuitAfter { remaining: 2 }),
        sink: None,
    };

    ControlLoop::new(config, caps).run()?;
    assert_eq!(*events.borrow(), ["activate", "click", "activate", "click"]);
    Ok(())
}

#[test]
fn test_dump_skips_undersized_window() -> Result<()> {
    let root = tempfile::tempdir()?;
    let mut config = config();
    config.capture.client_insets = ClientInsets::WIN32_FRAME;
    config.dataset.dir = root.path().join("images");
    config.dataset.interval_ms = 0;

    let window = Rect::new(0, 0, 640, 480);
    // Minimised on the second pass
    let locator = FakeLocator::with_window(window).with_geometry(vec![
        Ok(window),
        Ok(Rect::new(0, 0, 10, 10)),
        Err(anyhow!("BadWindow")),
    ]);
    let mut capturer = ScriptedCapturer::new(vec![]);
    let mut quit = QuitAfter { remaining: 3 };

    let written = dump_dataset(&config, &locator, &mut capturer, &mut quit)?;

    // Third pass reuses the 10x10 rect, which is still too small
    assert_eq!(written, 1);
    assert!(config.dataset.dir.join("img_0.jpeg").is_file());
    Ok(())
}
