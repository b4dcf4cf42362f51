//! Command-line interface
//!
//! Flags override values loaded from `--config`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use petbot_core::config::{BotConfig, CaptureStrategy, LocatorBackend};
use petbot_core::window::TitleMatch;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "petbot",
    about = "Detects objects in a game window with YOLOv4-tiny and clicks them",
    version
)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the capture, detect and click loop
    Run {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        capture: CaptureArgs,

        /// Darknet network definition
        #[arg(long)]
        cfg: Option<PathBuf>,

        /// Trained weights
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Class names, one per line
        #[arg(long)]
        names: Option<PathBuf>,

        /// Minimum class score
        #[arg(long)]
        confidence: Option<f32>,

        /// Overlap threshold for suppression
        #[arg(long)]
        nms: Option<f32>,

        /// Milliseconds between iterations
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Do not open the preview window
        #[arg(long)]
        no_preview: bool,

        /// Focus the window before every click
        #[arg(long)]
        focus: bool,
    },

    /// List visible windows
    List {
        #[arg(long, value_enum)]
        locator: Option<LocatorArg>,
    },

    /// Save a frame per interval as training images
    Dump {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        capture: CaptureArgs,

        /// Output directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Milliseconds between saved frames
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Print the effective configuration as JSON
    Config,
}

/// Window identification, tried in the order pid, process, title
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    #[arg(long)]
    pub pid: Option<u32>,

    /// Process name, e.g. PetStarClient.exe
    #[arg(long = "process")]
    pub process_name: Option<String>,

    /// Window title, matched as a substring
    #[arg(long)]
    pub title: Option<String>,

    /// Require the title to match exactly
    #[arg(long)]
    pub exact_title: bool,
}

#[derive(Args, Debug, Default)]
pub struct CaptureArgs {
    #[arg(long, value_enum)]
    pub capture: Option<CaptureArg>,

    #[arg(long, value_enum)]
    pub locator: Option<LocatorArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CaptureArg {
    Direct,
    ScreenCrop,
    Auto,
}

impl From<CaptureArg> for CaptureStrategy {
    fn from(arg: CaptureArg) -> Self {
        match arg {
            CaptureArg::Direct => Self::Direct,
            CaptureArg::ScreenCrop => Self::ScreenCrop,
            CaptureArg::Auto => Self::Auto,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LocatorArg {
    Xcap,
    X11Tools,
}

impl From<LocatorArg> for LocatorBackend {
    fn from(arg: LocatorArg) -> Self {
        match arg {
            LocatorArg::Xcap => Self::Xcap,
            LocatorArg::X11Tools => Self::X11Tools,
        }
    }
}

impl TargetArgs {
    fn apply(&self, config: &mut BotConfig) {
        let target = &mut config.target;
        if self.pid.is_some() {
            target.pid = self.pid;
        }
        if self.process_name.is_some() {
            target.process_name.clone_from(&self.process_name);
        }
        if self.title.is_some() {
            target.title.clone_from(&self.title);
        }
        if self.exact_title {
            target.title_match = TitleMatch::Exact;
        }
    }
}

impl CaptureArgs {
    fn apply(&self, config: &mut BotConfig) {
        if let Some(capture) = self.capture {
            config.capture.strategy = capture.into();
        }
        if let Some(locator) = self.locator {
            config.capture.locator = locator.into();
        }
    }
}

impl Command {
    /// Overlay the flags of this subcommand onto `config`
    pub fn apply(&self, config: &mut BotConfig) {
        match self {
            Self::Run {
                target,
                capture,
                cfg,
                weights,
                names,
                confidence,
                nms,
                interval_ms,
                no_preview,
                focus,
            } => {
                target.apply(config);
                capture.apply(config);
                let detector = &mut config.detector;
                if let Some(cfg) = cfg {
                    detector.cfg_file.clone_from(cfg);
                }
                if let Some(weights) = weights {
                    detector.weights_file.clone_from(weights);
                }
                if let Some(names) = names {
                    detector.names_file.clone_from(names);
                }
                if let Some(confidence) = confidence {
                    detector.confidence_threshold = *confidence;
                }
                if nms.is_some() {
                    detector.nms_threshold = *nms;
                }
                if let Some(interval_ms) = interval_ms {
                    config.control.interval_ms = *interval_ms;
                }
                if *no_preview {
                    config.control.preview = false;
                }
                if *focus {
                    config.control.focus_before_click = true;
                }
            }
            Self::List { locator } => {
                if let Some(locator) = locator {
                    config.capture.locator = (*locator).into();
                }
            }
            Self::Dump {
                target,
                capture,
                dir,
                interval_ms,
            } => {
                target.apply(config);
                capture.apply(config);
                if let Some(dir) = dir {
                    config.dataset.dir.clone_from(dir);
                }
                if let Some(interval_ms) = interval_ms {
                    config.dataset.interval_ms = *interval_ms;
                }
            }
            Self::Config => {}
        }
    }
}
