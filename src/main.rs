use anyhow::Context;
use clap::Parser;
use petbot_core::config::BotConfig;
use petbot_core::control::{Capabilities, ControlLoop};
use petbot_core::dataset::dump_dataset;
use petbot_core::detection::{ClassNames, YoloDetector};
use petbot_core::traits::FrameSink;
use petbot_core::{BotError, Result};
use petbot_cv::{DarknetNetwork, HighGuiPreview};
use petbot_desktop::{locator_for, CtrlCQuit, EnigoInjector, XcapCapturer};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod cli;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<BotError>() {
                Some(cause) if cause.is_fatal() => {
                    error!(error = %cause, "cannot start without a target window")
                }
                _ => error!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env()?,
        )
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };
    cli.command.apply(&mut config);

    match cli.command {
        Command::Run { .. } => run_bot(config),
        Command::List { .. } => list_windows(&config),
        Command::Dump { .. } => dump(&config),
        Command::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn run_bot(config: BotConfig) -> Result<()> {
    let classes = ClassNames::load(&config.detector.names_file)?;
    let network = DarknetNetwork::from_config(&config.detector)?;
    info!(classes = classes.len(), "model loaded");
    let detector = YoloDetector::new(network, classes, &config.detector);

    let sink: Option<Box<dyn FrameSink>> = if config.control.preview {
        Some(Box::new(HighGuiPreview::new()))
    } else {
        None
    };

    let caps = Capabilities {
        locator: locator_for(config.capture.locator),
        capturer: Box::new(XcapCapturer::new(config.capture.strategy)),
        detector: Box::new(detector),
        injector: Box::new(EnigoInjector::new(&config.control)?),
        quit: Box::new(CtrlCQuit::install()?),
        sink,
    };

    let mut bot = ControlLoop::new(config, caps);
    let report = bot.run()?;
    info!(
        iterations = report.iterations,
        clicks = report.clicks,
        capture_failures = report.capture_failures,
        detection_failures = report.detection_failures,
        injection_failures = report.injection_failures,
        state = %bot.state(),
        "run finished"
    );
    Ok(())
}

fn list_windows(config: &BotConfig) -> Result<()> {
    let locator = locator_for(config.capture.locator);
    let windows = locator.list_windows().context("Failed to list windows")?;
    for window in &windows {
        println!("{window}");
    }
    info!(count = windows.len(), "windows listed");
    Ok(())
}

fn dump(config: &BotConfig) -> Result<()> {
    let locator = locator_for(config.capture.locator);
    let mut capturer = XcapCapturer::new(config.capture.strategy);
    let mut quit = CtrlCQuit::install()?;
    let written = dump_dataset(config, locator.as_ref(), &mut capturer, &mut quit)?;
    info!(written, dir = ?config.dataset.dir, "dataset dump finished");
    Ok(())
}
