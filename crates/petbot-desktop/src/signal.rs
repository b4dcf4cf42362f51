//! Ctrl-C as a cooperative quit request

use crate::Result;
use anyhow::Context;
use petbot_core::traits::QuitSignal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set by the Ctrl-C handler, read by the control loop once per iteration
#[derive(Clone)]
pub struct CtrlCQuit {
    flag: Arc<AtomicBool>,
}

impl CtrlCQuit {
    /// Install the process-wide handler. Can only be done once per process.
    pub fn install() -> Result<Self> {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&flag);
        ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to set Ctrl+C handler")?;
        Ok(Self { flag })
    }
}

impl QuitSignal for CtrlCQuit {
    fn quit_requested(&mut self) -> Result<bool> {
        Ok(self.flag.load(Ordering::SeqCst))
    }
}
