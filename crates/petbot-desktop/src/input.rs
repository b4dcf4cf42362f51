//! Mouse clicks through `enigo`

use crate::Result;
use anyhow::Context;
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use petbot_core::config::ControlConfig;
use petbot_core::geometry::ScreenPoint;
use petbot_core::traits::InputInjector;
use petbot_core::BotError;
use rand::Rng;
use std::thread::sleep;
use std::time::Duration;
use tracing::trace;

/// Left-clicks at absolute coordinates with a short random pause between
/// moving the pointer and pressing the button
pub struct EnigoInjector {
    enigo: Enigo,
    delay: (Duration, Duration),
}

impl EnigoInjector {
    pub fn new(config: &ControlConfig) -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("Failed to connect to input system")?;
        Ok(Self {
            enigo,
            delay: config.click_delay(),
        })
    }

    fn human_delay(&self) -> Duration {
        let (min, max) = self.delay;
        let ms = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
        Duration::from_millis(ms as u64)
    }
}

impl InputInjector for EnigoInjector {
    fn click(&mut self, point: ScreenPoint) -> Result<()> {
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| BotError::Injection(format!("move to {point}: {e}")))?;

        let delay = self.human_delay();
        trace!(?delay, "pausing before click");
        sleep(delay);

        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| BotError::Injection(format!("click at {point}: {e}")))?;
        Ok(())
    }
}
