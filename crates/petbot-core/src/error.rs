//! Failure taxonomy of the bot.

use crate::geometry::Rect;
use thiserror::Error;

/// Classified failures. Window resolution errors are fatal at startup,
/// everything else is recovered by the next loop iteration.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("no window identifier provided (expected a pid, process name or title)")]
    NoIdentifier,

    #[error("window not found: {0}")]
    WindowNotFound(String),

    #[error("invalid window geometry: {0}")]
    InvalidGeometry(Rect),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("detection failed: {0}")]
    Detection(String),

    #[error("input injection failed: {0}")]
    Injection(String),
}

impl BotError {
    /// Whether this error must stop the bot instead of skipping an iteration.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoIdentifier | Self::WindowNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_resolution_errors_are_fatal() {
        assert!(BotError::NoIdentifier.is_fatal());
        assert!(BotError::WindowNotFound("title 'PetStar'".into()).is_fatal());
        assert!(!BotError::InvalidGeometry(Rect::new(0, 0, 10, 10)).is_fatal());
        assert!(!BotError::Capture("BitBlt failed".into()).is_fatal());
        assert!(!BotError::Detection("forward failed".into()).is_fatal());
        assert!(!BotError::Injection("no input device".into()).is_fatal());
    }

    #[test]
    fn test_downcast_through_context() {
        use anyhow::Context;

        let err = Err::<(), _>(BotError::Detection("blob".into()))
            .context("frame 3")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BotError>(),
            Some(BotError::Detection(_))
        ));
    }
}
