//! Resolving a configured target to a concrete window.

use super::WindowInfo;
use crate::error::BotError;
use crate::traits::WindowLocator;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// How a title identifier is compared against window titles. Both modes
/// are case-sensitive on every locator backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMatch {
    #[default]
    Contains,
    Exact,
}

impl TitleMatch {
    /// Whether window title `name` satisfies the configured `title`
    pub fn matches(self, name: &str, title: &str) -> bool {
        match self {
            Self::Contains => name.contains(title),
            Self::Exact => name == title,
        }
    }
}

/// One way of naming the target window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Pid(u32),
    /// Case-insensitive substring of the owning process name
    ProcessName(String),
    Title(String, TitleMatch),
}

impl Identifier {
    pub fn matches(&self, window: &WindowInfo) -> bool {
        match self {
            Self::Pid(pid) => window.pid == *pid,
            Self::ProcessName(name) => window
                .process_name
                .to_lowercase()
                .contains(&name.to_lowercase()),
            Self::Title(title, mode) => mode.matches(&window.title, title),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pid(pid) => write!(f, "pid {pid}"),
            Self::ProcessName(name) => write!(f, "process '{name}'"),
            Self::Title(title, _) => write!(f, "title '{title}'"),
        }
    }
}

/// The configured window to automate. Any subset of the fields may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowTarget {
    pub pid: Option<u32>,
    pub process_name: Option<String>,
    pub title: Option<String>,
    pub title_match: TitleMatch,
}

impl WindowTarget {
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Identifiers in lookup priority: pid, then process name, then title.
    pub fn identifiers(&self) -> Vec<Identifier> {
        let mut identifiers = Vec::new();
        if let Some(pid) = self.pid {
            identifiers.push(Identifier::Pid(pid));
        }
        if let Some(name) = self.process_name.as_ref().filter(|n| !n.is_empty()) {
            identifiers.push(Identifier::ProcessName(name.clone()));
        }
        if let Some(title) = self.title.as_ref().filter(|t| !t.is_empty()) {
            identifiers.push(Identifier::Title(title.clone(), self.title_match));
        }
        identifiers
    }
}

/// Resolve `target`, trying each identifier in priority order.
///
/// The first identifier that yields a window with a usable rectangle wins;
/// when several windows match one identifier the locator's first one is used.
pub fn locate(locator: &dyn WindowLocator, target: &WindowTarget) -> Result<WindowInfo> {
    let identifiers = target.identifiers();
    if identifiers.is_empty() {
        return Err(BotError::NoIdentifier.into());
    }

    let mut failures = Vec::new();
    for identifier in identifiers {
        match locator.find(&identifier) {
            Ok(Some(window)) if !window.rect.is_empty() => {
                info!(
                    %identifier,
                    title = %window.title,
                    pid = window.pid,
                    geometry = %window.rect,
                    "window found"
                );
                return Ok(window);
            }
            Ok(Some(window)) => {
                warn!(%identifier, geometry = %window.rect, "window has no visible area");
                failures.push(format!("{identifier} (zero-size window)"));
            }
            Ok(None) => {
                warn!(%identifier, "no matching window");
                failures.push(identifier.to_string());
            }
            Err(err) => {
                warn!(%identifier, error = %err, "window lookup failed");
                failures.push(format!("{identifier} ({err})"));
            }
        }
    }

    Err(BotError::WindowNotFound(failures.join(", ")).into())
}
