//! Class label loading

use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Class names indexed by detector class id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    /// Load a darknet `.names` file: one label per line, line number = class id
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read class names: {:?}", path))?;
        let names = Self::parse(&contents);
        tracing::debug!(count = names.len(), ?path, "loaded class names");
        Ok(names)
    }

    pub fn parse(contents: &str) -> Self {
        Self {
            names: contents.lines().map(|line| line.trim().to_string()).collect(),
        }
    }

    /// Name for `class_id`, or `class_<id>` for ids the file does not cover
    pub fn name(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{class_id}"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
