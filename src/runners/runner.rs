//! Runner definition type.

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the path of the file holding the block's code.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// How to run code written in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerDef {
    /// Command template, e.g. `python3 -u {file}`.
    pub command: String,
    /// Extension for the temp file, including the dot (e.g. `.py`).
    pub extension: String,
}

impl RunnerDef {
    pub fn new(command: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            extension: extension.into(),
        }
    }

    /// Render the command line for a file path.
    ///
    /// Every `{file}` occurrence is replaced. A template without a placeholder
    /// gets the path appended as its last argument.
    pub fn render(&self, path: &str) -> String {
        if self.command.contains(FILE_PLACEHOLDER) {
            self.command.replace(FILE_PLACEHOLDER, path)
        } else {
            format!("{} {}", self.command.trim_end(), path)
        }
    }
}
