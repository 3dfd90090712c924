//! Line-indexed document text.
//!
//! Provides the line sequence segmentation reads, with editor line-count
//! semantics: a trailing newline produces a final empty line.

use crate::blocks::{HostDocument, Line};

/// A document split into lines, tagged with its language identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLines {
    lines: Vec<String>,
    language_id: String,
}

impl TextLines {
    /// Split `source` on `\n`, dropping a `\r` before each terminator.
    pub fn new(source: &str, language_id: impl Into<String>) -> Self {
        Self::from_lines(source.split('\n'), language_id)
    }

    /// Build from already-split lines.
    pub fn from_lines<I, S>(lines: I, language_id: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|line| {
                let line = line.as_ref();
                line.strip_suffix('\r').unwrap_or(line).to_string()
            })
            .collect();
        Self {
            lines,
            language_id: language_id.into(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Reassemble the text with `\n` terminators.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl HostDocument for TextLines {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_at(&self, index: usize) -> Line<'_> {
        Line::new(&self.lines[index])
    }

    fn language_id(&self) -> &str {
        &self.language_id
    }
}
