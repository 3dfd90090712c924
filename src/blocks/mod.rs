//! Runnable block detection.
//!
//! This module provides:
//! - `resolve` for folding fence tags onto canonical language identifiers
//! - `HostDocument`, the read-only line view segmentation runs over
//! - `DocumentKind` and its two segmentation strategies (fenced and plain)
//! - `Block` and the cursor containment query

mod block;
mod host;
mod language;
mod plain;
mod tagged;

pub use block::{block_at_line, Block, BlockKind};
pub use host::{HostDocument, Line};
pub use language::{resolve, Resolution, ALIASES};

use crate::runners::RunnerRegistry;

/// Language identifier of documents made of fenced, tagged blocks.
pub const MARKDOWN_LANGUAGE_ID: &str = "markdown";

/// How a document is segmented into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Markdown-style document: every supported fenced block is runnable.
    Tagged,
    /// Source file: the whole file, plus its sections when there are several.
    Plain,
}

impl DocumentKind {
    /// Classify a document by its language identifier.
    pub fn classify(language_id: &str) -> Self {
        if language_id.eq_ignore_ascii_case(MARKDOWN_LANGUAGE_ID) {
            DocumentKind::Tagged
        } else {
            DocumentKind::Plain
        }
    }

    /// Produce the runnable blocks of `doc`.
    ///
    /// Never fails: unsupported languages, unterminated or empty fences simply
    /// produce fewer blocks.
    pub fn segment<D: HostDocument + ?Sized>(
        self,
        doc: &D,
        registry: &RunnerRegistry,
    ) -> Vec<Block> {
        let blocks = match self {
            DocumentKind::Tagged => tagged::detect(doc, registry),
            DocumentKind::Plain => plain::detect(doc, registry),
        };
        tracing::debug!(
            kind = ?self,
            lines = doc.line_count(),
            blocks = blocks.len(),
            "segmented document"
        );
        blocks
    }
}

/// Segment `doc` using the kind implied by its own language identifier.
pub fn detect_blocks<D: HostDocument + ?Sized>(doc: &D, registry: &RunnerRegistry) -> Vec<Block> {
    DocumentKind::classify(doc.language_id()).segment(doc, registry)
}

/// Join lines `start..=end` with `\n`, verbatim.
fn join_lines<D: HostDocument + ?Sized>(doc: &D, start: usize, end: usize) -> String {
    (start..=end)
        .map(|i| doc.line_at(i).text)
        .collect::<Vec<_>>()
        .join("\n")
}
