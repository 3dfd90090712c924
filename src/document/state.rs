//! Open document tracking for the runlens server.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::text::TextLines;
use crate::blocks::{detect_blocks, Block, HostDocument};
use crate::runners::RunnerRegistry;

/// State for a single open document.
///
/// Only the text is kept: blocks are recomputed on every request.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Document text split into lines, with the client's language identifier.
    pub lines: TextLines,
    /// Document version from the client.
    pub version: i32,
}

impl DocumentState {
    pub fn new(source: &str, language_id: impl Into<String>, version: i32) -> Self {
        Self {
            lines: TextLines::new(source, language_id),
            version,
        }
    }

    pub fn language_id(&self) -> &str {
        self.lines.language_id()
    }

    /// Segment the current text against a registry snapshot.
    pub fn blocks(&self, registry: &RunnerRegistry) -> Vec<Block> {
        detect_blocks(&self.lines, registry)
    }
}

/// Thread-safe storage for open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentState>>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open a document with the language identifier reported by the client.
    pub fn open(
        &self,
        uri: Url,
        source: &str,
        language_id: String,
        version: i32,
    ) -> Arc<DocumentState> {
        let state = Arc::new(DocumentState::new(source, language_id, version));
        self.documents.insert(uri, Arc::clone(&state));
        state
    }

    /// Replace the text of an open document, keeping its language identifier.
    ///
    /// Returns `None` if the document was never opened.
    pub fn update(&self, uri: &Url, source: &str, version: i32) -> Option<Arc<DocumentState>> {
        let mut entry = self.documents.get_mut(uri)?;
        let language_id = entry.language_id().to_string();
        let state = Arc::new(DocumentState::new(source, language_id, version));
        *entry = Arc::clone(&state);
        Some(state)
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Get a document's state.
    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }
}
