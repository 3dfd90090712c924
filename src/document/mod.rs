//! Document state and text utilities.
//!
//! This module provides:
//! - `TextLines`, the line sequence segmentation runs over
//! - `DocumentState` and `DocumentStore` for document lifecycle management

mod state;
mod text;

pub use state::{DocumentState, DocumentStore};
pub use text::TextLines;
