//! Read-only document view consumed by segmentation.

/// One line of a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Line text without its terminator.
    pub text: &'a str,
    /// True when the line is empty or whitespace-only.
    pub is_blank: bool,
}

impl<'a> Line<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            is_blank: text.trim().is_empty(),
        }
    }
}

/// A 0-indexed, immutable sequence of lines with a language identifier.
///
/// Segmentation only reads through this trait; it never mutates the document.
pub trait HostDocument {
    fn line_count(&self) -> usize;

    /// Line `index`; callers stay within `0..line_count()`.
    fn line_at(&self, index: usize) -> Line<'_>;

    fn language_id(&self) -> &str;
}
