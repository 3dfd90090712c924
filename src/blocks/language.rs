//! Fence tag normalization.
//!
//! Markdown authors tag fences with whatever they like (`py`, `sh`, `js`).
//! This module folds those informal tags onto the canonical language
//! identifiers used as runner registry keys.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Informal fence tags and the canonical language identifier they stand for.
pub static ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        // Shells
        ("sh", "shellscript"),
        ("shell", "shellscript"),
        ("console", "shellscript"),
        ("terminal", "shellscript"),
        // Python
        ("py", "python"),
        ("python3", "python"),
        // JavaScript / TypeScript
        ("js", "javascript"),
        ("node", "javascript"),
        ("mjs", "javascript"),
        ("ts", "typescript"),
        // Others
        ("rb", "ruby"),
        ("pl", "perl"),
        ("ps", "powershell"),
        ("ps1", "powershell"),
        ("pwsh", "powershell"),
        ("golang", "go"),
        ("ex", "elixir"),
        ("exs", "elixir"),
        ("jl", "julia"),
    ]
    .into_iter()
    .collect()
});

/// Outcome of resolving a fence tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The tag was found in the alias table.
    Alias(&'static str),
    /// The tag is not an alias; its lower-cased form is used as-is.
    PassThrough(String),
}

impl Resolution {
    /// The canonical language identifier.
    pub fn canonical(&self) -> &str {
        match self {
            Resolution::Alias(id) => id,
            Resolution::PassThrough(id) => id,
        }
    }

    /// The canonical language identifier, owned.
    pub fn into_canonical(self) -> String {
        match self {
            Resolution::Alias(id) => id.to_string(),
            Resolution::PassThrough(id) => id,
        }
    }
}

/// Resolve a raw fence tag to a canonical language identifier.
///
/// Lookup is case-insensitive. Unknown tags pass through lower-cased so the
/// runner registry stays the single authority on what is supported.
pub fn resolve(raw_tag: &str) -> Resolution {
    let tag = raw_tag.to_lowercase();
    match ALIASES.get(tag.as_str()) {
        Some(canonical) => Resolution::Alias(canonical),
        None => Resolution::PassThrough(tag),
    }
}
