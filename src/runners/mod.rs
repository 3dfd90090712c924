//! Runner definitions and the language registry.
//!
//! This module provides:
//! - `RunnerDef`, the command template and file extension for one language
//! - The built-in runner table
//! - `RunnerRegistry`, an immutable snapshot of built-ins merged with user overrides

mod builtins;
mod registry;
mod runner;

pub use builtins::{get_builtin_runner, BUILTIN_RUNNERS};
pub use registry::RunnerRegistry;
pub use runner::{RunnerDef, FILE_PLACEHOLDER};
