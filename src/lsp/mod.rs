//! LSP protocol feature implementations.
//!
//! This module provides implementations for LSP features:
//! - Code lenses placed on runnable blocks
//! - `workspace/executeCommand` decoding for run requests

mod code_lens;
mod commands;

pub use code_lens::code_lenses;
pub use commands::{parse_command, RunRequest, COMMANDS, RUN_BLOCK, RUN_BLOCK_AT_LINE};
