//! `workspace/executeCommand` argument handling.

use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::Url;

use crate::blocks::Block;

/// Run the block passed as argument: `[uri, block]`.
pub const RUN_BLOCK: &str = "runlens.runBlock";
/// Run the block under a cursor line: `[uri, line]`.
pub const RUN_BLOCK_AT_LINE: &str = "runlens.runBlockAtLine";

/// Commands advertised in the server capabilities.
pub const COMMANDS: [&str; 2] = [RUN_BLOCK, RUN_BLOCK_AT_LINE];

/// A decoded run command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRequest {
    Block { uri: Url, block: Block },
    AtLine { uri: Url, line: usize },
}

impl RunRequest {
    pub fn uri(&self) -> &Url {
        match self {
            RunRequest::Block { uri, .. } | RunRequest::AtLine { uri, .. } => uri,
        }
    }
}

/// Decode a command and its arguments.
pub fn parse_command(command: &str, arguments: &[Value]) -> Result<RunRequest> {
    match command {
        RUN_BLOCK => {
            let uri = uri_argument(arguments)?;
            let block = arguments
                .get(1)
                .cloned()
                .ok_or_else(|| Error::invalid_params("missing block argument"))
                .and_then(|value| {
                    serde_json::from_value(value)
                        .map_err(|e| Error::invalid_params(format!("invalid block: {e}")))
                })?;
            Ok(RunRequest::Block { uri, block })
        }
        RUN_BLOCK_AT_LINE => {
            let uri = uri_argument(arguments)?;
            let line = arguments
                .get(1)
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::invalid_params("expected a line number"))?;
            Ok(RunRequest::AtLine {
                uri,
                line: line as usize,
            })
        }
        _ => Err(Error::invalid_request()),
    }
}

fn uri_argument(arguments: &[Value]) -> Result<Url> {
    let raw = arguments
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_params("expected a document uri"))?;
    Url::parse(raw).map_err(|e| Error::invalid_params(format!("invalid uri '{raw}': {e}")))
}
