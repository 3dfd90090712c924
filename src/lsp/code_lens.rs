//! Run code lenses for detected blocks.

use tower_lsp::lsp_types::{CodeLens, Command, Position, Range, Url};

use super::commands::RUN_BLOCK;
use crate::blocks::{Block, BlockKind};

/// Title shown on a block's lens.
fn lens_title(block: &Block) -> String {
    match block.kind {
        BlockKind::Fence => format!("▶ Run {}", block.language_id),
        BlockKind::File => "▶ Run file".to_string(),
        BlockKind::Section => "▶ Run section".to_string(),
    }
}

/// One lens per block, placed on its anchor line.
///
/// Each lens carries the block itself so running it does not depend on the
/// document still segmenting the same way.
pub fn code_lenses(uri: &Url, blocks: &[Block]) -> Vec<CodeLens> {
    blocks
        .iter()
        .map(|block| {
            let line = u32::try_from(block.anchor_line).unwrap_or(u32::MAX);
            let anchor = Position::new(line, 0);
            CodeLens {
                range: Range::new(anchor, anchor),
                command: Some(Command {
                    title: lens_title(block),
                    command: RUN_BLOCK.to_string(),
                    arguments: Some(vec![
                        serde_json::Value::String(uri.to_string()),
                        serde_json::to_value(block).unwrap_or_default(),
                    ]),
                }),
                data: None,
            }
        })
        .collect()
}
