//! Fenced block detection for markdown-style documents.

use std::sync::LazyLock;

use regex::Regex;

use super::block::{Block, BlockKind};
use super::host::HostDocument;
use super::join_lines;
use super::language::resolve;
use crate::runners::RunnerRegistry;

const FENCE: &str = "```";

/// Language assumed for a fence with no tag.
pub const DEFAULT_FENCE_LANGUAGE: &str = "shellscript";

/// Opening fence with a tag: three backticks immediately followed by word characters.
static FENCE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```(\w+)").unwrap());

/// Detect runnable fenced blocks, top to bottom.
///
/// A fence is emitted only when it is closed, has at least one content line,
/// and its resolved language has a runner. The first line starting with three
/// backticks after an opening fence always closes it, even if it carries a tag.
pub(super) fn detect<D: HostDocument + ?Sized>(doc: &D, registry: &RunnerRegistry) -> Vec<Block> {
    let mut blocks = Vec::new();
    let line_count = doc.line_count();
    let mut i = 0;

    while i < line_count {
        let text = doc.line_at(i).text;
        if !text.starts_with(FENCE) {
            i += 1;
            continue;
        }

        let anchor_line = i;
        let tag = FENCE_TAG
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map_or(DEFAULT_FENCE_LANGUAGE, |m| m.as_str());
        let language_id = resolve(tag).into_canonical();

        let start_line = anchor_line + 1;
        let Some(close_line) =
            (start_line..line_count).find(|&j| doc.line_at(j).text.starts_with(FENCE))
        else {
            // Unterminated fence: nothing after it can be a block either.
            break;
        };
        i = close_line + 1;

        if close_line == start_line {
            continue;
        }
        if !registry.contains(&language_id) {
            tracing::trace!(line = anchor_line, %language_id, "skipping fence without runner");
            continue;
        }

        let end_line = close_line - 1;
        blocks.push(Block {
            start_line,
            end_line,
            code: join_lines(doc, start_line, end_line),
            language_id,
            anchor_line,
            kind: BlockKind::Fence,
        });
    }

    blocks
}
