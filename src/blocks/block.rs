//! The runnable block record and the cursor containment query.

use serde::{Deserialize, Serialize};

/// Which detection strategy produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    /// Content of a fenced block in a tagged document.
    Fence,
    /// An entire plain document.
    File,
    /// A section of a plain document, separated from its neighbours by two
    /// or more blank lines.
    Section,
}

/// A contiguous, independently runnable span of a document.
///
/// `anchor_line <= start_line <= end_line` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// First content line (inclusive).
    pub start_line: usize,
    /// Last content line (inclusive).
    pub end_line: usize,
    /// Canonical language identifier; always a registry key at detection time.
    pub language_id: String,
    /// Content lines joined with `\n`.
    pub code: String,
    /// Line where the run affordance sits: the opening fence, or the first line
    /// for file and section blocks.
    pub anchor_line: usize,
    pub kind: BlockKind,
}

impl Block {
    /// True when `line` lies between the anchor and the last content line.
    pub fn contains_line(&self, line: usize) -> bool {
        self.anchor_line <= line && line <= self.end_line
    }
}

/// Select the block a cursor on `line` belongs to.
///
/// Blocks may overlap; the first one in detection order wins, so for plain
/// documents the whole-file block shadows its sections.
pub fn block_at_line(blocks: &[Block], line: usize) -> Option<&Block> {
    blocks.iter().find(|b| b.contains_line(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(anchor_line: usize, start_line: usize, end_line: usize, kind: BlockKind) -> Block {
        Block {
            start_line,
            end_line,
            language_id: "python".to_string(),
            code: String::new(),
            anchor_line,
            kind,
        }
    }

    #[test]
    fn contains_anchor_through_end() {
        let b = block(2, 3, 5, BlockKind::Fence);
        assert!(!b.contains_line(1));
        assert!(b.contains_line(2)); // opening fence
        assert!(b.contains_line(5));
        assert!(!b.contains_line(6)); // closing fence
    }

    #[test]
    fn selects_first_matching_block() {
        let blocks = vec![
            block(0, 0, 9, BlockKind::File),
            block(0, 0, 3, BlockKind::Section),
            block(6, 6, 9, BlockKind::Section),
        ];
        assert_eq!(block_at_line(&blocks, 7).unwrap().kind, BlockKind::File);
        assert_eq!(block_at_line(&blocks[1..], 7).unwrap().anchor_line, 6);
    }

    #[test]
    fn no_block_outside_every_span() {
        let blocks = vec![block(0, 1, 2, BlockKind::Fence), block(5, 6, 6, BlockKind::Fence)];
        assert!(block_at_line(&blocks, 3).is_none());
        assert!(block_at_line(&blocks, 7).is_none());
        assert!(block_at_line(&[], 0).is_none());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let b = block(0, 1, 2, BlockKind::Fence);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["startLine"], 1);
        assert_eq!(json["anchorLine"], 0);
        assert_eq!(json["kind"], "fence");
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
    }
}
