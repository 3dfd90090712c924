//! Whole-file and section detection for plain source documents.

use super::block::{Block, BlockKind};
use super::host::HostDocument;
use super::join_lines;
use crate::runners::RunnerRegistry;

/// Blank lines needed between two sections for them to be run separately.
pub const SECTION_GAP: usize = 2;

/// Detect the whole-file block and, when there are several, the sections.
///
/// Yields nothing when the document's own language has no runner. Otherwise
/// the whole-file block always comes first.
pub(super) fn detect<D: HostDocument + ?Sized>(doc: &D, registry: &RunnerRegistry) -> Vec<Block> {
    let language_id = doc.language_id();
    if !registry.contains(language_id) {
        return Vec::new();
    }

    let last_line = doc.line_count().saturating_sub(1);
    let code = if doc.line_count() == 0 {
        String::new()
    } else {
        join_lines(doc, 0, last_line)
    };

    let mut blocks = vec![Block {
        start_line: 0,
        end_line: last_line,
        language_id: language_id.to_string(),
        code,
        anchor_line: 0,
        kind: BlockKind::File,
    }];

    let sections = find_sections(doc);
    if sections.len() >= 2 {
        blocks.extend(sections.into_iter().map(|(start, end)| Block {
            start_line: start,
            end_line: end,
            language_id: language_id.to_string(),
            code: join_lines(doc, start, end),
            anchor_line: start,
            kind: BlockKind::Section,
        }));
    }

    blocks
}

/// Inclusive line ranges of the document's sections.
///
/// A single blank line stays inside a section; a run of `SECTION_GAP` or more
/// closes it. Leading and trailing blank lines never belong to a section.
pub(super) fn find_sections<D: HostDocument + ?Sized>(doc: &D) -> Vec<(usize, usize)> {
    let line_count = doc.line_count();
    let mut sections = Vec::new();
    let mut open: Option<usize> = None;
    let mut last_content = 0;
    let mut i = 0;

    while i < line_count {
        if !doc.line_at(i).is_blank {
            if open.is_none() {
                open = Some(i);
            }
            last_content = i;
            i += 1;
            continue;
        }

        if let Some(start) = open {
            let gap = (i..line_count)
                .take_while(|&j| doc.line_at(j).is_blank)
                .count();
            if gap >= SECTION_GAP {
                sections.push((start, last_content));
                open = None;
                i += gap;
                continue;
            }
        }
        i += 1;
    }

    if let Some(start) = open {
        sections.push((start, last_content));
    }

    sections
}
