#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_config::EditPolicy;
use core_state::{File, Position};
use core_text::{Arena, Block, LineAttr, make_block};

pub fn policy() -> EditPolicy {
    EditPolicy::with_tab_size(4)
}

pub fn file(text: &str) -> File {
    File::from_bytes(Arena::new(), text.as_bytes(), policy()).expect("load")
}

pub fn file_in(arena: &Arena, text: &str) -> File {
    File::from_bytes(arena.clone(), text.as_bytes(), policy()).expect("load")
}

pub fn block(file: &File, text: &str) -> Block {
    make_block(file.arena(), text.as_bytes(), LineAttr::empty()).expect("block")
}

pub fn lines(file: &File) -> Vec<String> {
    file.line_texts()
        .into_iter()
        .map(|l| String::from_utf8_lossy(l).into_owned())
        .collect()
}

pub fn at(line: usize, pos: usize) -> Position {
    Position::new(line, pos)
}

/// Check that every arena block reachable from `files` (lines and undo
/// payloads) and `blocks` has exactly as many strong references as lines
/// pointing into it.
pub fn assert_refcounts_conserved(files: &[&File], blocks: &[&Block]) {
    use std::collections::HashMap;
    use std::rc::Rc;

    let mut expected: HashMap<*const core_text::ArenaBlock, usize> = HashMap::new();
    let mut seen = Vec::new();
    let file_lines = files.iter().flat_map(|f| {
        f.lines().iter().chain(
            f.undo_log()
                .records()
                .iter()
                .filter_map(|r| r.payload.as_ref())
                .flat_map(|b| b.lines().iter()),
        )
    });
    let block_lines = blocks.iter().flat_map(|b| b.lines().iter());
    for line in file_lines.chain(block_lines) {
        *expected.entry(Rc::as_ptr(line.block())).or_default() += 1;
        if !seen.iter().any(|b| Rc::ptr_eq(b, line.block())) {
            seen.push(line.block().clone());
        }
    }
    for b in &seen {
        // `seen` itself holds one extra reference per block.
        assert_eq!(
            core_text::ArenaBlock::ref_count(b) - 1,
            expected[&Rc::as_ptr(b)],
            "arena block {} refcount",
            b.id()
        );
    }
}
