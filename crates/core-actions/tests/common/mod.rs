#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_config::EditPolicy;
use core_state::{Cursor, File, Position};
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

/// Text and cursor of a file at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub lines: Vec<String>,
    pub cursor: Cursor,
}

pub fn snapshot(file: &File) -> Snapshot {
    Snapshot {
        lines: lines(file),
        cursor: file.cursor(),
    }
}

/// Run `op` (one command) and check that undo returns to the state before
/// it and redo to the state after it, twice over.
pub fn assert_undo_redo(file: &mut File, op: impl FnOnce(&mut File)) -> Snapshot {
    let before = snapshot(file);
    op(file);
    let after = snapshot(file);
    for round in 0..2 {
        core_actions::undo(file).expect("undo");
        assert_eq!(snapshot(file), before, "undo, round {round}");
        core_actions::redo(file).expect("redo");
        assert_eq!(snapshot(file), after, "redo, round {round}");
    }
    after
}
