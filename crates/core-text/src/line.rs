//! Line descriptors and the ordered line index.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::arena::ArenaBlock;
use crate::error::{TextError, TextResult};

/// Per-line attribute bits.
///
/// The low bits cache the syntax highlighter's end-of-line state. The
/// highlighter owns their meaning; the engine only clears them when an edit
/// may have changed it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineAttr(u8);

impl LineAttr {
    const EOL_VALID: u8 = 0x80;
    const EOL_STATUS: u8 = 0x7f;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Cached end-of-line status, when valid.
    pub fn eol_status(self) -> Option<u8> {
        (self.0 & Self::EOL_VALID != 0).then_some(self.0 & Self::EOL_STATUS)
    }

    pub fn set_eol_status(&mut self, status: u8) {
        self.0 = Self::EOL_VALID | (status & Self::EOL_STATUS);
    }

    pub fn invalidate_eol_status(&mut self) {
        self.0 &= !(Self::EOL_VALID | Self::EOL_STATUS);
    }
}

/// One line of text: a borrowed span inside an arena block.
///
/// Holding a `Line` keeps its arena block alive; cloning one is an IncRef.
#[derive(Clone)]
pub struct Line {
    block: Rc<ArenaBlock>,
    start: usize,
    len: usize,
    pub attr: LineAttr,
}

impl Line {
    pub(crate) fn new(block: Rc<ArenaBlock>, start: usize, len: usize, attr: LineAttr) -> Self {
        debug_assert!(start + len <= block.bytes().len());
        Self {
            block,
            start,
            len,
            attr,
        }
    }

    pub fn text(&self) -> &[u8] {
        &self.block.bytes()[self.start..self.start + self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The arena block this line borrows from.
    pub fn block(&self) -> &Rc<ArenaBlock> {
        &self.block
    }

    /// Sub-span of this line sharing the same storage.
    pub fn slice(&self, range: Range<usize>) -> Line {
        debug_assert!(range.start <= range.end && range.end <= self.len);
        Line {
            block: self.block.clone(),
            start: self.start + range.start,
            len: range.end - range.start,
            attr: self.attr,
        }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Line")
            .field("text", &String::from_utf8_lossy(self.text()))
            .field("block", &self.block.id())
            .field("attr", &self.attr)
            .finish()
    }
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}

/// Ordered, resizable sequence of lines.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    lines: Vec<Line>,
}

impl LineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Line> {
        self.lines.get_mut(idx)
    }

    /// Text of line `idx`; the virtual line past the end reads as empty.
    pub fn text(&self, idx: usize) -> &[u8] {
        self.lines.get(idx).map(Line::text).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[Line] {
        &self.lines
    }

    /// Replace `range` with `replacement`.
    ///
    /// Growth is reserved before anything moves, so on failure the index is
    /// unchanged. Removed lines are dropped, releasing their arena blocks.
    pub fn splice(&mut self, range: Range<usize>, replacement: Vec<Line>) -> TextResult<()> {
        debug_assert!(range.start <= range.end && range.end <= self.lines.len());
        let grow = replacement.len().saturating_sub(range.len());
        self.lines
            .try_reserve(grow)
            .map_err(|_| TextError::OutOfMemory {
                requested: grow * std::mem::size_of::<Line>(),
            })?;
        self.lines.splice(range, replacement).for_each(drop);
        Ok(())
    }

    /// Replace a single line in place.
    pub fn replace(&mut self, idx: usize, line: Line) {
        self.lines[idx] = line;
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Distinct arena blocks referenced by the lines, in first-use order.
    pub fn arena_blocks(&self) -> Vec<Rc<ArenaBlock>> {
        distinct_blocks(&self.lines)
    }
}

pub(crate) fn distinct_blocks(lines: &[Line]) -> Vec<Rc<ArenaBlock>> {
    let mut out: Vec<Rc<ArenaBlock>> = Vec::new();
    for line in lines {
        if !out.iter().any(|b| Rc::ptr_eq(b, line.block())) {
            out.push(line.block().clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn two_lines(arena: &Arena) -> (Line, Line) {
        let mut buf = arena.allocate(8).unwrap();
        buf.push(b"abc\ndefg");
        let block = buf.freeze();
        (
            Line::new(block.clone(), 0, 3, LineAttr::empty()),
            Line::new(block, 4, 4, LineAttr::empty()),
        )
    }

    #[test]
    fn ref_count_tracks_lines() {
        let arena = Arena::new();
        let (a, b) = two_lines(&arena);
        assert_eq!(ArenaBlock::ref_count(a.block()), 2);
        let c = b.slice(1..3);
        assert_eq!(c.text(), b"ef");
        assert_eq!(ArenaBlock::ref_count(a.block()), 3);
        drop((b, c));
        assert_eq!(ArenaBlock::ref_count(a.block()), 1);
        drop(a);
        assert_eq!(arena.live_blocks(), 0);
    }

    #[test]
    fn splice_releases_removed_lines() {
        let arena = Arena::new();
        let (a, b) = two_lines(&arena);
        let mut idx = LineIndex::from_lines(vec![a, b]);
        assert_eq!(idx.arena_blocks().len(), 1);
        idx.splice(0..2, Vec::new()).unwrap();
        assert!(idx.is_empty());
        assert_eq!(arena.live_blocks(), 0);
        assert_eq!(idx.text(0), b"");
    }

    #[test]
    fn eol_status_bits() {
        let mut attr = LineAttr::empty();
        assert_eq!(attr.eol_status(), None);
        attr.set_eol_status(3);
        assert_eq!(attr.eol_status(), Some(3));
        assert_eq!(attr.bits(), 0x83);
        attr.invalidate_eol_status();
        assert_eq!(attr.eol_status(), None);
    }
}
