//! The editable file: line index, cursor, selection and undo log.

use core_config::EditPolicy;
use core_text::{Arena, ArenaBlock, EolType, Line, LineAttr, LineIndex, TextError, make_block, tabs};
use std::rc::Rc;
use tracing::trace;

use crate::error::{EditError, EditResult};
use crate::position::{Cursor, Position, Selection};
use crate::undo::{FileStatus, UndoLog};

/// Collaborators that follow edits without owning text: bookmarks, the
/// syntax highlighter, the function-name index.
pub trait FileObserver {
    /// `delta` lines were inserted (positive) or removed (negative) at `at`.
    fn lines_changed(&mut self, _at: usize, _delta: isize) {}
    /// Cached end-of-line status is stale from line `from` onward.
    fn eol_status_invalidated(&mut self, _from: usize) {}
    fn rescan_function_names(&mut self) {}
}

pub struct File {
    lines: LineIndex,
    arena: Arena,
    eol: EolType,
    policy: EditPolicy,
    cursor: Cursor,
    selection: Selection,
    undo: UndoLog,
    modified: bool,
    needs_redraw: bool,
    observer: Option<Box<dyn FileObserver>>,
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("lines", &self.lines.len())
            .field("eol", &self.eol)
            .field("cursor", &self.cursor)
            .field("selection", &self.selection)
            .field("undo", &self.undo.len())
            .field("modified", &self.modified)
            .finish()
    }
}

impl File {
    /// An empty file (zero lines).
    pub fn new(arena: Arena, policy: EditPolicy) -> Self {
        Self {
            lines: LineIndex::new(),
            arena,
            eol: EolType::default(),
            policy,
            cursor: Cursor::default(),
            selection: Selection::default(),
            undo: UndoLog::new(),
            modified: false,
            needs_redraw: true,
            observer: None,
        }
    }

    /// Build a file from raw text. Empty text gives an empty file; otherwise
    /// the text is split on its detected terminator.
    pub fn from_bytes(arena: Arena, text: &[u8], policy: EditPolicy) -> EditResult<Self> {
        let mut file = Self::new(arena, policy);
        if text.is_empty() {
            return Ok(file);
        }
        let block = make_block(&file.arena, text, LineAttr::empty())?;
        file.eol = block.eol();
        file.lines = LineIndex::from_lines(block.into_lines());
        trace!(target: "state.block", lines = file.lines.len(), bytes = text.len(), "file_loaded");
        Ok(file)
    }

    pub fn set_observer(&mut self, observer: Box<dyn FileObserver>) {
        self.observer = Some(observer);
    }

    pub fn take_observer(&mut self) -> Option<Box<dyn FileObserver>> {
        self.observer.take()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// True for the virtual line one past the last real line.
    pub fn is_eof_line(&self, line: usize) -> bool {
        line == self.lines.len()
    }

    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// Text of line `idx`; the virtual end-of-file line reads as empty.
    pub fn line_text(&self, idx: usize) -> &[u8] {
        self.lines.text(idx)
    }

    pub fn line_len(&self, idx: usize) -> usize {
        self.line_text(idx).len()
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut LineIndex {
        &mut self.lines
    }

    pub fn line_texts(&self) -> Vec<&[u8]> {
        self.lines.iter().map(Line::text).collect()
    }

    /// Whole content, lines joined by the file's terminator.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(self.eol.as_bytes());
            }
            out.extend_from_slice(line.text());
        }
        out
    }

    /// Distinct arena blocks referenced by this file.
    pub fn arena_blocks(&self) -> Vec<Rc<ArenaBlock>> {
        self.lines.arena_blocks()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn eol(&self) -> EolType {
        self.eol
    }

    pub fn set_eol(&mut self, eol: EolType) {
        self.eol = eol;
    }

    pub fn policy(&self) -> &EditPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: EditPolicy) {
        self.policy = policy;
    }

    pub fn tab_size(&self) -> usize {
        self.policy.tab_size.max(1)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    pub fn undo_log_mut(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn clear_redraw(&mut self) {
        self.needs_redraw = false;
    }

    pub(crate) fn mark_changed(&mut self) {
        self.modified = true;
        self.needs_redraw = true;
    }

    /// Screen column of byte `pos` on `line`.
    pub fn column_of(&self, line: usize, pos: usize) -> usize {
        tabs::column_of(self.line_text(line), pos, self.tab_size())
    }

    /// Visible width of `line` in columns.
    pub fn line_width(&self, line: usize) -> usize {
        tabs::width(self.line_text(line), self.tab_size())
    }

    /// Byte offset shown at `col` on `line`, clamped to the line end.
    pub fn pos_of_column(&self, line: usize, col: usize) -> usize {
        tabs::clamp_pos_of_column(self.line_text(line), col, self.tab_size())
    }

    /// Reject positions outside the file. The virtual end-of-file line only
    /// admits offset 0.
    pub fn check_position(&self, p: Position) -> EditResult<()> {
        let count = self.lines.len();
        if p.line > count {
            return Err(TextError::LineOutOfRange {
                line: p.line,
                count,
            }
            .into());
        }
        let len = self.line_len(p.line);
        if p.pos > len {
            return Err(TextError::PositionOutOfRange {
                line: p.line,
                pos: p.pos,
                len,
            }
            .into());
        }
        Ok(())
    }

    /// Validate a half-open character range.
    pub fn check_range(&self, start: Position, end: Position) -> EditResult<()> {
        self.check_position(start)?;
        self.check_position(end)?;
        if start > end {
            return Err(EditError::InvalidRegion { start, end });
        }
        Ok(())
    }

    /// Map an end on the virtual end-of-file line to the end of the last
    /// real line.
    pub fn normalize_end(&self, end: Position) -> Position {
        let count = self.lines.len();
        if end.line == count && count > 0 {
            Position::new(count - 1, self.line_len(count - 1))
        } else {
            end
        }
    }

    /// Place the cursor on a byte position.
    pub fn set_cursor(&mut self, p: Position) -> EditResult<()> {
        self.check_position(p)?;
        self.cursor = Cursor::new(p.line, p.pos, self.column_of(p.line, p.pos));
        self.needs_redraw = true;
        Ok(())
    }

    /// Place the cursor on a screen column, possibly in virtual space past
    /// the end of the line.
    pub fn set_cursor_col(&mut self, line: usize, col: usize) -> EditResult<()> {
        let count = self.lines.len();
        if line > count {
            return Err(TextError::LineOutOfRange { line, count }.into());
        }
        self.cursor = Cursor::new(line, self.pos_of_column(line, col), col);
        self.needs_redraw = true;
        Ok(())
    }

    /// Internal cursor placement after a splice; the caller guarantees the
    /// position exists.
    pub(crate) fn put_cursor(&mut self, p: Position) {
        debug_assert!(self.check_position(p).is_ok(), "cursor {p:?} outside file");
        self.cursor = Cursor::new(p.line, p.pos, self.column_of(p.line, p.pos));
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn status(&self) -> FileStatus {
        FileStatus {
            cursor: self.cursor,
            selection: self.selection,
            modified: self.modified,
        }
    }

    /// Restore cursor, selection and modified flag from a snapshot.
    pub fn restore_status(&mut self, status: FileStatus) {
        self.cursor = status.cursor;
        self.selection = status.selection;
        self.modified = status.modified;
        self.needs_redraw = true;
    }

    pub(crate) fn notify_lines_changed(&mut self, at: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        if let Some(obs) = self.observer.as_mut() {
            obs.lines_changed(at, delta);
        }
    }

    pub(crate) fn notify_eol_invalidated(&mut self, from: usize) {
        if let Some(obs) = self.observer.as_mut() {
            obs.eol_status_invalidated(from);
        }
    }

    pub(crate) fn notify_rescan(&mut self) {
        if let Some(obs) = self.observer.as_mut() {
            obs.rescan_function_names();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(text: &str) -> File {
        File::from_bytes(Arena::new(), text.as_bytes(), EditPolicy::with_tab_size(4)).unwrap()
    }

    #[test]
    fn load_splits_lines_and_keeps_eol() {
        let f = file("ab\r\ncd");
        assert_eq!(f.line_texts(), vec![&b"ab"[..], b"cd"]);
        assert_eq!(f.eol(), EolType::CrLf);
        assert_eq!(f.to_bytes(), b"ab\r\ncd");
        assert_eq!(f.arena_blocks().len(), 1);
    }

    #[test]
    fn empty_text_is_zero_lines() {
        let f = file("");
        assert_eq!(f.line_count(), 0);
        assert!(f.is_eof_line(0));
        assert!(f.check_position(Position::origin()).is_ok());
    }

    #[test]
    fn position_checks() {
        let f = file("abc\nde");
        assert!(f.check_position(Position::new(1, 2)).is_ok());
        assert!(f.check_position(Position::new(2, 0)).is_ok());
        assert!(matches!(
            f.check_position(Position::new(2, 1)),
            Err(EditError::Text(TextError::PositionOutOfRange { .. }))
        ));
        assert!(matches!(
            f.check_position(Position::new(3, 0)),
            Err(EditError::Text(TextError::LineOutOfRange { line: 3, count: 2 }))
        ));
        assert!(matches!(
            f.check_range(Position::new(1, 1), Position::new(0, 2)),
            Err(EditError::InvalidRegion { .. })
        ));
        assert_eq!(f.normalize_end(Position::new(2, 0)), Position::new(1, 2));
    }

    #[test]
    fn cursor_columns_follow_tabs() {
        let mut f = file("a\tb");
        f.set_cursor(Position::new(0, 2)).unwrap();
        assert_eq!(f.cursor(), Cursor::new(0, 2, 4));
        f.set_cursor_col(0, 9).unwrap();
        assert_eq!(f.cursor(), Cursor::new(0, 3, 9));
        f.set_cursor_col(0, 2).unwrap();
        assert_eq!(f.cursor().pos, 1);
    }
}
