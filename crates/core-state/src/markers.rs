//! Cursor and selection maintenance after a splice.
//!
//! Called by the primitives once the line index has changed so that the
//! cursor and both block markers name valid positions again.

use tracing::trace;

use crate::file::File;
use crate::position::{Cursor, Position};

fn shift_after_insert(m: Position, at: Position, lines_inserted: usize, end: Position) -> Position {
    if m.line > at.line {
        Position::new(m.line + lines_inserted, m.pos)
    } else if m.line == at.line && m.pos >= at.pos {
        Position::new(end.line, end.pos + (m.pos - at.pos))
    } else {
        m
    }
}

fn shift_after_delete(m: Position, start: Position, end: Position) -> Position {
    if m <= start {
        m
    } else if m <= end {
        start
    } else if m.line == end.line {
        Position::new(start.line, start.pos + (m.pos - end.pos))
    } else {
        Position::new(m.line - (end.line - start.line), m.pos)
    }
}

/// Recompute the derived half of each marker: the column of a character
/// marker, the byte offset of a column marker.
fn resync_marker(file: &File, m: Cursor, is_column: bool) -> Cursor {
    if is_column {
        Cursor::new(m.line, file.pos_of_column(m.line, m.col), m.col)
    } else {
        Cursor::new(m.line, m.pos, file.column_of(m.line, m.pos))
    }
}

/// Reposition cursor and markers after `lines_inserted` line breaks were
/// inserted at `(row, pos)`, the inserted text ending at byte
/// `last_line_len` of line `row + lines_inserted`.
///
/// The cursor moves to the end of the inserted text. Markers after the
/// insertion point (including one sitting exactly on it) move with the text.
pub fn update_markers(
    file: &mut File,
    row: usize,
    pos: usize,
    lines_inserted: usize,
    last_line_len: usize,
) {
    let at = Position::new(row, pos);
    let end = Position::new(row + lines_inserted, last_line_len);

    let mut sel = *file.selection();
    if sel.is_column {
        if sel.start.line > row {
            sel.start.line += lines_inserted;
        }
        if sel.end.line > row {
            sel.end.line += lines_inserted;
        }
    } else {
        let s = shift_after_insert(sel.start.position(), at, lines_inserted, end);
        let e = shift_after_insert(sel.end.position(), at, lines_inserted, end);
        sel.start.line = s.line;
        sel.start.pos = s.pos;
        sel.end.line = e.line;
        sel.end.pos = e.pos;
    }
    sel.start = resync_marker(file, sel.start, sel.is_column);
    sel.end = resync_marker(file, sel.end, sel.is_column);
    *file.selection_mut() = sel;

    file.put_cursor(end);
    file.notify_eol_invalidated(row);
    file.notify_lines_changed(row, lines_inserted as isize);
    file.notify_rescan();
    file.mark_changed();
    trace!(target: "state.markers", row, pos, lines_inserted, last_line_len, "update_markers");
}

/// Reposition cursor and markers after `[start, end)` was removed.
///
/// The cursor lands on `start`. Markers inside the range collapse onto
/// `start`; a selection lying entirely inside it is invalidated. Column
/// selection lines are clamped to the new line count.
pub fn update_markers_delete(file: &mut File, start: Position, end: Position) {
    let removed = end.line - start.line;
    let count = file.line_count();

    let mut sel = *file.selection();
    if count == 0 {
        sel.invalidate();
        sel.start = Cursor::default();
        sel.end = Cursor::default();
        *file.selection_mut() = sel;
        *file.cursor_mut() = Cursor::default();
    } else {
        if sel.valid
            && start < end
            && sel.start.position() >= start
            && sel.end.position() <= end
            && !sel.is_column
        {
            sel.invalidate();
            trace!(target: "state.markers", "selection_collapsed");
        }
        if sel.is_column {
            let map_line = |l: usize| {
                let l = if l <= start.line {
                    l
                } else if l <= end.line {
                    start.line
                } else {
                    l - removed
                };
                l.min(count - 1)
            };
            sel.start.line = map_line(sel.start.line);
            sel.end.line = map_line(sel.end.line);
        } else {
            let s = shift_after_delete(sel.start.position(), start, end);
            let e = shift_after_delete(sel.end.position(), start, end);
            sel.start.line = s.line;
            sel.start.pos = s.pos;
            sel.end.line = e.line;
            sel.end.pos = e.pos;
        }
        sel.start = resync_marker(file, sel.start, sel.is_column);
        sel.end = resync_marker(file, sel.end, sel.is_column);
        *file.selection_mut() = sel;
        file.put_cursor(start);
    }

    file.notify_eol_invalidated(start.line);
    file.notify_lines_changed(start.line, -(removed as isize));
    file.notify_rescan();
    file.mark_changed();
    trace!(
        target: "state.markers",
        start_line = start.line,
        start_pos = start.pos,
        end_line = end.line,
        end_pos = end.pos,
        lines = count,
        "update_markers_delete"
    );
}

/// Adjust markers on one line after `delta` bytes were inserted (positive)
/// or removed (negative) at byte `at`, leaving line numbers alone.
pub fn shift_line_markers(file: &mut File, line: usize, at: usize, delta: isize) {
    let shift = |m: &mut Cursor| {
        if m.line != line || m.pos < at {
            return;
        }
        if delta >= 0 {
            m.pos += delta as usize;
        } else {
            let gone = delta.unsigned_abs();
            m.pos = if m.pos - at < gone { at } else { m.pos - gone };
        }
    };
    let mut sel = *file.selection();
    if !sel.is_column {
        shift(&mut sel.start);
        shift(&mut sel.end);
        sel.start = resync_marker(file, sel.start, false);
        sel.end = resync_marker(file, sel.end, false);
        *file.selection_mut() = sel;
    }
}

/// Re-derive byte offsets of the cursor and column markers from their
/// columns after column edits changed line contents.
pub fn resync_column_markers(file: &mut File) {
    let c = file.cursor();
    let cursor = resync_marker(file, c, true);
    *file.cursor_mut() = cursor;
    let mut sel = *file.selection();
    if sel.is_column {
        sel.start = resync_marker(file, sel.start, true);
        sel.end = resync_marker(file, sel.end, true);
        *file.selection_mut() = sel;
    }
}
