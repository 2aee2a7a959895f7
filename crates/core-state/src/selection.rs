//! Block marking: placing the selection markers from the cursor.

use tracing::trace;

use crate::error::EditResult;
use crate::file::File;
use crate::position::{ColumnRegion, Cursor, Position, Selection};

/// Put the selection's start marker on the cursor. Returns whether the
/// selection is now valid.
pub fn mark_block_begin(file: &mut File) -> bool {
    let cursor = file.cursor();
    let sel = file.selection_mut();
    sel.start = cursor;
    sel.start_set = true;
    sel.revalidate();
    let valid = sel.valid;
    trace!(
        target: "state.markers",
        line = cursor.line,
        pos = cursor.pos,
        col = cursor.col,
        valid,
        "mark_block_begin"
    );
    valid
}

/// Put the selection's end marker on the cursor. Returns whether the
/// selection is now valid.
pub fn mark_block_end(file: &mut File) -> bool {
    let cursor = file.cursor();
    let sel = file.selection_mut();
    sel.end = cursor;
    sel.end_set = true;
    sel.revalidate();
    let valid = sel.valid;
    trace!(
        target: "state.markers",
        line = cursor.line,
        pos = cursor.pos,
        col = cursor.col,
        valid,
        "mark_block_end"
    );
    valid
}

/// Switch between character and column selection, revalidating the markers
/// under the new rules.
pub fn set_column_mode(file: &mut File, is_column: bool) -> bool {
    let sel = file.selection_mut();
    sel.is_column = is_column;
    sel.revalidate();
    sel.valid
}

/// Select the character range `[start, end)`.
pub fn select_chars(file: &mut File, start: Position, end: Position) -> EditResult<()> {
    file.check_position(start)?;
    file.check_position(end)?;
    let s = Cursor::new(start.line, start.pos, file.column_of(start.line, start.pos));
    let e = Cursor::new(end.line, end.pos, file.column_of(end.line, end.pos));
    *file.selection_mut() = Selection::chars(s, e);
    Ok(())
}

/// Select a column rectangle.
pub fn select_columns(file: &mut File, region: ColumnRegion) -> EditResult<()> {
    file.check_position(Position::new(region.first_line, 0))?;
    file.check_position(Position::new(region.last_line, 0))?;
    let s = Cursor::new(
        region.first_line,
        file.pos_of_column(region.first_line, region.start_col),
        region.start_col,
    );
    let e = Cursor::new(
        region.last_line,
        file.pos_of_column(region.last_line, region.end_col),
        region.end_col,
    );
    *file.selection_mut() = Selection::columns(s, e);
    Ok(())
}

/// Drop both markers.
pub fn clear_selection(file: &mut File) {
    *file.selection_mut() = Selection::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::EditPolicy;
    use core_text::Arena;

    fn file(text: &str) -> File {
        File::from_bytes(Arena::new(), text.as_bytes(), EditPolicy::with_tab_size(4)).unwrap()
    }

    #[test]
    fn marking_needs_both_edges_in_order() {
        let mut f = file("abcdef");
        f.set_cursor(Position::new(0, 4)).unwrap();
        assert!(!mark_block_begin(&mut f));
        f.set_cursor(Position::new(0, 2)).unwrap();
        assert!(!mark_block_end(&mut f), "end before start on one line");
        f.set_cursor(Position::new(0, 5)).unwrap();
        assert!(mark_block_end(&mut f));
        assert_eq!(
            f.selection().char_range(),
            Some((Position::new(0, 4), Position::new(0, 5)))
        );
    }

    #[test]
    fn column_mode_only_orders_columns_and_lines() {
        let mut f = file("abcdef\nabcdef");
        f.set_cursor(Position::new(0, 4)).unwrap();
        mark_block_begin(&mut f);
        f.set_cursor(Position::new(1, 2)).unwrap();
        assert!(mark_block_end(&mut f), "later line is enough for characters");
        assert!(!set_column_mode(&mut f, true), "columns reversed");
        f.set_cursor(Position::new(1, 6)).unwrap();
        assert!(mark_block_end(&mut f));
        assert_eq!(f.selection().column_region(), Some(ColumnRegion::new(0, 1, 4, 6)));
    }

    #[test]
    fn clear_drops_markers() {
        let mut f = file("abc");
        select_chars(&mut f, Position::new(0, 0), Position::new(0, 2)).unwrap();
        assert!(f.selection().valid);
        clear_selection(&mut f);
        assert!(!f.selection().valid);
        assert!(!f.selection().start_set);
    }
}
