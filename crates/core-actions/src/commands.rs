//! Text-changing commands.
//!
//! Each command wraps its logged edits in one undo group. Commands that can
//! start with the cursor in virtual space (past the end of its line) first
//! pad the line with blanks up to the cursor column, as its own logged step
//! inside the same group.

use core_state::{self as state, ColumnRegion, EditError, File, Position};
use core_text::{Block, BlockWriter, LineAttr, make_block, tabs};
use tracing::trace;

use crate::error::ActionResult;

/// Run `f` inside one undo group.
pub(crate) fn grouped<T>(
    file: &mut File,
    f: impl FnOnce(&mut File) -> ActionResult<T>,
) -> ActionResult<T> {
    file.undo_log_mut().begin_group();
    let result = f(file);
    file.undo_log_mut().end_group();
    result
}

/// The current selection, with a column rectangle clipped to the lines the
/// file has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selected {
    Chars(Position, Position),
    Columns(ColumnRegion),
}

pub(crate) fn selected(file: &File) -> ActionResult<Selected> {
    let sel = file.selection();
    if !sel.is_column {
        let (start, end) = sel.char_range().ok_or(EditError::NoSelection)?;
        return Ok(Selected::Chars(start, end));
    }
    let mut region = sel.column_region().ok_or(EditError::NoSelection)?;
    let n = file.line_count();
    if n == 0 || region.first_line >= n {
        return Err(EditError::NoSelection.into());
    }
    region.last_line = region.last_line.min(n - 1);
    Ok(Selected::Columns(region))
}

fn pad_virtual_space(file: &mut File) -> ActionResult<()> {
    let cursor = file.cursor();
    if file.is_eof_line(cursor.line) {
        return Ok(());
    }
    let width = file.line_width(cursor.line);
    if cursor.col <= width {
        return Ok(());
    }
    debug_assert_eq!(cursor.pos, file.line_len(cursor.line));
    let blanks = tabs::calc_blanks(width, cursor.col, file.policy());
    let eol = file.eol();
    let (bytes, count) = BlockWriter::measure([blanks.len()], eol);
    let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
    w.push_blanks(blanks);
    w.end_line();
    let pad = w.finish(false)?;
    state::insert_character_block(file, &pad)?;
    trace!(
        target: "actions.dispatch",
        op = "pad",
        line = cursor.line,
        from = width,
        to = cursor.col,
        "edit"
    );
    Ok(())
}

/// Insert raw text at the cursor. Line breaks in `text` split lines.
pub fn insert_text(file: &mut File, text: &[u8]) -> ActionResult<()> {
    if text.is_empty() {
        return Ok(());
    }
    let block = make_block(file.arena(), text, LineAttr::empty())?;
    insert_block(file, &block)
}

/// Insert a character block at the cursor, leaving the cursor after it.
pub fn insert_block(file: &mut File, block: &Block) -> ActionResult<()> {
    let before = file.cursor();
    grouped(file, |file| {
        pad_virtual_space(file)?;
        state::insert_character_block(file, block)?;
        Ok(())
    })?;
    let after = file.cursor();
    trace!(
        target: "actions.dispatch",
        op = "insert_block",
        lines = block.line_count(),
        line = before.line,
        pos = before.pos,
        to_line = after.line,
        to_pos = after.pos,
        "edit"
    );
    Ok(())
}

/// Delete the character range `[start, end)`.
pub fn delete_char_block(file: &mut File, start: Position, end: Position) -> ActionResult<()> {
    grouped(file, |file| Ok(state::delete_character_block(file, start, end)?))?;
    trace!(
        target: "actions.dispatch",
        op = "delete_char_block",
        line = start.line,
        pos = start.pos,
        to_line = end.line,
        to_pos = end.pos,
        "edit"
    );
    Ok(())
}

/// Delete the character under the cursor. At (or past) the end of a line
/// the next line is joined on, after padding the line out to the cursor
/// when it sits in virtual space. Returns whether anything changed.
pub fn delete_a_character(file: &mut File) -> ActionResult<bool> {
    let cursor = file.cursor();
    let n = file.line_count();
    if cursor.line >= n {
        return Ok(false);
    }
    let row = cursor.line;
    if cursor.pos < file.line_len(row) {
        delete_char_block(file, cursor.position(), Position::new(row, cursor.pos + 1))?;
        return Ok(true);
    }
    if row + 1 >= n {
        return Ok(false);
    }
    grouped(file, |file| {
        pad_virtual_space(file)?;
        let len = file.line_len(row);
        state::delete_character_block(file, Position::new(row, len), Position::new(row + 1, 0))?;
        Ok(())
    })?;
    trace!(target: "actions.dispatch", op = "join_lines", line = row, col = cursor.col, "edit");
    Ok(true)
}

/// Overwrite the byte under the cursor and step past it. On the end-of-file
/// line, in virtual space, or for a line break this inserts instead.
pub fn overwrite_char(file: &mut File, byte: u8) -> ActionResult<()> {
    let cursor = file.cursor();
    if matches!(byte, b'\n' | b'\r')
        || file.is_eof_line(cursor.line)
        || cursor.col > file.line_width(cursor.line)
    {
        return insert_text(file, &[byte]);
    }
    grouped(file, |file| Ok(state::overwrite_char(file, byte)?))?;
    trace!(
        target: "actions.dispatch",
        op = "overwrite",
        line = cursor.line,
        pos = cursor.pos,
        "edit"
    );
    Ok(())
}

/// Delete the current selection, character or column.
pub fn delete_block(file: &mut File) -> ActionResult<()> {
    match selected(file)? {
        Selected::Chars(start, end) => delete_char_block(file, start, end),
        Selected::Columns(region) => delete_column_block(file, region).map(|_| ()),
    }
}

/// Insert a column block at the cursor: detab where the cursor column cuts
/// a tab, fit the block to the target lines, then merge it in.
pub fn insert_column_block(file: &mut File, block: &Block) -> ActionResult<()> {
    if block.width() == 0 {
        return Ok(());
    }
    let cursor = file.cursor();
    grouped(file, |file| {
        let target = ColumnRegion::new(
            cursor.line,
            cursor.line + block.line_count() - 1,
            cursor.col,
            cursor.col + 1,
        );
        state::detab_column_region(file, target)?;
        let (pattern, width) = state::fit_column_block(file, block)?;
        state::insert_column_block(file, &pattern, width)?;
        Ok(())
    })?;
    trace!(
        target: "actions.dispatch",
        op = "insert_column_block",
        line = cursor.line,
        col = cursor.col,
        lines = block.line_count(),
        "edit"
    );
    Ok(())
}

/// Detab the rectangle's edges and delete it. Returns what was removed,
/// per line the trimmed blanks followed by the removed bytes.
pub fn delete_column_block(file: &mut File, region: ColumnRegion) -> ActionResult<Block> {
    let removed = grouped(file, |file| {
        state::detab_column_region(file, region)?;
        Ok(state::delete_column_block(file, region)?)
    })?;
    trace!(
        target: "actions.dispatch",
        op = "delete_column_block",
        first = region.first_line,
        last = region.last_line,
        start_col = region.start_col,
        end_col = region.end_col,
        "edit"
    );
    Ok(removed)
}

/// Put the block start marker on the cursor. The marker move is logged so
/// undo restores the previous selection. Returns whether the selection is
/// valid.
pub fn mark_block_begin(file: &mut File) -> ActionResult<bool> {
    let before = file.status();
    let valid = state::mark_block_begin(file);
    state::record_rearrange(file, before)?;
    Ok(valid)
}

/// Put the block end marker on the cursor; see [`mark_block_begin`].
pub fn mark_block_end(file: &mut File) -> ActionResult<bool> {
    let before = file.status();
    let valid = state::mark_block_end(file);
    state::record_rearrange(file, before)?;
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use core_config::EditPolicy;
    use core_text::Arena;

    fn file(text: &str) -> File {
        File::from_bytes(Arena::new(), text.as_bytes(), EditPolicy::with_tab_size(4)).unwrap()
    }

    fn texts(f: &File) -> Vec<String> {
        f.line_texts()
            .into_iter()
            .map(|t| String::from_utf8_lossy(t).into_owned())
            .collect()
    }

    #[test]
    fn insert_in_virtual_space_pads_first() {
        let mut f = file("ab\ncd");
        f.set_cursor_col(0, 5).unwrap();
        insert_text(&mut f, b"X").unwrap();
        assert_eq!(texts(&f), vec!["ab   X", "cd"]);
        assert_eq!(f.cursor().col, 6);
        let groups: Vec<_> = f.undo_log().records().iter().map(|r| r.group).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], groups[1]);
    }

    #[test]
    fn padding_follows_tab_policy() {
        let mut f = File::from_bytes(
            Arena::new(),
            b"a",
            EditPolicy {
                use_tabs: true,
                ..EditPolicy::with_tab_size(4)
            },
        )
        .unwrap();
        f.set_cursor_col(0, 9).unwrap();
        insert_text(&mut f, b"!").unwrap();
        assert_eq!(texts(&f), vec!["a\t\t !"]);
    }

    #[test]
    fn delete_a_character_joins_at_end_of_line() {
        let mut f = file("ab\ncd");
        f.set_cursor(Position::new(0, 1)).unwrap();
        assert!(delete_a_character(&mut f).unwrap());
        assert_eq!(texts(&f), vec!["a", "cd"]);
        assert!(delete_a_character(&mut f).unwrap());
        assert_eq!(texts(&f), vec!["acd"]);
        f.set_cursor(Position::new(0, 3)).unwrap();
        assert!(!delete_a_character(&mut f).unwrap(), "nothing after the last line");
    }

    #[test]
    fn delete_a_character_in_virtual_space_pads_then_joins() {
        let mut f = file("ab\ncd");
        f.set_cursor_col(0, 4).unwrap();
        assert!(delete_a_character(&mut f).unwrap());
        assert_eq!(texts(&f), vec!["ab  cd"]);
        assert_eq!(f.cursor().col, 4);
    }

    #[test]
    fn overwrite_falls_back_to_insert() {
        let mut f = file("ab");
        f.set_cursor(Position::new(0, 0)).unwrap();
        overwrite_char(&mut f, b'X').unwrap();
        assert_eq!(texts(&f), vec!["Xb"]);
        overwrite_char(&mut f, b'\n').unwrap();
        assert_eq!(texts(&f), vec!["X", "b"]);
        f.set_cursor(Position::new(2, 0)).unwrap();
        overwrite_char(&mut f, b'Z').unwrap();
        assert_eq!(texts(&f), vec!["X", "b", "Z"]);
    }

    #[test]
    fn delete_block_needs_a_selection() {
        let mut f = file("abc");
        let err = delete_block(&mut f).unwrap_err();
        assert_eq!(err, ActionError::Edit(EditError::NoSelection));
    }

    #[test]
    fn column_selection_is_clipped_to_the_file() {
        let mut f = file("abc\ndef");
        f.set_cursor_col(0, 1).unwrap();
        mark_block_begin(&mut f).unwrap();
        f.set_cursor_col(2, 2).unwrap();
        mark_block_end(&mut f).unwrap();
        state::set_column_mode(&mut f, true);
        assert_eq!(selected(&f).unwrap(), Selected::Columns(ColumnRegion::new(0, 1, 1, 2)));
    }
}
