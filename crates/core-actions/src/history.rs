//! Undo / redo driver.
//!
//! Replays the records of one undo group through the inverse primitives.
//! [`undo`] walks the newest live group backwards and leaves each record's
//! `before` status in place; [`redo`] walks the oldest undone group forwards
//! and leaves its `after` status. Replay does not log: the records only
//! change their `undone` flag.
//!
//! A record that fails to replay stops the walk. Records already replayed
//! keep their new flag, so the undone records still form a suffix of the log
//! and the file matches the log.

use core_state::{
    File, PatternMode, Position, UndoKind, UndoRecord, UndoRegion, delete_character_block_prim,
    delete_column_block_prim, insert_character_block_prim, insert_column_block_prim,
    overwrite_byte_prim,
};
use core_text::Block;
use tracing::{debug, trace};

use crate::error::{ActionError, ActionResult};

/// Revert the newest group of edits.
pub fn undo(file: &mut File) -> ActionResult<()> {
    let range = file.undo_log().undo_range().ok_or(ActionError::NothingToUndo)?;
    let records = range.len();
    for index in range.rev() {
        let Some(rec) = file.undo_log().get(index).cloned() else {
            break;
        };
        if let Err(e) = revert(file, index, &rec) {
            debug!(target: "actions.undo", index, kind = ?rec.kind, error = %e, "undo_failed");
            return Err(e);
        }
        file.restore_status(rec.before);
        file.undo_log_mut().set_undone(index, true);
    }
    let cursor = file.cursor();
    trace!(
        target: "actions.undo",
        op = "undo",
        records,
        line = cursor.line,
        pos = cursor.pos,
        "undo"
    );
    Ok(())
}

/// Re-apply the oldest undone group.
pub fn redo(file: &mut File) -> ActionResult<()> {
    let range = file.undo_log().redo_range().ok_or(ActionError::NothingToRedo)?;
    let records = range.len();
    for index in range {
        let Some(rec) = file.undo_log().get(index).cloned() else {
            break;
        };
        if let Err(e) = reapply(file, index, &rec) {
            debug!(target: "actions.undo", index, kind = ?rec.kind, error = %e, "redo_failed");
            return Err(e);
        }
        file.restore_status(rec.after);
        file.undo_log_mut().set_undone(index, false);
    }
    let cursor = file.cursor();
    trace!(
        target: "actions.undo",
        op = "redo",
        records,
        line = cursor.line,
        pos = cursor.pos,
        "redo"
    );
    Ok(())
}

fn payload(rec: &UndoRecord, index: usize) -> ActionResult<&Block> {
    rec.payload.as_ref().ok_or(ActionError::MissingPayload { index })
}

fn revert(file: &mut File, index: usize, rec: &UndoRecord) -> ActionResult<()> {
    match (rec.kind, rec.region) {
        (UndoKind::Insert, UndoRegion::Chars { start, end }) => {
            delete_character_block_prim(file, start, end)?;
        }
        (UndoKind::Insert, UndoRegion::Columns { region, appended }) => {
            delete_column_block_prim(file, region, PatternMode::Replay(payload(rec, index)?))?;
            drop_appended_lines(file, appended)?;
        }
        (UndoKind::Delete, UndoRegion::Chars { start, .. }) => {
            file.set_cursor(start)?;
            insert_character_block_prim(file, payload(rec, index)?)?;
        }
        (UndoKind::Delete, UndoRegion::Columns { region, .. }) => {
            file.set_cursor_col(region.first_line, region.start_col)?;
            insert_column_block_prim(file, payload(rec, index)?)?;
        }
        (UndoKind::Replace, UndoRegion::Byte { at, old, .. }) => {
            overwrite_byte_prim(file, at, old)?;
        }
        _ => {}
    }
    trace!(target: "actions.undo", index, kind = ?rec.kind, group = rec.group, "reverted");
    Ok(())
}

fn reapply(file: &mut File, index: usize, rec: &UndoRecord) -> ActionResult<()> {
    match (rec.kind, rec.region) {
        (UndoKind::Insert, UndoRegion::Chars { .. }) => {
            file.restore_status(rec.before);
            insert_character_block_prim(file, payload(rec, index)?)?;
        }
        (UndoKind::Insert, UndoRegion::Columns { .. }) => {
            file.restore_status(rec.before);
            insert_column_block_prim(file, payload(rec, index)?)?;
        }
        (UndoKind::Delete, UndoRegion::Chars { start, end }) => {
            delete_character_block_prim(file, start, end)?;
        }
        (UndoKind::Delete, UndoRegion::Columns { region, .. }) => {
            delete_column_block_prim(file, region, PatternMode::Replay(payload(rec, index)?))?;
        }
        (UndoKind::Replace, UndoRegion::Byte { at, new, .. }) => {
            overwrite_byte_prim(file, at, Some(new))?;
        }
        _ => {}
    }
    trace!(target: "actions.undo", index, kind = ?rec.kind, group = rec.group, "reapplied");
    Ok(())
}

/// Remove the last `appended` lines, which a column insert added past the
/// old end of the file and which are empty again once its pattern is gone.
fn drop_appended_lines(file: &mut File, appended: usize) -> ActionResult<()> {
    let n = file.line_count();
    let Some(kept) = n.checked_sub(appended) else {
        return Ok(());
    };
    if appended == 0 {
        return Ok(());
    }
    let start = match kept {
        0 => Position::new(0, 0),
        k => Position::new(k - 1, file.line_len(k - 1)),
    };
    let end = Position::new(n - 1, file.line_len(n - 1));
    delete_character_block_prim(file, start, end)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{insert_text, mark_block_begin, overwrite_char};
    use core_config::EditPolicy;
    use core_text::Arena;

    fn file(text: &str) -> File {
        File::from_bytes(Arena::new(), text.as_bytes(), EditPolicy::with_tab_size(4)).unwrap()
    }

    #[test]
    fn empty_log_reports_nothing_to_do() {
        let mut f = file("abc");
        assert_eq!(undo(&mut f).unwrap_err(), ActionError::NothingToUndo);
        assert_eq!(redo(&mut f).unwrap_err(), ActionError::NothingToRedo);
    }

    #[test]
    fn undo_restores_modified_flag() {
        let mut f = file("abc");
        f.set_cursor(Position::new(0, 1)).unwrap();
        insert_text(&mut f, b"xy").unwrap();
        assert!(f.is_modified());
        undo(&mut f).unwrap();
        assert!(!f.is_modified());
        assert_eq!(f.line_texts(), vec![&b"abc"[..]]);
        redo(&mut f).unwrap();
        assert!(f.is_modified());
        assert_eq!(f.line_texts(), vec![&b"axybc"[..]]);
    }

    #[test]
    fn overwrite_appending_past_end_is_undone() {
        let mut f = file("ab");
        f.set_cursor(Position::new(0, 1)).unwrap();
        overwrite_char(&mut f, b'X').unwrap();
        overwrite_char(&mut f, b'Y').unwrap();
        assert_eq!(f.line_texts(), vec![&b"aXY"[..]]);
        undo(&mut f).unwrap();
        assert_eq!(f.line_texts(), vec![&b"aX"[..]]);
        undo(&mut f).unwrap();
        assert_eq!(f.line_texts(), vec![&b"ab"[..]]);
        assert_eq!(f.cursor().pos, 1);
    }

    #[test]
    fn rearrange_undo_restores_markers() {
        let mut f = file("abc");
        f.set_cursor(Position::new(0, 2)).unwrap();
        mark_block_begin(&mut f).unwrap();
        assert!(f.selection().start_set);
        undo(&mut f).unwrap();
        assert!(!f.selection().start_set);
        redo(&mut f).unwrap();
        assert_eq!(f.selection().start.pos, 2);
    }

    #[test]
    fn new_edit_after_undo_drops_redo() {
        let mut f = file("abc");
        f.set_cursor(Position::new(0, 3)).unwrap();
        insert_text(&mut f, b"1").unwrap();
        undo(&mut f).unwrap();
        insert_text(&mut f, b"2").unwrap();
        assert_eq!(redo(&mut f).unwrap_err(), ActionError::NothingToRedo);
        assert_eq!(f.line_texts(), vec![&b"abc2"[..]]);
    }
}
