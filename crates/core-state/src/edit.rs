//! Undo-logged edits built on the primitives.
//!
//! Every function here reserves an undo slot before touching the file, runs
//! one primitive, and records what is needed to invert it. An error leaves
//! both the file and the log as they were.

use core_text::{Block, generate_block, tabs};
use tracing::{debug, trace};

use crate::char_ops::{
    delete_character_block_prim, insert_character_block_prim, insertion_extent, overwrite_byte_prim,
};
use crate::column::{PatternMode, delete_column_block_prim, insert_column_block_prim};
use crate::copy::copy_char_block;
use crate::error::{EditError, EditResult};
use crate::file::File;
use crate::position::{ColumnRegion, Position};
use crate::undo::{FileStatus, UndoKind, UndoRegion};

/// Insert `block` at the cursor.
pub fn insert_character_block(file: &mut File, block: &Block) -> EditResult<()> {
    let before = file.status();
    let (start, end) = insertion_extent(file, block);
    file.undo_log_mut().reserve()?;
    insert_character_block_prim(file, block)?;
    let after = file.status();
    file.undo_log_mut().record(
        UndoKind::Insert,
        before,
        after,
        UndoRegion::Chars { start, end },
        Some(block.clone()),
    )?;
    Ok(())
}

/// Delete `[start, end)`, keeping a copy of the text for undo.
pub fn delete_character_block(file: &mut File, start: Position, end: Position) -> EditResult<()> {
    file.check_range(start, end)?;
    let start = file.normalize_end(start);
    let end = file.normalize_end(end);
    if start == end || file.line_count() == 0 {
        return Ok(());
    }
    let before = file.status();
    let pattern = copy_char_block(file, start, end)?;
    file.undo_log_mut().reserve()?;
    delete_character_block_prim(file, start, end)?;
    let after = file.status();
    file.undo_log_mut().record(
        UndoKind::Delete,
        before,
        after,
        UndoRegion::Chars { start, end },
        Some(pattern),
    )?;
    Ok(())
}

/// Insert a fitted column pattern of the given width at the cursor.
pub fn insert_column_block(file: &mut File, pattern: &Block, width: usize) -> EditResult<()> {
    let before = file.status();
    let cursor = file.cursor();
    let region = ColumnRegion::new(
        cursor.line,
        cursor.line + pattern.line_count() - 1,
        cursor.col,
        cursor.col + width,
    );
    file.undo_log_mut().reserve()?;
    let appended = insert_column_block_prim(file, pattern)?;
    let after = file.status();
    file.undo_log_mut().record(
        UndoKind::Insert,
        before,
        after,
        UndoRegion::Columns { region, appended },
        Some(pattern.clone()),
    )?;
    Ok(())
}

/// Delete a rectangle; returns the removal pattern that was recorded.
pub fn delete_column_block(file: &mut File, region: ColumnRegion) -> EditResult<Block> {
    let before = file.status();
    file.undo_log_mut().reserve()?;
    let pattern = delete_column_block_prim(file, region, PatternMode::Generate)?
        .ok_or(EditError::InvalidColumnRegion(region))?;
    let after = file.status();
    file.undo_log_mut().record(
        UndoKind::Delete,
        before,
        after,
        UndoRegion::Columns { region, appended: 0 },
        Some(pattern.clone()),
    )?;
    Ok(pattern)
}

/// Overwrite the byte under the cursor (or append at end of line) and step
/// the cursor past it.
pub fn overwrite_char(file: &mut File, byte: u8) -> EditResult<()> {
    let before = file.status();
    let at = file.cursor().position();
    file.undo_log_mut().reserve()?;
    let old = overwrite_byte_prim(file, at, Some(byte))?;
    file.put_cursor(Position::new(at.line, at.pos + 1));
    let after = file.status();
    file.undo_log_mut().record(
        UndoKind::Replace,
        before,
        after,
        UndoRegion::Byte { at, old, new: byte },
        None,
    )?;
    Ok(())
}

/// Record a cursor or selection change made since `before`.
pub fn record_rearrange(file: &mut File, before: FileStatus) -> EditResult<()> {
    let after = file.status();
    file.undo_log_mut()
        .record(UndoKind::Rearrange, before, after, UndoRegion::None, None)?;
    Ok(())
}

/// Replace every tab that lies partly inside the columns of `region` by the
/// spaces it displays as, so that column arithmetic inside the region can
/// count one column per byte.
///
/// Each replacement is a logged delete plus a logged insert, all inside one
/// undo group. A failure part way keeps the replacements already made.
/// Returns the number of tab runs replaced; a second run on the same region
/// replaces none.
pub fn detab_column_region(file: &mut File, region: ColumnRegion) -> EditResult<usize> {
    if !region.is_valid() {
        return Err(EditError::InvalidColumnRegion(region));
    }
    let saved = file.cursor();
    file.undo_log_mut().begin_group();
    let result = detab_lines(file, region);
    file.undo_log_mut().end_group();
    match result {
        Ok(runs) => {
            if runs > 0 {
                file.set_cursor_col(saved.line, saved.col)?;
            }
            trace!(
                target: "state.block",
                first = region.first_line,
                last = region.last_line,
                runs,
                "detab_column_region"
            );
            Ok(runs)
        }
        Err(e) => {
            debug!(target: "state.block", error = %e, "detab_partial");
            Err(e)
        }
    }
}

fn detab_lines(file: &mut File, region: ColumnRegion) -> EditResult<usize> {
    let ts = file.tab_size();
    let mut replaced = 0;
    for r in region.lines() {
        if r >= file.line_count() {
            break;
        }
        let runs =
            tabs::tab_runs_overlapping(file.line_text(r), region.start_col, region.end_col, ts);
        for &(pos, count, start_col, end_col) in runs.iter().rev() {
            delete_character_block(file, Position::new(r, pos), Position::new(r, pos + count))?;
            file.set_cursor(Position::new(r, pos))?;
            let spaces = generate_block(file.arena(), tabs::SPACE, end_col - start_col)?;
            insert_character_block(file, &spaces)?;
            replaced += 1;
        }
    }
    Ok(replaced)
}
