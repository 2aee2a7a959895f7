//! Building standalone blocks from file content.

use std::borrow::Cow;

use core_text::{Block, BlockWriter, tabs};
use tracing::trace;

use crate::error::{EditError, EditResult};
use crate::file::File;
use crate::position::{ColumnRegion, Position};

/// Snapshot a region of `file` as a block.
///
/// With `is_column` false, `[start, end)` is a character range: the first
/// line contributes from `start.pos`, the last up to `end.pos`, interior
/// lines whole. An end of `(l, 0)` contributes an empty last line, as does
/// an end on the virtual end-of-file line.
///
/// With `is_column` true, `start.pos` and `end.pos` are read as screen
/// columns and the block holds one piece per line of the rectangle
/// `[start.pos, end.pos)` over `start.line..=end.line`.
///
/// The copy lives in one new arena block terminated with the file's EOL.
pub fn make_copy_of_block(
    file: &File,
    start: Position,
    end: Position,
    is_column: bool,
) -> EditResult<Block> {
    if is_column {
        copy_column_block(file, ColumnRegion::new(start.line, end.line, start.pos, end.pos))
    } else {
        copy_char_block(file, start, end)
    }
}

fn char_piece(file: &File, line: usize, start: Position, end: Position) -> &[u8] {
    let text = file.line_text(line);
    match (line == start.line, line == end.line) {
        (true, true) => &text[start.pos..end.pos],
        (true, false) => &text[start.pos..],
        (false, true) => &text[..end.pos],
        (false, false) => text,
    }
}

/// The columns `[start_col, end_col)` of line `line`. A tab that overlaps
/// the range, at either edge or inside it, comes out as the spaces it covers
/// there, so every piece is exactly as wide as it is long.
fn column_piece<'a>(file: &'a File, line: usize, region: &ColumnRegion) -> Cow<'a, [u8]> {
    let text = file.line_text(line);
    let ts = file.tab_size();
    if !text.contains(&tabs::TAB) {
        let p0 = tabs::clamp_pos_of_column(text, region.start_col, ts);
        let p1 = tabs::clamp_pos_of_column(text, region.end_col, ts);
        return Cow::Borrowed(&text[p0..p1]);
    }
    let mut piece = Vec::new();
    let mut col = 0;
    for &b in text {
        if col >= region.end_col {
            break;
        }
        if b == tabs::TAB {
            let next = tabs::tab_stop(col, ts);
            let from = col.max(region.start_col);
            let to = next.min(region.end_col);
            piece.extend(std::iter::repeat_n(tabs::SPACE, to.saturating_sub(from)));
            col = next;
        } else {
            if col >= region.start_col {
                piece.push(b);
            }
            col += 1;
        }
    }
    Cow::Owned(piece)
}

/// Character-block copy of `[start, end)`.
pub fn copy_char_block(file: &File, start: Position, end: Position) -> EditResult<Block> {
    file.check_range(start, end)?;
    let eol = file.eol();
    let lens = (start.line..=end.line).map(|l| char_piece(file, l, start, end).len());
    let (bytes, count) = BlockWriter::measure(lens, eol);
    let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
    for line in start.line..=end.line {
        w.push(char_piece(file, line, start, end));
        w.end_line();
    }
    let block = w.finish(false)?;
    trace!(
        target: "state.block",
        start_line = start.line,
        start_pos = start.pos,
        end_line = end.line,
        end_pos = end.pos,
        lines = count,
        "copy_char_block"
    );
    Ok(block)
}

/// Column-block copy of a rectangle. Lines shorter than the left edge, and
/// lines past the end of the file, give empty pieces. The pieces hold no
/// tabs.
pub fn copy_column_block(file: &File, region: ColumnRegion) -> EditResult<Block> {
    if !region.is_valid() {
        return Err(EditError::InvalidColumnRegion(region));
    }
    file.check_position(Position::new(region.first_line, 0))?;
    let eol = file.eol();
    let lens = region.lines().map(|l| column_piece(file, l, &region).len());
    let (bytes, count) = BlockWriter::measure(lens, eol);
    let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
    for line in region.lines() {
        w.push(&column_piece(file, line, &region));
        w.end_line();
    }
    let block = w.finish(true)?;
    trace!(
        target: "state.block",
        first_line = region.first_line,
        last_line = region.last_line,
        start_col = region.start_col,
        end_col = region.end_col,
        "copy_column_block"
    );
    Ok(block)
}

/// Fit a column block to the cursor of `file` for a later
/// [`crate::insert_column_block_prim`].
///
/// For each target line `cursor.line + i`: when the line does not reach the
/// cursor column the piece is prefixed with the blanks (per the file's
/// policy) bridging the gap, and an empty piece stays empty; when text
/// follows the cursor column the piece is right-padded with spaces to the
/// block width so the text after it stays aligned.
///
/// Returns the pattern and the block width.
pub fn fit_column_block(file: &File, block: &Block) -> EditResult<(Block, usize)> {
    let cursor = file.cursor();
    let policy = *file.policy();
    let width = block.width();
    let plan: Vec<(tabs::Blanks, usize)> = block
        .lines()
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let line_width = file.line_width(cursor.line + i);
            if line_width <= cursor.col {
                if piece.is_empty() {
                    (tabs::Blanks::default(), 0)
                } else {
                    (tabs::calc_blanks(line_width, cursor.col, &policy), 0)
                }
            } else {
                (tabs::Blanks::default(), width - piece.len())
            }
        })
        .collect();
    let eol = file.eol();
    let lens = block
        .lines()
        .iter()
        .zip(&plan)
        .map(|(piece, (blanks, pad))| blanks.len() + piece.len() + pad);
    let (bytes, count) = BlockWriter::measure(lens, eol);
    let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
    for (piece, (blanks, pad)) in block.lines().iter().zip(&plan) {
        w.push_blanks(*blanks);
        w.push(piece.text());
        w.push_repeated(tabs::SPACE, *pad);
        w.end_line();
    }
    let pattern = w.finish(true)?;
    trace!(
        target: "state.block",
        line = cursor.line,
        col = cursor.col,
        width,
        lines = count,
        "fit_column_block"
    );
    Ok((pattern, width))
}
