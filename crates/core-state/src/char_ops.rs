//! Character-block splices: insert at the cursor, delete a range, and the
//! single-byte replace of overwrite mode.
//!
//! Each primitive validates, builds every new line it needs, and only then
//! touches the line index. An error before the splice leaves the file as it
//! was; the new storage built so far is dropped with it.

use core_text::{Block, BlockWriter, Line, duplicate_block};
use tracing::trace;

use crate::error::EditResult;
use crate::file::File;
use crate::markers::{update_markers, update_markers_delete};
use crate::position::Position;

/// Character range `[start, end)` that inserting `block` at the cursor will
/// occupy afterwards.
///
/// Inserting on the virtual end-of-file line of a non-empty file appends
/// the block's lines after the last line, which is the same as inserting a
/// line break plus the block at the end of the last line; the extent starts
/// there so that deleting it restores the file.
pub fn insertion_extent(file: &File, block: &Block) -> (Position, Position) {
    let cursor = file.cursor();
    let n = file.line_count();
    let k = block.line_count();
    let last = block.last_line().len();
    if cursor.line == n && n > 0 {
        (Position::new(n - 1, file.line_len(n - 1)), Position::new(n + k - 1, last))
    } else if k == 1 {
        (cursor.position(), Position::new(cursor.line, cursor.pos + last))
    } else {
        (cursor.position(), Position::new(cursor.line + k - 1, last))
    }
}

/// Insert `block` at the cursor and leave the cursor after it.
///
/// The cursor line is split at the cursor; prefix and suffix are fused onto
/// the block's first and last lines in one allocation. A one-line block
/// replaces a single index entry in place.
pub fn insert_character_block_prim(file: &mut File, block: &Block) -> EditResult<()> {
    let cursor = file.cursor();
    file.check_position(cursor.position())?;
    let n = file.line_count();
    let row = cursor.line;
    let k = block.line_count();

    if row == n {
        let dup = duplicate_block(file.arena(), block, file.eol(), b"", b"")?;
        let suffix_at = dup.suffix_position;
        file.lines_mut().splice(n..n, dup.block.into_lines())?;
        trace!(target: "state.block", row, lines = k, "insert_at_eof");
        if n == 0 {
            update_markers(file, 0, 0, k - 1, suffix_at);
        } else {
            let len = file.line_len(n - 1);
            update_markers(file, n - 1, len, k, suffix_at);
        }
        return Ok(());
    }

    let text = file.line_text(row);
    let (prefix, suffix) = text.split_at(cursor.pos);
    let dup = duplicate_block(file.arena(), block, file.eol(), prefix, suffix)?;
    let suffix_at = dup.suffix_position;
    let mut lines = dup.block.into_lines();
    if k == 1 {
        if let Some(line) = lines.pop() {
            file.lines_mut().replace(row, line);
        }
        trace!(target: "state.block", row, pos = cursor.pos, "insert_single_line");
    } else {
        file.lines_mut().splice(row..row + 1, lines)?;
        trace!(target: "state.block", row, pos = cursor.pos, lines = k, "insert_multi_line");
    }
    update_markers(file, row, cursor.pos, k - 1, suffix_at);
    Ok(())
}

/// Remove `[start, end)` and leave the cursor at `start`.
///
/// The text before `start` and after `end` is joined into one line. An end
/// on the virtual end-of-file line means the end of the last line. When the
/// range covers the whole file the result has no lines at all.
pub fn delete_character_block_prim(
    file: &mut File,
    start: Position,
    end: Position,
) -> EditResult<()> {
    file.check_range(start, end)?;
    let start = file.normalize_end(start);
    let end = file.normalize_end(end);
    let n = file.line_count();
    if n == 0 || start == end {
        return Ok(());
    }

    let head_len = start.pos;
    let tail_len = file.line_len(end.line) - end.pos;
    if head_len == 0 && tail_len == 0 && start == Position::origin() && end.line == n - 1 {
        file.lines_mut().clear();
        trace!(target: "state.block", lines = n, "delete_whole_file");
        update_markers_delete(file, start, end);
        return Ok(());
    }

    let joined = join_lines(file, start, end)?;
    file.lines_mut().splice(start.line..end.line + 1, vec![joined])?;
    trace!(
        target: "state.block",
        start_line = start.line,
        start_pos = start.pos,
        end_line = end.line,
        end_pos = end.pos,
        "delete_char_block"
    );
    update_markers_delete(file, start, end);
    Ok(())
}

/// Line made of the text before `start` and after `end`. Reuses existing
/// storage when one side is empty.
fn join_lines(file: &File, start: Position, end: Position) -> EditResult<Line> {
    let head_src = file.line(start.line);
    let tail_src = file.line(end.line);
    let (Some(head_src), Some(tail_src)) = (head_src, tail_src) else {
        return Err(core_text::TextError::LineOutOfRange {
            line: end.line,
            count: file.line_count(),
        }
        .into());
    };
    let tail_range = end.pos..tail_src.len();
    if tail_range.is_empty() {
        return Ok(head_src.slice(0..start.pos));
    }
    if start.pos == 0 {
        return Ok(tail_src.slice(tail_range));
    }
    let eol = file.eol();
    let (bytes, count) = BlockWriter::measure([start.pos + tail_range.len()], eol);
    let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
    w.push(&head_src.text()[..start.pos]);
    w.push(&tail_src.text()[tail_range]);
    w.end_line();
    let block = w.finish(false)?;
    Ok(block.into_lines().remove(0))
}

/// Overwrite (`Some`) or remove (`None`) the byte at `at`. Writing at the
/// end of the line appends. Returns the byte previously there.
///
/// The line is rebuilt in fresh storage; the old bytes stay untouched for
/// any block still sharing them.
pub fn overwrite_byte_prim(
    file: &mut File,
    at: Position,
    byte: Option<u8>,
) -> EditResult<Option<u8>> {
    file.check_position(at)?;
    if file.is_eof_line(at.line) {
        return Err(core_text::TextError::LineOutOfRange {
            line: at.line,
            count: file.line_count(),
        }
        .into());
    }
    let text = file.line_text(at.line);
    let old = text.get(at.pos).copied();
    if byte.is_none() && old.is_none() {
        return Err(core_text::TextError::PositionOutOfRange {
            line: at.line,
            pos: at.pos,
            len: text.len(),
        }
        .into());
    }
    let rest = if old.is_some() { at.pos + 1 } else { at.pos };
    let new_len = at.pos + usize::from(byte.is_some()) + (text.len() - rest);
    let eol = file.eol();
    let (bytes, count) = BlockWriter::measure([new_len], eol);
    let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
    w.push(&text[..at.pos]);
    if let Some(b) = byte {
        w.push(&[b]);
    }
    w.push(&text[rest..]);
    w.end_line();
    let mut lines = w.finish(false)?.into_lines();
    if let Some(line) = lines.pop() {
        file.lines_mut().replace(at.line, line);
    }
    file.notify_eol_invalidated(at.line);
    file.mark_changed();
    trace!(
        target: "state.block",
        line = at.line,
        pos = at.pos,
        appended = old.is_none(),
        "overwrite_byte"
    );
    Ok(old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::EditPolicy;
    use core_text::{Arena, LineAttr, make_block};

    fn file(text: &str) -> File {
        File::from_bytes(Arena::new(), text.as_bytes(), EditPolicy::with_tab_size(4)).unwrap()
    }

    fn block(f: &File, text: &str) -> Block {
        make_block(f.arena(), text.as_bytes(), LineAttr::empty()).unwrap()
    }

    #[test]
    fn single_line_fast_path() {
        let mut f = file("held\nx");
        f.set_cursor(Position::new(0, 2)).unwrap();
        let b = block(&f, "ll");
        insert_character_block_prim(&mut f, &b).unwrap();
        assert_eq!(f.line_texts(), vec![&b"hellld"[..], b"x"]);
        assert_eq!(f.cursor().position(), Position::new(0, 4));
        assert!(f.is_modified());
    }

    #[test]
    fn multi_line_insert_splits_cursor_line() {
        let mut f = file("abcd");
        f.set_cursor(Position::new(0, 2)).unwrap();
        let b = block(&f, "1\n2\n3");
        assert_eq!(insertion_extent(&f, &b), (Position::new(0, 2), Position::new(2, 1)));
        insert_character_block_prim(&mut f, &b).unwrap();
        assert_eq!(f.line_texts(), vec![&b"ab1"[..], b"2", b"3cd"]);
        assert_eq!(f.cursor().position(), Position::new(2, 1));
    }

    #[test]
    fn newline_at_end_of_line() {
        let mut f = file("hello");
        f.set_cursor(Position::new(0, 5)).unwrap();
        let b = block(&f, "\n");
        insert_character_block_prim(&mut f, &b).unwrap();
        assert_eq!(f.line_texts(), vec![&b"hello"[..], b""]);
        assert_eq!(f.cursor().position(), Position::new(1, 0));
        assert_eq!(f.cursor().col, 0);
    }

    #[test]
    fn insert_on_eof_line_appends() {
        let mut f = file("a");
        f.set_cursor(Position::new(1, 0)).unwrap();
        let b = block(&f, "x\ny");
        assert_eq!(insertion_extent(&f, &b), (Position::new(0, 1), Position::new(2, 1)));
        insert_character_block_prim(&mut f, &b).unwrap();
        assert_eq!(f.line_texts(), vec![&b"a"[..], b"x", b"y"]);
        assert_eq!(f.cursor().position(), Position::new(2, 1));
        delete_character_block_prim(&mut f, Position::new(0, 1), Position::new(2, 1)).unwrap();
        assert_eq!(f.line_texts(), vec![&b"a"[..]]);
    }

    #[test]
    fn insert_into_empty_file() {
        let mut f = file("");
        let b = block(&f, "abc");
        insert_character_block_prim(&mut f, &b).unwrap();
        assert_eq!(f.line_texts(), vec![&b"abc"[..]]);
        assert_eq!(f.cursor().position(), Position::new(0, 3));
    }

    #[test]
    fn delete_joins_lines() {
        let mut f = file("abc\ndefg\nhi");
        delete_character_block_prim(&mut f, Position::new(0, 1), Position::new(2, 1)).unwrap();
        assert_eq!(f.line_texts(), vec![&b"ai"[..]]);
        assert_eq!(f.cursor().position(), Position::new(0, 1));
    }

    #[test]
    fn delete_through_line_start() {
        let mut f = file("abc\ndefg");
        delete_character_block_prim(&mut f, Position::new(0, 0), Position::new(1, 0)).unwrap();
        assert_eq!(f.line_texts(), vec![&b"defg"[..]]);
    }

    #[test]
    fn deleting_everything_leaves_no_lines() {
        let mut f = file("hello");
        delete_character_block_prim(&mut f, Position::new(0, 0), Position::new(0, 5)).unwrap();
        assert_eq!(f.line_count(), 0);
        assert!(f.arena_blocks().is_empty());
        assert_eq!(f.arena().live_blocks(), 0);
    }

    #[test]
    fn delete_to_eof_line_keeps_one_line() {
        let mut f = file("ab\ncd");
        delete_character_block_prim(&mut f, Position::new(0, 1), Position::new(2, 0)).unwrap();
        assert_eq!(f.line_texts(), vec![&b"a"[..]]);
    }

    #[test]
    fn shared_storage_survives_delete() {
        let mut f = file("abc\ndef");
        let copy =
            crate::copy::copy_char_block(&f, Position::new(0, 0), Position::new(1, 3)).unwrap();
        let original = f.arena_blocks()[0].clone();
        delete_character_block_prim(&mut f, Position::new(0, 0), Position::new(1, 3)).unwrap();
        assert_eq!(copy.to_bytes(), b"abc\ndef");
        assert_eq!(core_text::ArenaBlock::ref_count(&original), 1);
        drop(original);
        drop(copy);
        assert_eq!(f.arena().live_blocks(), 0);
    }

    #[test]
    fn out_of_memory_leaves_file_untouched() {
        let arena = Arena::with_limit(8);
        let mut f = File::from_bytes(arena, b"abc", EditPolicy::default()).unwrap();
        let b = make_block(&Arena::new(), b"more than fits", LineAttr::empty()).unwrap();
        f.set_cursor(Position::new(0, 1)).unwrap();
        let err = insert_character_block_prim(&mut f, &b).unwrap_err();
        assert!(err.is_out_of_memory());
        assert_eq!(f.line_texts(), vec![&b"abc"[..]]);
        assert_eq!(f.cursor().position(), Position::new(0, 1));
        assert!(!f.is_modified());
        assert_eq!(f.arena().live_bytes(), 3);
    }

    #[test]
    fn overwrite_replaces_and_appends() {
        let mut f = file("abc");
        assert_eq!(
            overwrite_byte_prim(&mut f, Position::new(0, 1), Some(b'X')).unwrap(),
            Some(b'b')
        );
        assert_eq!(f.line_texts(), vec![&b"aXc"[..]]);
        assert_eq!(overwrite_byte_prim(&mut f, Position::new(0, 3), Some(b'!')).unwrap(), None);
        assert_eq!(f.line_texts(), vec![&b"aXc!"[..]]);
        assert_eq!(overwrite_byte_prim(&mut f, Position::new(0, 3), None).unwrap(), Some(b'!'));
        assert_eq!(f.line_texts(), vec![&b"aXc"[..]]);
    }
}
