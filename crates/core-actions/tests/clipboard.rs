mod common;

use common::*;
use core_actions::{
    Clipboard, copy_block, cut_block, insert_text, mark_block_begin, mark_block_end, paste_block,
    redo, undo,
};
use core_state::{ColumnRegion, select_chars, select_columns, set_column_mode};
use core_text::Arena;

#[test]
fn cut_then_paste_elsewhere() {
    let mut f = file("one two three\nfour");
    let mut clip = Clipboard::new();
    select_chars(&mut f, at(0, 4), at(0, 8)).unwrap();
    cut_block(&mut f, &mut clip).unwrap();
    assert_eq!(lines(&f), vec!["one three", "four"]);
    assert!(!f.selection().valid, "cut selection is gone");

    f.set_cursor(at(1, 4)).unwrap();
    let after = assert_undo_redo(&mut f, |f| paste_block(f, &clip).unwrap());
    assert_eq!(after.lines, vec!["one three", "fourtwo "]);

    // Undo the paste, then the cut.
    undo(&mut f).unwrap();
    undo(&mut f).unwrap();
    assert_eq!(lines(&f), vec!["one two three", "four"]);
}

#[test]
fn multi_line_paste_keeps_clipboard() {
    let mut f = file("ab\ncd\nef");
    let mut clip = Clipboard::new();
    select_chars(&mut f, at(0, 1), at(1, 1)).unwrap();
    copy_block(&f, &mut clip).unwrap();
    assert_eq!(clip.get().unwrap().line_count(), 2);

    f.set_cursor(at(2, 1)).unwrap();
    paste_block(&mut f, &clip).unwrap();
    paste_block(&mut f, &clip).unwrap();
    assert_eq!(lines(&f), vec!["ab", "cd", "eb", "cb", "cf"]);
    undo(&mut f).unwrap();
    assert_eq!(lines(&f), vec!["ab", "cd", "eb", "cf"]);
}

#[test]
fn column_copy_and_paste() {
    let mut f = file("abcd\nefgh\nij");
    let mut clip = Clipboard::new();
    select_columns(&mut f, ColumnRegion::new(0, 1, 1, 3)).unwrap();
    copy_block(&f, &mut clip).unwrap();
    assert!(clip.is_column());

    f.set_cursor(at(1, 4)).unwrap();
    let after = assert_undo_redo(&mut f, |f| paste_block(f, &clip).unwrap());
    assert_eq!(after.lines, vec!["abcd", "efghbc", "ij  fg"]);
}

#[test]
fn column_cut_and_paste_across_a_tab() {
    let mut f = file("\tbc\nxxxxxx");
    let mut clip = Clipboard::new();
    select_columns(&mut f, ColumnRegion::new(0, 1, 2, 5)).unwrap();
    cut_block(&mut f, &mut clip).unwrap();
    assert_eq!(lines(&f), vec!["  c", "xxx"]);
    assert_eq!(clip.get().unwrap().line_texts(), vec![&b"  b"[..], b"xxx"]);

    f.set_cursor_col(0, 2).unwrap();
    paste_block(&mut f, &clip).unwrap();
    assert_eq!(lines(&f), vec!["    bc", "xxxxxx"]);

    undo(&mut f).unwrap();
    undo(&mut f).unwrap();
    assert_eq!(lines(&f), vec!["\tbc", "xxxxxx"]);
}

#[test]
fn column_cut_via_marked_block() {
    let mut f = file("abc\ndefg");
    let mut clip = Clipboard::new();
    f.set_cursor_col(0, 1).unwrap();
    mark_block_begin(&mut f).unwrap();
    f.set_cursor_col(1, 3).unwrap();
    mark_block_end(&mut f).unwrap();
    assert!(set_column_mode(&mut f, true));

    cut_block(&mut f, &mut clip).unwrap();
    assert_eq!(lines(&f), vec!["a", "dg"]);

    f.set_cursor_col(0, 1).unwrap();
    paste_block(&mut f, &clip).unwrap();
    assert_eq!(lines(&f), vec!["abc", "defg"]);

    undo(&mut f).unwrap();
    assert_eq!(lines(&f), vec!["a", "dg"]);
    undo(&mut f).unwrap();
    assert_eq!(lines(&f), vec!["abc", "defg"]);
    redo(&mut f).unwrap();
    assert_eq!(lines(&f), vec!["a", "dg"]);
}

#[test]
fn clipboard_outlives_source_file() {
    let arena = Arena::new();
    let mut clip = Clipboard::new();
    {
        let mut src = file_in(&arena, "keep this\nand that");
        select_chars(&mut src, at(0, 5), at(1, 3)).unwrap();
        cut_block(&mut src, &mut clip).unwrap();
        insert_text(&mut src, b"!").unwrap();
    }
    let mut dst = file_in(&arena, "");
    paste_block(&mut dst, &clip).unwrap();
    assert_eq!(lines(&dst), vec!["this", "and"]);
    drop(dst);
    assert!(arena.live_blocks() > 0, "clipboard still holds its copy");
    clip.clear();
    assert_eq!(arena.live_blocks(), 0);
    assert_eq!(arena.live_bytes(), 0);
}
