mod common;

use anyhow::Result;
use common::*;
use core_actions::{insert_column_block, insert_text, open_file};
use core_config::load_from;
use core_state::{ColumnRegion, copy_column_block};

#[test]
fn config_policy_reaches_the_file() -> Result<()> {
    let tmp = tempfile::NamedTempFile::new()?;
    std::fs::write(tmp.path(), "[edit]\nuse_tabs = true\ntab_size = 4\n")?;
    let cfg = load_from(Some(tmp.path().to_path_buf()))?;
    let mut f = open_file(&cfg, b"ab\n\nabcdefgh")?;
    assert_eq!(f.tab_size(), 4);
    assert_eq!(f.arena().limit(), None);

    let src = file("XY\nZW\nQ");
    let rect = copy_column_block(&src, ColumnRegion::new(0, 2, 0, 2))?;
    f.set_cursor_col(0, 6)?;
    insert_column_block(&mut f, &rect)?;
    assert_eq!(lines(&f), vec!["ab\t  XY", "\t  ZW", "abcdefQ gh"]);
    Ok(())
}

#[test]
fn arena_budget_from_config() -> Result<()> {
    let tmp = tempfile::NamedTempFile::new()?;
    std::fs::write(tmp.path(), "[arena]\nlimit_bytes = 16\n")?;
    let cfg = load_from(Some(tmp.path().to_path_buf()))?;
    let mut f = open_file(&cfg, b"short")?;
    assert_eq!(f.arena().limit(), Some(16));

    let err = insert_text(&mut f, &[b'x'; 64]).unwrap_err();
    assert!(err.is_out_of_memory());
    assert_eq!(lines(&f), vec!["short"]);
    Ok(())
}

#[test]
fn missing_config_uses_defaults() -> Result<()> {
    let cfg = load_from(Some("__no_such_blockedit__.toml".into()))?;
    let f = open_file(&cfg, b"a\tb")?;
    assert_eq!(f.tab_size(), core_config::DEFAULT_TAB_SIZE);
    assert_eq!(f.line_width(0), 9);
    Ok(())
}
