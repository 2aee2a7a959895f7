//! File state and the block engine.
//!
//! A [`File`] owns its line index, cursor, block selection and [`UndoLog`].
//! All text mutation goes through the primitives in this crate:
//!
//! - construction: [`make_copy_of_block`], [`fit_column_block`]
//! - character splices: [`insert_character_block_prim`],
//!   [`delete_character_block_prim`], [`overwrite_byte_prim`]
//! - column splices: [`insert_column_block_prim`],
//!   [`delete_column_block_prim`] (generating or replaying a pattern)
//! - marking: [`mark_block_begin`], [`mark_block_end`]
//!
//! Primitives are all-or-nothing: they validate, build every new line in
//! fresh arena storage, and only then splice the index and move the markers
//! ([`update_markers`], [`update_markers_delete`]). The `edit` functions
//! wrap a primitive with undo recording; the undo driver replays records
//! through the primitives directly.
//!
//! Telemetry: splices log under `state.block`, marker maintenance under
//! `state.markers`, the undo log under `state.undo`.

mod char_ops;
mod column;
mod copy;
mod edit;
mod error;
mod file;
mod markers;
mod position;
mod selection;
pub mod undo;

pub use char_ops::{
    delete_character_block_prim, insert_character_block_prim, insertion_extent, overwrite_byte_prim,
};
pub use column::{PatternMode, delete_column_block_prim, insert_column_block_prim};
pub use copy::{copy_char_block, copy_column_block, fit_column_block, make_copy_of_block};
pub use edit::{
    delete_character_block, delete_column_block, detab_column_region, insert_character_block,
    insert_column_block, overwrite_char, record_rearrange,
};
pub use error::{EditError, EditResult};
pub use file::{File, FileObserver};
pub use markers::{update_markers, update_markers_delete};
pub use position::{ColumnRegion, Cursor, Position, Selection};
pub use selection::{
    clear_selection, mark_block_begin, mark_block_end, select_chars, select_columns,
    set_column_mode,
};
pub use undo::{FileStatus, UndoKind, UndoLog, UndoRecord, UndoRegion};
