//! Editor-facing commands on top of the block engine.
//!
//! Every command that changes text runs inside one undo group, so a single
//! [`undo`] reverts it however many primitive edits it took (virtual-space
//! padding, detabbing, the edit itself). Compound commands are not rolled
//! back when a later step fails; the steps already made stay applied and
//! logged.
//!
//! * `commands` - insert, delete, overwrite, block marking, column edits
//! * `clipboard` - copy / cut / paste through a [`Clipboard`]
//! * `history` - the undo / redo driver
//!
//! Telemetry: commands log under `actions.dispatch`, replay under
//! `actions.undo`.

mod clipboard;
mod commands;
mod error;
mod history;

pub use clipboard::{Clipboard, copy_block, cut_block, paste_block};
pub use commands::{
    delete_a_character, delete_block, delete_char_block, delete_column_block, insert_block,
    insert_column_block, insert_text, mark_block_begin, mark_block_end, overwrite_char,
};
pub use error::{ActionError, ActionResult};
pub use history::{redo, undo};

use core_config::Config;
use core_state::File;
use core_text::Arena;

/// Build a file from `text` with the policy and arena budget of `config`.
pub fn open_file(config: &Config, text: &[u8]) -> ActionResult<File> {
    let arena = Arena::from_limit(config.arena_limit());
    let file = File::from_bytes(arena, text, config.policy())?;
    tracing::trace!(
        target: "actions.dispatch",
        op = "open",
        lines = file.line_count(),
        limit = ?config.arena_limit(),
        "open"
    );
    Ok(file)
}
