//! Copy, cut and paste of the block selection.

use core_state::{File, Position, make_copy_of_block};
use core_text::Block;
use tracing::trace;

use crate::commands::{Selected, delete_block, insert_block, insert_column_block, selected};
use crate::error::{ActionError, ActionResult};

/// Holds the last copied block. The block keeps its arena storage alive
/// until it is replaced or cleared.
#[derive(Debug, Default)]
pub struct Clipboard {
    block: Option<Block>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, block: Block) {
        self.block = Some(block);
    }

    pub fn get(&self) -> Option<&Block> {
        self.block.as_ref()
    }

    pub fn take(&mut self) -> Option<Block> {
        self.block.take()
    }

    pub fn clear(&mut self) {
        self.block = None;
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Whether the held block pastes as a rectangle.
    pub fn is_column(&self) -> bool {
        self.block.as_ref().is_some_and(Block::is_column)
    }
}

/// Copy the selection into `clipboard`. The file is not changed.
pub fn copy_block(file: &File, clipboard: &mut Clipboard) -> ActionResult<()> {
    let block = match selected(file)? {
        Selected::Chars(start, end) => make_copy_of_block(file, start, end, false)?,
        Selected::Columns(region) => make_copy_of_block(
            file,
            Position::new(region.first_line, region.start_col),
            Position::new(region.last_line, region.end_col),
            true,
        )?,
    };
    trace!(
        target: "actions.dispatch",
        op = "copy",
        lines = block.line_count(),
        column = block.is_column(),
        "clipboard"
    );
    clipboard.set(block);
    Ok(())
}

/// Copy the selection into `clipboard`, then delete it.
pub fn cut_block(file: &mut File, clipboard: &mut Clipboard) -> ActionResult<()> {
    copy_block(file, clipboard)?;
    delete_block(file)
}

/// Insert the clipboard block at the cursor, as characters or as a
/// rectangle depending on how it was copied.
pub fn paste_block(file: &mut File, clipboard: &Clipboard) -> ActionResult<()> {
    let block = clipboard.get().ok_or(ActionError::ClipboardEmpty)?;
    trace!(
        target: "actions.dispatch",
        op = "paste",
        lines = block.line_count(),
        column = block.is_column(),
        "clipboard"
    );
    if block.is_column() {
        insert_column_block(file, block)
    } else {
        insert_block(file, block)
    }
}
