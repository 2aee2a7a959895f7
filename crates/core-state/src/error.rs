use core_text::TextError;
use thiserror::Error;

use crate::position::{ColumnRegion, Position};

pub type EditResult<T> = Result<T, EditError>;

/// Errors returned by block-engine operations.
///
/// Any `Err` from a single primitive means the file was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Text(#[from] TextError),
    #[error("no valid block selection")]
    NoSelection,
    #[error("invalid character region {start:?}..{end:?}")]
    InvalidRegion { start: Position, end: Position },
    #[error("invalid column region {0:?}")]
    InvalidColumnRegion(ColumnRegion),
    #[error("pattern has {got} lines, region needs {expected}")]
    PatternMismatch { expected: usize, got: usize },
}

impl EditError {
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, EditError::Text(TextError::OutOfMemory { .. }))
    }
}
