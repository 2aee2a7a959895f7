use thiserror::Error;

pub type TextResult<T> = Result<T, TextError>;

/// Failures raised while building or splicing text storage.
///
/// `OutOfMemory` is recoverable: the operation that hit it has already
/// released everything it allocated. The range variants signal a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },
    #[error("line {line} out of range (line count {count})")]
    LineOutOfRange { line: usize, count: usize },
    #[error("position {pos} out of range on line {line} (length {len})")]
    PositionOutOfRange { line: usize, pos: usize, len: usize },
    #[error("block has no lines")]
    EmptyBlock,
}

impl From<std::collections::TryReserveError> for TextError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TextError::OutOfMemory { requested: 0 }
    }
}
