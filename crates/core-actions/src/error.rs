use core_state::EditError;
use core_text::TextError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("clipboard is empty")]
    ClipboardEmpty,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("undo record {index} carries no text")]
    MissingPayload { index: usize },
}

impl From<TextError> for ActionError {
    fn from(e: TextError) -> Self {
        ActionError::Edit(e.into())
    }
}

impl ActionError {
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, ActionError::Edit(e) if e.is_out_of_memory())
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
