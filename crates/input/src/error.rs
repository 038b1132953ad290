use sv_common::SortError;
use thiserror::Error;

/// Errors raised while building a sequence from user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("No numbers given")]
    Empty,

    #[error("Item {index} is not an integer: {token:?}")]
    InvalidNumber { index: usize, token: String },

    #[error("Invalid random range: {reason}")]
    InvalidSpec { reason: String },
}

impl From<InputError> for SortError {
    fn from(err: InputError) -> Self {
        SortError::MalformedInput {
            reason: err.to_string(),
        }
    }
}
