use crate::database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("IO/Terminal error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Invalid key binding '{binding}' for {action}: {reason}")]
    KeyBindingError {
        action: &'static str,
        binding: String,
        reason: String,
    },

    #[error("Terminal size too small. Current: {width}x{height}, minimum required: {min_width}x{min_height}")]
    TerminalTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },
}
