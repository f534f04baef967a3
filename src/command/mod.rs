mod commands;
mod history;

use crate::document::DocumentError;
use thiserror::Error;

pub use commands::Command;
pub use history::{Change, CommandHistory, HistoryEntry};

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command would break a document invariant
    #[error("Command rejected: {0}")]
    Rejected(#[from] DocumentError),
}
