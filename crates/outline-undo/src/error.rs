#![forbid(unsafe_code)]

use thiserror::Error;

/// Why the last command operation did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A command's run, undo, or redo returned false.
    #[error("{operation} of '{command}' did not apply")]
    PreconditionFailed {
        operation: &'static str,
        command: String,
    },

    /// A command failed while a group was open; the group was closed with
    /// the `completed` commands that had already succeeded.
    #[error("'{command}' failed in group '{group}' after {completed} completed command(s)")]
    GroupPartialFailure {
        group: String,
        command: String,
        completed: usize,
    },

    /// A command was submitted to a group scope that had already failed.
    #[error("'{command}' was not run because group '{group}' already failed")]
    GroupAborted { group: String, command: String },

    /// Undo or redo was requested while a group is open.
    #[error("cannot {operation} while a command group is open")]
    IllegalReentrancy { operation: &'static str },
}
