//! Errors surfaced to callers of command execution and deletion.
//!
//! Traversal never produces these: a scan logs and skips anything it cannot
//! read. Only `execute` and `delete` report failures synchronously.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single command operation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The backing file or bundle no longer exists.
    #[error("command not found: {}", path.display())]
    NotFound {
        /// Location that vanished
        path: PathBuf,
    },

    /// No command is registered under the listener name an event carried.
    #[error("no command registered for listener {listener_name}")]
    UnknownListener {
        /// Listener name from the event
        listener_name: String,
    },

    /// The filesystem refused access to the backing location.
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// Location that could not be accessed
        path: PathBuf,
    },

    /// A definition file is unreadable or lacks the keys needed to run it.
    #[error("invalid command definition {}: {reason}", path.display())]
    Configuration {
        /// Definition file at fault
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// Delete was attempted on a command outside the user-writable root.
    #[error("command is not removable: {}", path.display())]
    NotRemovable {
        /// Backing file of the command
        path: PathBuf,
    },

    /// The external process could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was being started
        program: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure while touching the backing location.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Location being accessed
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Maps an I/O error on `path` to the matching error kind.
    #[must_use]
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Shorthand for a configuration error.
    pub fn configuration(path: &Path, reason: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Result alias for command operations.
pub type CommandResult<T> = std::result::Result<T, CommandError>;
