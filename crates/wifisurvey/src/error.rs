//! Error types for wifisurvey.
//!
//! This module defines the crate-level error type. Form validation failures
//! are a [`ValidationError`] of their own and only reach this type when a
//! caller chooses to propagate them.

use std::path::PathBuf;
use thiserror::Error;

use crate::form::ValidationError;

/// The main error type for wifisurvey operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Form Errors ===
    /// A submission was missing required fields.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// The session does not know this command.
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    /// A command argument could not be understood.
    #[error("invalid argument for '{command}': {message}")]
    InvalidArgument {
        /// The command being parsed.
        command: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// No room matches the given id or prefix.
    #[error("no room matches '{0}'")]
    RoomNotFound(String),

    /// More than one room matches the given prefix.
    #[error("'{prefix}' matches {count} rooms; use more characters")]
    AmbiguousRoom {
        /// The prefix that was given.
        prefix: String,
        /// How many rooms it matched.
        count: usize,
    },

    // === I/O Errors ===
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a session script.
    #[error("failed to read script {path}: {source}")]
    ScriptRead {
        /// Path of the script.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for wifisurvey operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(command: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            command,
            message: message.into(),
        }
    }

    /// Check if this error is a rejected form submission.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from a malformed session command.
    ///
    /// Such errors leave the session usable.
    #[must_use]
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UnknownCommand(_)
                | Self::InvalidArgument { .. }
                | Self::RoomNotFound(_)
                | Self::AmbiguousRoom { .. }
        )
    }
}
