//! Error types for `Proslenkey`

use arrayvec::ArrayString;
use thiserror::Error;

/// Maximum length of error messages
pub const MAX_ERROR_LENGTH: usize = 256;

/// Custom result type for `Proslenkey` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fixed-size error message buffer
pub type Message = Box<ArrayString<MAX_ERROR_LENGTH>>;

/// Error types for `Proslenkey`
///
/// Message buffers are fixed-size (`MAX_ERROR_LENGTH`); longer messages are
/// truncated.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read or is invalid
    #[error("Error: Invalid configuration: {0}")]
    Config(Message),

    /// Query was rejected by validation
    #[error("Error: Invalid query: {0}")]
    Query(Message),

    /// Entry text contained no command
    #[error("Error: No command given")]
    EmptyCommand,

    /// Entry text could not be split into words
    #[error("Error: Could not parse command line: {0}")]
    Split(Message),

    /// Command could not be started
    #[error("Error: Failed to launch {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: Message,
        /// Underlying OS error
        source:  std::io::Error,
    },
}

/// Copy `msg` into a fixed-size buffer, truncating at a char boundary
fn message(msg: &str) -> Message {
    let mut buf = ArrayString::new();
    for c in msg.chars() {
        if buf.try_push(c).is_err() {
            break;
        }
    }
    Box::new(buf)
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: &str) -> Self {
        Self::Config(message(msg))
    }

    /// Create a new query error
    pub fn query(msg: &str) -> Self {
        Self::Query(message(msg))
    }

    /// Create a new command line split error
    pub fn split(msg: &str) -> Self {
        Self::Split(message(msg))
    }

    /// Create a new spawn error
    pub fn spawn(program: &str, source: std::io::Error) -> Self {
        Self::Spawn { program: message(program), source }
    }

    /// Get a user-friendly error message with action items
    #[must_use]
    pub fn user_message(&self) -> ArrayString<MAX_ERROR_LENGTH> {
        let mut msg = ArrayString::new();
        let tip = match self {
            Self::Io(_) => "Check file permissions and try again",
            Self::Config(_) => "Fix or remove the configuration file",
            Self::Query(_) => "Try a shorter query",
            Self::EmptyCommand => "Type a command before pressing Enter",
            Self::Split(_) => "Check for unbalanced quotes",
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                "Make sure the command is installed and on your PATH"
            },
            Self::Spawn { .. } => "Check that the command is executable",
        };
        for part in [self.to_string().as_str(), "\nTip: ", tip] {
            for c in part.chars() {
                if msg.try_push(c).is_err() {
                    return msg;
                }
            }
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_message_truncation() {
        let long = "é".repeat(MAX_ERROR_LENGTH);
        let Error::Config(msg) = Error::config(&long) else {
            panic!("Expected config error");
        };
        assert!(msg.len() <= MAX_ERROR_LENGTH);
        assert!(msg.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_user_message_tips() {
        let not_found = Error::spawn("nope", io::Error::from(io::ErrorKind::NotFound));
        let msg = not_found.user_message();
        assert!(msg.starts_with("Error: Failed to launch nope"));
        assert!(msg.contains("PATH"));

        let empty = Error::EmptyCommand.user_message();
        assert!(empty.contains("Tip: Type a command"));
    }
}
