//! Error types for ttvc

use thiserror::Error;

/// Main error type for ttvc operations
#[derive(Debug, Error)]
pub enum TtvcError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Voice connection or playback error
    #[error("Voice error: {0}")]
    Voice(String),

    /// Outbound message delivery error
    #[error("Send error: {0}")]
    Send(String),

    /// Chat platform (gateway/client) error
    #[error("Platform error: {0}")]
    Platform(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using TtvcError
pub type Result<T> = std::result::Result<T, TtvcError>;

impl TtvcError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        TtvcError::Config(msg.into())
    }

    /// Create a voice error
    pub fn voice(msg: impl Into<String>) -> Self {
        TtvcError::Voice(msg.into())
    }

    /// Create a send error
    pub fn send(msg: impl Into<String>) -> Self {
        TtvcError::Send(msg.into())
    }

    /// Create a platform error
    pub fn platform(msg: impl Into<String>) -> Self {
        TtvcError::Platform(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        TtvcError::Other(msg.into())
    }
}

/// Failures of the per-guild connection state machine.
///
/// These are recovered by the command router and turned into chat replies;
/// they never escape to the event loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The requesting user is not in any voice channel
    #[error("requester is not in a voice channel")]
    NotInVoice,

    /// The voice acquisition primitive rejected the connection
    #[error("failed to connect to voice channel: {0}")]
    ConnectFailed(String),

    /// The guild has no active voice connection
    #[error("guild has no active voice connection")]
    NotConnected,

    /// A newer join or leave for the same guild completed first
    #[error("connection attempt superseded by a newer request")]
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TtvcError::config("DISCORD_TOKEN missing");
        assert_eq!(err.to_string(), "Configuration error: DISCORD_TOKEN missing");

        let err = TtvcError::voice("driver gone");
        assert_eq!(err.to_string(), "Voice error: driver gone");
    }

    #[test]
    fn test_registry_error_display() {
        assert_eq!(
            RegistryError::ConnectFailed("timed out".into()).to_string(),
            "failed to connect to voice channel: timed out"
        );
        assert_eq!(RegistryError::NotConnected, RegistryError::NotConnected);
    }
}
