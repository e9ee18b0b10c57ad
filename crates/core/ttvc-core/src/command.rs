//! `>token>` command protocol

/// Marker wrapping a command token on both sides
pub const COMMAND_MARKER: char = '>';

/// A classified inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `>ping>`
    Ping,
    /// `>join>`
    Join,
    /// `>leave>`
    Leave,
    /// `>h-leave>`
    HardLeave,
    /// Any other wrapped token
    Unknown(String),
    /// Everything that is not a wrapped token, verbatim
    Chat(String),
}

impl Command {
    /// Map a trimmed command token to its variant
    pub fn from_token(token: &str) -> Self {
        match token {
            "ping" => Command::Ping,
            "join" => Command::Join,
            "leave" => Command::Leave,
            "h-leave" => Command::HardLeave,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Classify raw message text.
///
/// Only a message that is exactly `>token>` is a command. Partial matches such
/// as `>ping> extra` come back as [`Command::Chat`]; see [`is_command_like`].
pub fn classify(content: &str) -> Command {
    let token = content
        .strip_prefix(COMMAND_MARKER)
        .and_then(|rest| rest.strip_suffix(COMMAND_MARKER))
        .filter(|inner| !inner.contains(COMMAND_MARKER))
        .map(str::trim)
        .filter(|inner| !inner.is_empty());

    match token {
        Some(token) => Command::from_token(token),
        None => Command::Chat(content.to_string()),
    }
}

/// Whether text starts with the command marker and must never be spoken
pub fn is_command_like(content: &str) -> bool {
    content.starts_with(COMMAND_MARKER)
}
