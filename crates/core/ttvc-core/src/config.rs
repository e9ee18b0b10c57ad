//! Configuration management and environment variable loading

use crate::speech::DEFAULT_TTS_ENDPOINT;
use crate::{Result, TtvcError};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable holding the bot credential
pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
/// Environment variable overriding the speech endpoint
pub const TTS_ENDPOINT_VAR: &str = "TTVC_TTS_ENDPOINT";
/// Environment variable selecting the log level when `RUST_LOG` is unset
pub const LOG_LEVEL_VAR: &str = "TTVC_LOG_LEVEL";

/// Load environment variables from a .env file
///
/// Returns the file that was loaded, `None` when there is no .env file and the
/// process environment is used as is. Runs before logging is set up, so the
/// caller reports the outcome.
pub fn load_env() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::LineParse(line, pos)) => Err(TtvcError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => Ok(None),
        Err(e) => Err(TtvcError::config(format!("Failed to load .env file: {}", e))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    dotenvy::from_path(path.as_ref()).map_err(|e| {
        TtvcError::config(format!(
            "Failed to load {} environment file: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    Ok(path.as_ref().to_path_buf())
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Runtime configuration for the bot
#[derive(Clone)]
pub struct BotConfig {
    /// Discord bot token
    pub token: String,
    /// Base URL of the speech synthesis endpoint
    pub tts_endpoint: String,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("tts_endpoint", &self.tts_endpoint)
            .finish()
    }
}

impl BotConfig {
    /// Build the config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    ///
    /// A missing or blank token is fatal: the bot cannot log in without it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TtvcError::config(format!(
                    "Required environment variable '{}' is not set. \
                     Check your .env file or system environment.",
                    TOKEN_VAR
                ))
            })?;

        let tts_endpoint = lookup(TTS_ENDPOINT_VAR)
            .map(|e| e.trim().trim_end_matches('?').to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_TTS_ENDPOINT.to_string());

        Ok(Self {
            token,
            tts_endpoint,
        })
    }

    /// Override the speech endpoint
    pub fn with_tts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.tts_endpoint = endpoint.into();
        self
    }
}
