//! ttvc core
//!
//! Bridges a guild's text channel and voice channel: `>join>` connects the bot
//! to the requester's voice channel and binds the text channel it was sent
//! from; every later message in that channel is spoken through a remote
//! text-to-speech endpoint until `>leave>`.
//!
//! - [`command`]: the `>token>` classifier
//! - [`sanitize`]: URL and markup stripping
//! - [`speech`]: synthesis request descriptors
//! - [`registry`]: per-guild connection state machine
//! - [`router`]: command dispatch and replies
//! - [`gateway`]: traits the platform adaptor implements
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ttvc_core::*;
//!
//! async fn wire(gateway: Arc<dyn VoiceGateway>, sender: Arc<dyn MessageSender>) -> Result<()> {
//!     let registry = Arc::new(GuildConnectionRegistry::new(gateway, SpeechRequestBuilder::default()));
//!     let router = CommandRouter::new(registry, sender);
//!     router.handle(&InboundMessage::new(1, 2, 3, ">ping>")).await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod router;
pub mod sanitize;
pub mod speech;
pub mod types;
pub mod utils;

pub use command::{classify, is_command_like, Command, COMMAND_MARKER};
pub use config::{load_env, load_env_from_path, BotConfig};
pub use error::{RegistryError, Result, TtvcError};
pub use gateway::{MessageSender, VoiceConnection, VoiceGateway};
pub use registry::{GuildConnectionRegistry, Joined, FULL_VOLUME};
pub use router::CommandRouter;
pub use sanitize::{sanitize, URL_PLACEHOLDER};
pub use speech::{SpeechRequest, SpeechRequestBuilder, DEFAULT_TTS_ENDPOINT};
pub use types::{ChannelId, GuildId, InboundMessage, UserId};
pub use utils::init_logging;
