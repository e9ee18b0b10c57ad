//! Collaborator seams between the core and the chat platform
//!
//! The registry and router only talk to the platform through these traits;
//! the Discord adaptor provides the songbird/serenity implementations.

use crate::speech::SpeechRequest;
use crate::types::{ChannelId, GuildId};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Live presence of the bot in a voice channel
#[async_trait]
pub trait VoiceConnection: Send + Sync {
    /// Start playing `request` at `volume` (1.0 = full).
    ///
    /// Returns once playback has been handed to the voice driver, not when it ends.
    async fn play(&self, request: &SpeechRequest, volume: f32) -> Result<()>;

    /// Leave the voice channel
    async fn disconnect(&self) -> Result<()>;
}

/// Voice acquisition primitive
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Connect to `channel_id` in `guild_id`
    async fn acquire(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceConnection>>;
}

/// Outbound text primitive
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Post `text` to a text channel
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<()>;
}
