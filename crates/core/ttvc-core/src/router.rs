//! Command router: one inbound message in, registry calls and replies out

use crate::command::{classify, Command};
use crate::error::RegistryError;
use crate::gateway::MessageSender;
use crate::registry::GuildConnectionRegistry;
use crate::types::{channel_mention, user_mention, GuildId, InboundMessage};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Routes classified messages to the registry and answers in the originating channel
pub struct CommandRouter {
    registry: Arc<GuildConnectionRegistry>,
    sender: Arc<dyn MessageSender>,
}

impl CommandRouter {
    /// Create a router over `registry`, replying through `sender`
    pub fn new(registry: Arc<GuildConnectionRegistry>, sender: Arc<dyn MessageSender>) -> Self {
        Self { registry, sender }
    }

    /// Registry this router drives
    pub fn registry(&self) -> &Arc<GuildConnectionRegistry> {
        &self.registry
    }

    /// Handle one inbound message.
    ///
    /// Registry failures become replies. Errors from sending a reply or from
    /// starting playback are returned for the event loop to log.
    pub async fn handle(&self, msg: &InboundMessage) -> Result<()> {
        if msg.is_self {
            return Ok(());
        }
        let Some(guild_id) = msg.guild_id else {
            return Ok(());
        };

        let command = classify(&msg.content);
        if !matches!(command, Command::Chat(_)) {
            info!(guild_id = %guild_id, user_id = %msg.author_id, command = ?command, "Command received");
        }

        match command {
            Command::Ping => self.reply(msg, "pong!").await,
            Command::Join => self.join(guild_id, msg).await,
            Command::Leave => self.leave(guild_id, msg).await,
            Command::HardLeave => self.hard_leave(guild_id, msg).await,
            Command::Unknown(token) => {
                self.reply(msg, &format!("no such command: `{}`", token))
                    .await
            }
            Command::Chat(text) => {
                let spoken = self
                    .registry
                    .dispatch_chat(guild_id, msg.channel_id, &text)
                    .await?;
                debug!(guild_id = %guild_id, channel_id = %msg.channel_id, spoken = %spoken, "Chat dispatched");
                Ok(())
            }
        }
    }

    async fn join(&self, guild_id: GuildId, msg: &InboundMessage) -> Result<()> {
        match self
            .registry
            .join(guild_id, msg.author_voice_channel, msg.channel_id)
            .await
        {
            Ok(joined) => {
                let text = format!(
                    "joined {}. Messages in {} will be read aloud.",
                    channel_mention(joined.voice_channel),
                    channel_mention(joined.text_channel)
                );
                self.reply(msg, &text).await
            }
            Err(RegistryError::Superseded) => Ok(()),
            Err(RegistryError::NotInVoice) => {
                self.reply(msg, "join a voice channel first, then send `>join>`.")
                    .await
            }
            Err(e) => self.reply(msg, &failure_text(&e)).await,
        }
    }

    async fn leave(&self, guild_id: GuildId, msg: &InboundMessage) -> Result<()> {
        match self.registry.leave(guild_id).await {
            Ok(()) => self.reply(msg, "disconnected.").await,
            Err(e) => self.reply(msg, &failure_text(&e)).await,
        }
    }

    async fn hard_leave(&self, guild_id: GuildId, msg: &InboundMessage) -> Result<()> {
        match self
            .registry
            .hard_leave(guild_id, msg.author_voice_channel)
            .await
        {
            Ok(voice_channel) => {
                let text = format!("forcibly disconnected from {}.", channel_mention(voice_channel));
                self.reply(msg, &text).await
            }
            Err(RegistryError::NotInVoice) => {
                self.reply(
                    msg,
                    "join the voice channel the bot is stuck in, then send `>h-leave>`.",
                )
                .await
            }
            Err(e) => self.reply(msg, &failure_text(&e)).await,
        }
    }

    async fn reply(&self, msg: &InboundMessage, text: &str) -> Result<()> {
        let body = format!("{} {}", user_mention(msg.author_id), text);
        self.sender.send(msg.channel_id, &body).await
    }
}

fn failure_text(err: &RegistryError) -> String {
    match err {
        RegistryError::NotInVoice => "you are not in a voice channel.".to_string(),
        RegistryError::ConnectFailed(_) => "could not connect to the voice channel.".to_string(),
        RegistryError::NotConnected => "already disconnected.".to_string(),
        RegistryError::Superseded => "a newer request took over.".to_string(),
    }
}
