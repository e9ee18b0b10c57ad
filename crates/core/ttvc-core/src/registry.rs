//! Per-guild voice connection state machine
//!
//! Each guild is either disconnected or connected to one voice channel with
//! exactly one bound text channel whose messages are spoken. The binding and
//! the connection handle live in a single `Option`, so one can never exist
//! without the other.
//!
//! ## Concurrent joins
//! Connection acquisition is slow and happens without the registry lock held.
//! Every `join` takes a per-guild ticket before connecting. Only a join that
//! succeeds or a `leave` advances the committed ticket, and a join commits its
//! handle only if its ticket is newer than the committed one. A join that fails
//! to connect never invalidates others.

use crate::command::is_command_like;
use crate::error::RegistryError;
use crate::gateway::{VoiceConnection, VoiceGateway};
use crate::sanitize::sanitize;
use crate::speech::SpeechRequestBuilder;
use crate::types::{ChannelId, GuildId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Playback volume for every speech request
pub const FULL_VOLUME: f32 = 1.0;

struct Binding {
    text_channel: ChannelId,
    voice_channel: ChannelId,
    connection: Arc<dyn VoiceConnection>,
}

#[derive(Default)]
struct GuildConnectionState {
    binding: Option<Binding>,
    next_ticket: u64,
    committed_ticket: u64,
    pending_joins: usize,
}

impl GuildConnectionState {
    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Make every join still in flight stale
    fn invalidate_pending(&mut self) {
        self.committed_ticket = self.issue_ticket();
    }
}

/// Channels of a freshly committed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joined {
    /// Voice channel now occupied
    pub voice_channel: ChannelId,
    /// Text channel now bound
    pub text_channel: ChannelId,
}

/// Owner of every guild's voice connection
pub struct GuildConnectionRegistry {
    gateway: Arc<dyn VoiceGateway>,
    speech: SpeechRequestBuilder,
    guilds: Mutex<HashMap<GuildId, GuildConnectionState>>,
}

impl GuildConnectionRegistry {
    /// Create an empty registry
    pub fn new(gateway: Arc<dyn VoiceGateway>, speech: SpeechRequestBuilder) -> Self {
        Self {
            gateway,
            speech,
            guilds: Mutex::new(HashMap::new()),
        }
    }

    /// Connect `guild_id` to the requester's voice channel and bind `text_channel`.
    ///
    /// Any previous connection of the guild is replaced; the voice driver moves
    /// the existing call, so the old handle is dropped rather than disconnected.
    pub async fn join(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
    ) -> Result<Joined, RegistryError> {
        let voice_channel = voice_channel.ok_or(RegistryError::NotInVoice)?;

        let ticket = {
            let mut guilds = self.guilds.lock().await;
            let state = guilds.entry(guild_id).or_default();
            state.pending_joins += 1;
            state.issue_ticket()
        };

        let acquired = self.gateway.acquire(guild_id, voice_channel).await;

        let mut guilds = self.guilds.lock().await;
        let state = guilds.entry(guild_id).or_default();
        state.pending_joins -= 1;

        let connection = match acquired {
            Ok(connection) => connection,
            Err(e) => {
                warn!(guild_id = %guild_id, channel_id = %voice_channel, error = %e, "Voice connection failed");
                return Err(RegistryError::ConnectFailed(e.to_string()));
            }
        };

        if ticket <= state.committed_ticket {
            let orphaned = state.binding.is_none() && state.pending_joins == 0;
            drop(guilds);
            info!(
                guild_id = %guild_id,
                channel_id = %voice_channel,
                orphaned = %orphaned,
                "Discarding stale voice connection"
            );
            if orphaned {
                if let Err(e) = connection.disconnect().await {
                    warn!(guild_id = %guild_id, error = %e, "Failed to release stale voice connection");
                }
            }
            return Err(RegistryError::Superseded);
        }

        state.committed_ticket = ticket;
        state.binding = Some(Binding {
            text_channel,
            voice_channel,
            connection,
        });
        info!(
            guild_id = %guild_id,
            voice_channel = %voice_channel,
            text_channel = %text_channel,
            "Bound voice connection"
        );

        Ok(Joined {
            voice_channel,
            text_channel,
        })
    }

    /// Disconnect `guild_id` and clear its binding
    pub async fn leave(&self, guild_id: GuildId) -> Result<(), RegistryError> {
        let binding = {
            let mut guilds = self.guilds.lock().await;
            let state = guilds
                .get_mut(&guild_id)
                .ok_or(RegistryError::NotConnected)?;
            let binding = state.binding.take().ok_or(RegistryError::NotConnected)?;
            state.invalidate_pending();
            binding
        };

        if let Err(e) = binding.connection.disconnect().await {
            warn!(guild_id = %guild_id, error = %e, "Voice disconnect reported an error");
        }
        info!(guild_id = %guild_id, voice_channel = %binding.voice_channel, "Left voice channel");
        Ok(())
    }

    /// Connect to the requester's voice channel and immediately disconnect.
    ///
    /// Clears a platform-side connection the registry has lost track of.
    /// Registry state is neither read nor written.
    pub async fn hard_leave(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
    ) -> Result<ChannelId, RegistryError> {
        let voice_channel = voice_channel.ok_or(RegistryError::NotInVoice)?;

        let connection = self
            .gateway
            .acquire(guild_id, voice_channel)
            .await
            .map_err(|e| RegistryError::ConnectFailed(e.to_string()))?;

        if let Err(e) = connection.disconnect().await {
            warn!(guild_id = %guild_id, error = %e, "Forced disconnect reported an error");
        }
        info!(guild_id = %guild_id, voice_channel = %voice_channel, "Forced voice disconnect");
        Ok(voice_channel)
    }

    /// Speak `text` if it came from the guild's bound text channel.
    ///
    /// Returns `Ok(true)` once playback has started, `Ok(false)` when the
    /// message is not eligible. Playback errors are returned to the caller.
    pub async fn dispatch_chat(
        &self,
        guild_id: GuildId,
        text_channel: ChannelId,
        text: &str,
    ) -> crate::Result<bool> {
        if is_command_like(text) {
            return Ok(false);
        }

        let connection = {
            let guilds = self.guilds.lock().await;
            match guilds.get(&guild_id).and_then(|s| s.binding.as_ref()) {
                Some(binding) if binding.text_channel == text_channel => {
                    binding.connection.clone()
                }
                _ => return Ok(false),
            }
        };

        let sanitized = sanitize(text);
        if sanitized.trim().is_empty() {
            debug!(guild_id = %guild_id, "Nothing left to speak after sanitizing");
            return Ok(false);
        }

        let request = self.speech.build(&sanitized);
        connection.play(&request, FULL_VOLUME).await?;
        debug!(guild_id = %guild_id, chars = %sanitized.chars().count(), "Speech playback started");
        Ok(true)
    }

    /// Text channel bound to `guild_id`, if connected
    pub async fn bound_text_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let guilds = self.guilds.lock().await;
        guilds
            .get(&guild_id)
            .and_then(|s| s.binding.as_ref())
            .map(|b| b.text_channel)
    }

    /// Voice channel occupied in `guild_id`, if connected
    pub async fn connected_voice_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let guilds = self.guilds.lock().await;
        guilds
            .get(&guild_id)
            .and_then(|s| s.binding.as_ref())
            .map(|b| b.voice_channel)
    }

    /// Whether `guild_id` has an active connection
    pub async fn is_connected(&self, guild_id: GuildId) -> bool {
        self.bound_text_channel(guild_id).await.is_some()
    }

    /// Disconnect every guild, used on shutdown
    pub async fn disconnect_all(&self) {
        let bindings: Vec<(GuildId, Binding)> = {
            let mut guilds = self.guilds.lock().await;
            guilds
                .iter_mut()
                .filter_map(|(guild_id, state)| {
                    let binding = state.binding.take()?;
                    state.invalidate_pending();
                    Some((*guild_id, binding))
                })
                .collect()
        };

        for (guild_id, binding) in bindings {
            if let Err(e) = binding.connection.disconnect().await {
                warn!(guild_id = %guild_id, error = %e, "Voice disconnect on shutdown failed");
            }
        }
    }
}
