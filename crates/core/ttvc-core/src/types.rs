//! Identifiers and the inbound event shape shared by the core and its adaptors

/// Guild (server) identifier
pub type GuildId = u64;
/// Text or voice channel identifier
pub type ChannelId = u64;
/// User identifier
pub type UserId = u64;

/// A chat message as delivered by the platform adaptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Guild the message was posted in; `None` for direct messages
    pub guild_id: Option<GuildId>,
    /// Text channel the message was posted in
    pub channel_id: ChannelId,
    /// Author of the message
    pub author_id: UserId,
    /// Whether the bot itself wrote the message
    pub is_self: bool,
    /// Raw message body
    pub content: String,
    /// Voice channel the author occupied when the message arrived
    pub author_voice_channel: Option<ChannelId>,
}

impl InboundMessage {
    /// Guild message from another user, not in voice
    pub fn new(
        guild_id: GuildId,
        channel_id: ChannelId,
        author_id: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: Some(guild_id),
            channel_id,
            author_id,
            is_self: false,
            content: content.into(),
            author_voice_channel: None,
        }
    }

    /// Set the author's current voice channel
    pub fn in_voice(mut self, voice_channel: ChannelId) -> Self {
        self.author_voice_channel = Some(voice_channel);
        self
    }
}

/// Platform markup mentioning a user
pub fn user_mention(user_id: UserId) -> String {
    format!("<@!{}>", user_id)
}

/// Platform markup linking a channel
pub fn channel_mention(channel_id: ChannelId) -> String {
    format!("<#{}>", channel_id)
}
