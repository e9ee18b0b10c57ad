use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serenity::async_trait as serenity_async_trait;
use serenity::cache::Settings as CacheSettings;
use serenity::gateway::ShardManager;
use serenity::http::Http;
use serenity::model::channel::Message as DiscordMessage;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::guild::Guild;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::voice::VoiceState;
use serenity::prelude::*;
use songbird::serenity::SerenityInit;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use ttvc_core::{
    BotConfig, CommandRouter, GuildConnectionRegistry, InboundMessage, MessageSender, Result,
    SpeechRequestBuilder, TtvcError,
};

pub mod voice;
pub use voice::{SongbirdConnection, SongbirdGateway, VoiceStateTracker};

#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub intents: GatewayIntents,
    /// Speech synthesis endpoint base URL
    pub tts_endpoint: String,
}

impl DiscordConfig {
    pub fn new(token: impl Into<String>, tts_endpoint: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: default_intents(),
            tts_endpoint: tts_endpoint.into(),
        }
    }
}

impl From<&BotConfig> for DiscordConfig {
    fn from(config: &BotConfig) -> Self {
        Self::new(config.token.clone(), config.tts_endpoint.clone())
    }
}

/// Guild text, message content and voice state events
pub fn default_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_VOICE_STATES
}

/// Replies through the Discord REST API
pub struct DiscordSender {
    http: Arc<Http>,
}

impl DiscordSender {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageSender for DiscordSender {
    async fn send(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId::new(channel_id)
            .say(&*self.http, text)
            .await
            .map_err(|e| TtvcError::send(format!("discord send error: {:?}", e)))?;
        Ok(())
    }
}

struct Handler {
    router: Arc<CommandRouter>,
    voice_states: Arc<VoiceStateTracker>,
}

impl Handler {
    /// Tracker first, serenity cache as fallback
    fn author_voice_channel(&self, ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<u64> {
        if let Some(cid) = self.voice_states.channel_of(guild_id.get(), user_id.get()) {
            return Some(cid);
        }

        let guild = ctx.cache.guild(guild_id)?;
        guild
            .voice_states
            .get(&user_id)
            .and_then(|vs| vs.channel_id)
            .map(|c| c.get())
    }
}

#[serenity_async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        let is_self = msg.author.id == ctx.cache.current_user().id;
        let author_voice_channel = match msg.guild_id {
            Some(guild_id) if !is_self => self.author_voice_channel(&ctx, guild_id, msg.author.id),
            _ => None,
        };

        let inbound = InboundMessage {
            guild_id: msg.guild_id.map(|g| g.get()),
            channel_id: msg.channel_id.get(),
            author_id: msg.author.id.get(),
            is_self,
            content: msg.content.clone(),
            author_voice_channel,
        };

        debug!(
            guild_id = ?inbound.guild_id,
            channel_id = %inbound.channel_id,
            author_id = %inbound.author_id,
            is_self = %inbound.is_self,
            "Discord message received"
        );

        if let Err(e) = self.router.handle(&inbound).await {
            error!(
                guild_id = ?inbound.guild_id,
                channel_id = %inbound.channel_id,
                error = %e,
                "Failed to handle message"
            );
        }
    }

    /// Populate initial voice states when guild data is received
    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        let guild_id = guild.id.get();
        self.voice_states.populate(
            guild_id,
            guild
                .voice_states
                .iter()
                .filter_map(|(user_id, vs)| vs.channel_id.map(|c| (user_id.get(), c.get()))),
        );
        info!(
            guild_id = %guild_id,
            guild_name = %guild.name,
            tracked_users = %self.voice_states.len(),
            "Voice states initialized from guild_create"
        );
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds_count = %ready.guilds.len(),
            "Discord ready"
        );
    }

    /// Track voice state changes - this is more reliable than serenity's cache
    async fn voice_state_update(&self, _ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        let Some(guild_id) = new.guild_id else {
            return;
        };
        let channel_id = new.channel_id.map(|c| c.get());
        debug!(
            guild_id = %guild_id.get(),
            user_id = %new.user_id.get(),
            channel_id = ?channel_id,
            "Voice state update"
        );
        self.voice_states
            .update(guild_id.get(), new.user_id.get(), channel_id);
    }
}

pub struct DiscordAdapterService {
    config: DiscordConfig,
    running: bool,
    registry: Option<Arc<GuildConnectionRegistry>>,
    shard_manager: Option<Arc<ShardManager>>,
    client_task: Option<JoinHandle<()>>,
}

impl DiscordAdapterService {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            running: false,
            registry: None,
            shard_manager: None,
            client_task: None,
        }
    }

    /// Build the client and start the gateway connection in the background
    pub async fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }

        let songbird = songbird::Songbird::serenity();
        let gateway = Arc::new(SongbirdGateway::new(songbird.clone(), HttpClient::new()));
        let registry = Arc::new(GuildConnectionRegistry::new(
            gateway,
            SpeechRequestBuilder::new(self.config.tts_endpoint.clone()),
        ));
        let sender = Arc::new(DiscordSender::new(Arc::new(Http::new(&self.config.token))));
        let router = Arc::new(CommandRouter::new(registry.clone(), sender));

        let handler = Handler {
            router,
            voice_states: Arc::new(VoiceStateTracker::new()),
        };

        // voice states must be cached for the fallback lookup
        let mut cache_settings = CacheSettings::default();
        cache_settings.cache_guilds = true;
        cache_settings.cache_channels = true;
        cache_settings.cache_users = true;

        let mut client = Client::builder(&self.config.token, self.config.intents)
            .event_handler(handler)
            .cache_settings(cache_settings)
            .register_songbird_with(songbird)
            .await
            .map_err(|e| TtvcError::platform(format!("Err creating Discord client: {:?}", e)))?;

        self.shard_manager = Some(client.shard_manager.clone());
        self.registry = Some(registry);
        self.client_task = Some(tokio::spawn(async move {
            info!("… Logging in to Discord");
            if let Err(why) = client.start().await {
                error!(error = %format!("{:?}", why), "Discord client error");
            }
        }));

        self.running = true;
        info!(tts_endpoint = %self.config.tts_endpoint, "Discord adapter started");
        Ok(())
    }

    /// Resolves when the gateway client stops on its own
    pub async fn closed(&mut self) {
        if let Some(task) = self.client_task.as_mut() {
            if let Err(e) = task.await {
                warn!(error = %e, "Discord client task ended abnormally");
            }
            self.client_task = None;
        }
    }

    /// Leave every voice channel and shut the gateway down
    pub async fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        if let Some(registry) = self.registry.take() {
            registry.disconnect_all().await;
        }
        if let Some(shard_manager) = self.shard_manager.take() {
            shard_manager.shutdown_all().await;
        }
        if let Some(task) = self.client_task.take() {
            let _ = task.await;
        }
        self.running = false;
        info!("Discord adapter stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
