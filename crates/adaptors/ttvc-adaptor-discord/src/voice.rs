//! Discord Voice Support
//!
//! Songbird-backed implementations of the core voice traits, plus the
//! voice-state tracker used to find which voice channel a message author is in.
//!
//! Songbird keeps one `Call` per guild. Joining a second channel in the same
//! guild moves that call, which is why the registry can drop a superseded
//! handle without disconnecting it.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client as HttpClient;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::{HttpRequest, Input};
use songbird::{
    Call, Event, EventContext, EventHandler as SongbirdEventHandler, Songbird, TrackEvent,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use ttvc_core::{SpeechRequest, TtvcError, VoiceConnection, VoiceGateway};

/// Voice connection acquisition through songbird
pub struct SongbirdGateway {
    songbird: Arc<Songbird>,
    http: HttpClient,
}

impl SongbirdGateway {
    /// Wrap a songbird client; `http` fetches the synthesized audio
    pub fn new(songbird: Arc<Songbird>, http: HttpClient) -> Self {
        Self { songbird, http }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn acquire(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> ttvc_core::Result<Arc<dyn VoiceConnection>> {
        let call = self
            .songbird
            .join(GuildId::new(guild_id), ChannelId::new(channel_id))
            .await
            .map_err(|e| TtvcError::voice(format!("failed to join voice channel: {}", e)))?;

        info!(guild_id = %guild_id, channel_id = %channel_id, "Joined voice channel");

        let connection: Arc<dyn VoiceConnection> = Arc::new(SongbirdConnection {
            songbird: self.songbird.clone(),
            guild_id,
            call,
            http: self.http.clone(),
        });
        Ok(connection)
    }
}

/// Handle on a guild's songbird call
pub struct SongbirdConnection {
    songbird: Arc<Songbird>,
    guild_id: u64,
    call: Arc<Mutex<Call>>,
    http: HttpClient,
}

#[async_trait]
impl VoiceConnection for SongbirdConnection {
    async fn play(&self, request: &SpeechRequest, volume: f32) -> ttvc_core::Result<()> {
        let input: Input = HttpRequest::new(self.http.clone(), request.url().to_string()).into();

        // the audio is fetched and decoded by the driver; this only queues the track
        let mut call = self.call.lock().await;
        let track = call.play_input(input);
        track
            .set_volume(volume)
            .map_err(|e| TtvcError::voice(format!("failed to set volume: {}", e)))?;
        track
            .add_event(
                Event::Track(TrackEvent::Error),
                TrackErrorNotifier {
                    guild_id: self.guild_id,
                },
            )
            .map_err(|e| TtvcError::voice(format!("failed to watch track errors: {}", e)))?;

        debug!(guild_id = %self.guild_id, "Started playing audio in voice channel");
        Ok(())
    }

    async fn disconnect(&self) -> ttvc_core::Result<()> {
        self.songbird
            .remove(GuildId::new(self.guild_id))
            .await
            .map_err(|e| TtvcError::voice(format!("failed to leave voice channel: {}", e)))?;

        info!(guild_id = %self.guild_id, "Left voice channel");
        Ok(())
    }
}

/// Logs speech tracks the driver could not fetch or decode
struct TrackErrorNotifier {
    guild_id: u64,
}

#[async_trait]
impl SongbirdEventHandler for TrackErrorNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            for (state, handle) in tracks.iter() {
                warn!(
                    guild_id = %self.guild_id,
                    track = %handle.uuid(),
                    state = ?state.playing,
                    "Speech playback failed"
                );
            }
        }
        None
    }
}

/// Custom voice state tracker - maps (guild_id, user_id) -> channel_id
///
/// Fed from `guild_create` and `voice_state_update`; more reliable than the
/// serenity cache right after startup.
#[derive(Default)]
pub struct VoiceStateTracker {
    states: RwLock<HashMap<(u64, u64), u64>>,
}

impl VoiceStateTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user's current voice channel, `None` when they left voice
    pub fn update(&self, guild_id: u64, user_id: u64, channel_id: Option<u64>) {
        let mut states = self.states.write();
        match channel_id {
            Some(cid) => {
                states.insert((guild_id, user_id), cid);
            }
            None => {
                states.remove(&(guild_id, user_id));
            }
        }
    }

    /// Replace everything known about one guild
    pub fn populate<I>(&self, guild_id: u64, voice_states: I)
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut states = self.states.write();
        states.retain(|(gid, _), _| *gid != guild_id);
        for (user_id, channel_id) in voice_states {
            states.insert((guild_id, user_id), channel_id);
        }
    }

    /// Voice channel `user_id` is in, if tracked
    pub fn channel_of(&self, guild_id: u64, user_id: u64) -> Option<u64> {
        self.states.read().get(&(guild_id, user_id)).copied()
    }

    /// Number of tracked users across all guilds
    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_track_error_notifier_stays_registered() {
        let notifier = TrackErrorNotifier { guild_id: 1 };
        assert!(notifier.act(&EventContext::Track(&[])).await.is_none());
    }

    #[test]
    fn test_tracker_update_and_leave() {
        let tracker = VoiceStateTracker::new();
        tracker.update(1, 10, Some(100));
        assert_eq!(tracker.channel_of(1, 10), Some(100));

        tracker.update(1, 10, Some(101));
        assert_eq!(tracker.channel_of(1, 10), Some(101));

        tracker.update(1, 10, None);
        assert_eq!(tracker.channel_of(1, 10), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_tracker_is_per_guild() {
        let tracker = VoiceStateTracker::new();
        tracker.update(1, 10, Some(100));
        assert_eq!(tracker.channel_of(2, 10), None);
    }

    #[test]
    fn test_populate_replaces_guild_snapshot() {
        let tracker = VoiceStateTracker::new();
        tracker.update(1, 10, Some(100));
        tracker.update(2, 10, Some(200));

        tracker.populate(1, vec![(11, 101), (12, 102)]);

        assert_eq!(tracker.channel_of(1, 10), None);
        assert_eq!(tracker.channel_of(1, 11), Some(101));
        assert_eq!(tracker.channel_of(2, 10), Some(200));
        assert_eq!(tracker.len(), 3);
    }
}
