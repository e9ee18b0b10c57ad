//! Recording fakes of the platform collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use ttvc_core::*;

pub struct FakeConnection {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub plays: Mutex<Vec<(String, f32)>>,
    pub disconnects: AtomicUsize,
    pub fail_play: AtomicBool,
}

impl FakeConnection {
    pub fn play_count(&self) -> usize {
        self.plays.lock().unwrap().len()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoiceConnection for FakeConnection {
    async fn play(&self, request: &SpeechRequest, volume: f32) -> Result<()> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(TtvcError::voice("driver gone"));
        }
        self.plays
            .lock()
            .unwrap()
            .push((request.url().to_string(), volume));
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub fail: AtomicBool,
    pub acquired: Mutex<Vec<Arc<FakeConnection>>>,
    calls: AtomicUsize,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let gateway = Self::default();
        gateway.fail.store(true, Ordering::SeqCst);
        Arc::new(gateway)
    }

    /// Hold the next acquisition until the returned sender fires
    pub fn gate_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn connection(&self, index: usize) -> Arc<FakeConnection> {
        self.acquired.lock().unwrap()[index].clone()
    }

    pub fn connections(&self) -> Vec<Arc<FakeConnection>> {
        self.acquired.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceGateway for FakeGateway {
    async fn acquire(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceConnection>> {
        let gate = self.gates.lock().unwrap().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TtvcError::voice("gateway refused"));
        }
        let connection = Arc::new(FakeConnection {
            guild_id,
            channel_id,
            plays: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
            fail_play: AtomicBool::new(false),
        });
        self.acquired.lock().unwrap().push(connection.clone());
        Ok(connection as Arc<dyn VoiceConnection>)
    }
}

#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(ChannelId, String)>>,
    pub fail: AtomicBool,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(ChannelId, String)> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TtvcError::send("missing permissions"));
        }
        self.sent.lock().unwrap().push((channel_id, text.to_string()));
        Ok(())
    }
}

pub fn registry_with(gateway: Arc<FakeGateway>) -> Arc<GuildConnectionRegistry> {
    Arc::new(GuildConnectionRegistry::new(
        gateway,
        SpeechRequestBuilder::default(),
    ))
}

/// Let spawned tasks run until `gateway` has seen `calls` acquisitions
pub async fn wait_for_calls(gateway: &FakeGateway, calls: usize) {
    while gateway.call_count() < calls {
        tokio::task::yield_now().await;
    }
}
