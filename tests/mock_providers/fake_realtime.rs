//! In-process realtime client fake
//!
//! Records what the bridge sends, exposes the callbacks the bridge bound, and
//! can simulate a slow handshake, a missing API key or a remote close.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use waav_call_bridge::core::realtime::{
    BaseRealtime, BoxedRealtime, CloseReason, ConnectionState, RealtimeAudioData,
    RealtimeCallbacks, RealtimeError, RealtimeFactory, RealtimeResult,
};

/// How fake clients behave on `connect()`
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeBehavior {
    /// Handshake duration
    pub connect_delay: Duration,
    /// Fail as if no API key were configured
    pub missing_api_key: bool,
}

/// Realtime client that never touches the network
pub struct FakeRealtime {
    pub call_id: String,
    behavior: FakeBehavior,
    callbacks: RealtimeCallbacks,
    state: RwLock<ConnectionState>,
    pub audio: Mutex<Vec<Bytes>>,
    pub interrupts: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl FakeRealtime {
    pub fn new(call_id: &str, behavior: FakeBehavior, callbacks: RealtimeCallbacks) -> Self {
        Self {
            call_id: call_id.to_string(),
            behavior,
            callbacks,
            state: RwLock::new(ConnectionState::Idle),
            audio: Mutex::new(Vec::new()),
            interrupts: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Deliver AI audio through the bound audio callback.
    pub async fn emit_audio(&self, data: Bytes) {
        if let Some(cb) = self.callbacks.on_audio.as_ref() {
            cb(RealtimeAudioData {
                data,
                sample_rate: 24000,
                item_id: Some("item_1".to_string()),
                response_id: Some("resp_1".to_string()),
            })
            .await;
        }
    }

    /// Simulate the service closing the connection.
    pub async fn close_from_remote(&self) {
        *self.state.write() = ConnectionState::Closed;
        if let Some(cb) = self.callbacks.on_closed.as_ref() {
            cb(CloseReason::Remote(Some("server going away".to_string()))).await;
        }
    }

    pub fn audio_frames(&self) -> usize {
        self.audio.lock().len()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseRealtime for FakeRealtime {
    async fn connect(&self) -> RealtimeResult<()> {
        {
            let mut state = self.state.write();
            if *state == ConnectionState::Closed {
                return Err(RealtimeError::Closed);
            }
            *state = ConnectionState::Connecting;
        }

        if !self.behavior.connect_delay.is_zero() {
            tokio::time::sleep(self.behavior.connect_delay).await;
        }

        let mut state = self.state.write();
        if self.behavior.missing_api_key {
            *state = ConnectionState::Closed;
            return Err(RealtimeError::InvalidConfiguration(
                "OpenAI API key is not configured".to_string(),
            ));
        }
        if *state != ConnectionState::Connecting {
            return Err(RealtimeError::Closed);
        }
        *state = ConnectionState::Open;
        Ok(())
    }

    async fn send_audio(&self, audio_data: Bytes) -> RealtimeResult<()> {
        if self.is_open() {
            self.audio.lock().push(audio_data);
        }
        Ok(())
    }

    async fn interrupt(&self) -> RealtimeResult<()> {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> RealtimeResult<()> {
        *self.state.write() = ConnectionState::Closed;
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }
}

/// Factory that hands out [`FakeRealtime`] clients and keeps them for inspection
#[derive(Default)]
pub struct FakeFactory {
    behavior: Mutex<FakeBehavior>,
    pub created: Mutex<Vec<Arc<FakeRealtime>>>,
}

impl FakeFactory {
    pub fn new(behavior: FakeBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            created: Mutex::new(Vec::new()),
        })
    }

    /// Behavior for clients created from now on.
    pub fn set_behavior(&self, behavior: FakeBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    /// The n-th client created.
    pub fn client(&self, index: usize) -> Arc<FakeRealtime> {
        self.created.lock()[index].clone()
    }

    /// The most recently created client.
    pub fn last(&self) -> Arc<FakeRealtime> {
        self.created
            .lock()
            .last()
            .cloned()
            .expect("no client created")
    }
}

impl RealtimeFactory for FakeFactory {
    fn create(&self, call_id: &str, callbacks: RealtimeCallbacks) -> RealtimeResult<BoxedRealtime> {
        let client = Arc::new(FakeRealtime::new(call_id, *self.behavior.lock(), callbacks));
        self.created.lock().push(client.clone());
        let client: BoxedRealtime = client;
        Ok(client)
    }
}
