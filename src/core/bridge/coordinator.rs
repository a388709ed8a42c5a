//! Media bridge: owns the session registry and builds per-call AI clients.

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::envelope::{TelephonyOutbound, TelephonyRoute};
use super::error::BridgeResult;
use super::registry::{CallSession, SessionRegistry};
use crate::core::codec::{AudioFrame, FrameDirection};
use crate::core::realtime::{
    AudioDone, CloseReason, RealtimeAudioData, RealtimeCallbacks, RealtimeFactory, SpeechStarted,
};

/// Bridges telephony media streams to realtime AI sessions.
///
/// One instance is built at startup and shared through application state.
/// It is the only writer of its registry.
pub struct MediaBridge {
    registry: SessionRegistry,
    factory: Arc<dyn RealtimeFactory>,
}

impl MediaBridge {
    /// Create a bridge whose per-call clients come from `factory`.
    pub fn new(factory: Arc<dyn RealtimeFactory>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            factory,
        }
    }

    /// Number of registered call sessions.
    pub fn active_connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Registered call ids.
    pub fn active_call_ids(&self) -> Vec<String> {
        self.registry.call_ids()
    }

    /// Session registered for `call_id`, if any.
    pub fn session(&self, call_id: &str) -> Option<Arc<CallSession>> {
        self.registry.get(call_id)
    }

    /// Ask the AI to stop its current response on `call_id`.
    ///
    /// Returns `false` when no session is registered for the call.
    pub async fn interrupt_call(&self, call_id: &str) -> bool {
        let Some(session) = self.registry.get(call_id) else {
            debug!(call_id = %call_id, "Interrupt requested for unknown call");
            return false;
        };

        if let Err(e) = session.client().interrupt().await {
            warn!(call_id = %call_id, "Failed to interrupt realtime response: {}", e);
        }
        info!(call_id = %call_id, "Interrupted realtime response");
        true
    }

    /// Tear down the session for `call_id`. Idempotent.
    pub async fn cleanup(&self, call_id: &str) {
        match self.registry.remove(call_id) {
            Some(session) => {
                session.close().await;
                info!(
                    call_id = %call_id,
                    age_ms = session.age().as_millis() as u64,
                    active_sessions = self.registry.len(),
                    "Call session cleaned up"
                );
            }
            None => debug!(call_id = %call_id, "No session to clean up"),
        }
    }

    /// Build an unconnected session for `call_id` whose AI audio is written
    /// to `telephony`.
    pub(crate) fn create_session(
        self: &Arc<Self>,
        call_id: &str,
        telephony: mpsc::Sender<TelephonyRoute>,
    ) -> BridgeResult<Arc<CallSession>> {
        let token = Uuid::new_v4();
        let callbacks = self.callbacks_for(call_id, token, telephony);
        let client = self.factory.create(call_id, callbacks)?;
        Ok(Arc::new(CallSession::new(call_id, token, client)))
    }

    /// Register a connected session, replacing and closing any session that
    /// already holds the call id.
    pub(crate) async fn register(&self, session: Arc<CallSession>) {
        let call_id = session.call_id().to_string();

        if let Some(previous) = self.registry.insert(session.clone())
            && previous.token() != session.token()
        {
            warn!(call_id = %call_id, "Duplicate start, replacing existing session");
            previous.close().await;
        }

        // The AI side may have closed before the entry existed
        if !session.client().is_open() {
            debug!(call_id = %call_id, "Session closed before registration completed");
            self.release(&session).await;
            return;
        }

        info!(
            call_id = %call_id,
            active_sessions = self.registry.len(),
            "Call session registered"
        );
    }

    /// Close `session` and drop its registry entry if it still owns it.
    pub(crate) async fn release(&self, session: &CallSession) {
        self.release_token(session.call_id(), session.token()).await;
        session.close().await;
    }

    async fn release_token(&self, call_id: &str, token: Uuid) {
        if let Some(session) = self.registry.remove_if_token(call_id, token) {
            session.close().await;
            info!(
                call_id = %call_id,
                active_sessions = self.registry.len(),
                "Call session released"
            );
        }
    }

    fn callbacks_for(
        self: &Arc<Self>,
        call_id: &str,
        token: Uuid,
        telephony: mpsc::Sender<TelephonyRoute>,
    ) -> RealtimeCallbacks {
        let audio_call_id = call_id.to_string();
        let done_call_id = call_id.to_string();
        let interrupt_call_id = call_id.to_string();
        let closed_call_id = call_id.to_string();
        let bridge: Weak<MediaBridge> = Arc::downgrade(self);

        RealtimeCallbacks::default()
            .with_audio(Arc::new(move |audio: RealtimeAudioData| {
                let tx = telephony.clone();
                let call_id = audio_call_id.clone();
                Box::pin(async move {
                    if audio.data.is_empty() {
                        trace!(call_id = %call_id, "Empty AI audio, nothing to relay");
                        return;
                    }
                    let frame =
                        AudioFrame::linear16(audio.data, FrameDirection::Outbound).transcode();
                    trace!(call_id = %call_id, duration_ms = frame.duration_ms(), "Relaying AI audio");
                    let envelope = TelephonyOutbound::media(&frame.data);
                    if tx.send(TelephonyRoute::Outgoing(envelope)).await.is_err() {
                        debug!(call_id = %call_id, "Telephony socket gone, dropping AI audio");
                    }
                })
            }))
            .with_audio_done(Arc::new(move |done: AudioDone| {
                let call_id = done_call_id.clone();
                Box::pin(async move {
                    debug!(call_id = %call_id, item_id = ?done.item_id, "AI finished speaking");
                })
            }))
            .with_interrupt(Arc::new(move |speech: SpeechStarted| {
                let call_id = interrupt_call_id.clone();
                Box::pin(async move {
                    info!(
                        call_id = %call_id,
                        audio_start_ms = speech.audio_start_ms,
                        "Caller started speaking"
                    );
                })
            }))
            .with_closed(Arc::new(move |reason: CloseReason| {
                let bridge = bridge.clone();
                let call_id = closed_call_id.clone();
                Box::pin(async move {
                    debug!(call_id = %call_id, reason = %reason, "Realtime connection closed");
                    if let Some(bridge) = bridge.upgrade() {
                        bridge.release_token(&call_id, token).await;
                    }
                })
            }))
    }
}

impl std::fmt::Debug for MediaBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBridge")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
