//! OpenAI Realtime API client implementation.
//!
//! This module provides the OpenAI Realtime client that implements the `BaseRealtime` trait
//! using OpenAI's WebSocket-based Realtime API.
//!
//! # API Reference
//!
//! - Endpoint: `wss://api.openai.com/v1/realtime?model=<model>`
//! - Protocol: WebSocket with JSON events
//! - Audio: PCM 16-bit, 24kHz, mono, little-endian, base64 encoded
//!
//! # Example
//!
//! ```rust,ignore
//! use waav_call_bridge::core::realtime::{BaseRealtime, OpenAIRealtime, RealtimeCallbacks, RealtimeConfig};
//! use std::sync::Arc;
//!
//! let callbacks = RealtimeCallbacks::default().with_audio(Arc::new(|audio| {
//!     Box::pin(async move {
//!         // Relay audio.data
//!     })
//! }));
//!
//! let realtime = OpenAIRealtime::new("call-1", config, callbacks);
//! realtime.connect().await?;
//! realtime.send_audio(audio_bytes).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tracing::{debug, error, info, trace, warn};

use super::config::OPENAI_REALTIME_SAMPLE_RATE;
use super::messages::{ClientEvent, ServerEvent, SessionConfig};
use crate::core::codec::AudioEncoding;
use crate::core::realtime::base::{
    AudioDone, BaseRealtime, BoxedRealtime, CloseReason, ConnectionState, RealtimeAudioData,
    RealtimeCallbacks, RealtimeConfig, RealtimeError, RealtimeFactory, RealtimeResult,
    SpeechStarted,
};

/// Channel capacity for WebSocket message sending.
const WS_CHANNEL_CAPACITY: usize = 256;

/// How long `disconnect()` waits for the close frame to be flushed.
const CLOSE_GRACE_PERIOD: Duration = Duration::from_secs(2);

// =============================================================================
// OpenAI Realtime Client
// =============================================================================

/// OpenAI Realtime API client implementation.
///
/// One instance serves one call. Mutable state lives behind `Arc`s shared with
/// the spawned connection task, which owns the socket: outbound events reach it
/// through an mpsc channel, so writes are serialized in send order.
pub struct OpenAIRealtime {
    /// Call this client serves, for log context
    call_id: String,
    /// Configuration
    config: RealtimeConfig,
    /// Callbacks, bound at construction
    callbacks: RealtimeCallbacks,
    /// Connection state
    state: Arc<RwLock<ConnectionState>>,
    /// Session ID reported by the service
    session_id: Arc<RwLock<Option<String>>>,
    /// WebSocket sender channel; `None` unless open
    ws_sender: Arc<Mutex<Option<mpsc::Sender<ClientEvent>>>>,
    /// Connection task handle
    connection_handle: Mutex<Option<JoinHandle<()>>>,
}

impl OpenAIRealtime {
    /// Create an unconnected client.
    pub fn new(
        call_id: impl Into<String>,
        config: RealtimeConfig,
        callbacks: RealtimeCallbacks,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            config,
            callbacks,
            state: Arc::new(RwLock::new(ConnectionState::Idle)),
            session_id: Arc::new(RwLock::new(None)),
            ws_sender: Arc::new(Mutex::new(None)),
            connection_handle: Mutex::new(None),
        }
    }

    /// Get the session ID if the service has reported one.
    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().clone()
    }

    /// Build the WebSocket URL with model parameter.
    fn build_ws_url(&self) -> String {
        format!("{}?model={}", self.config.url, self.config.model)
    }

    /// Build the initial session configuration.
    fn build_session_config(&self) -> SessionConfig {
        SessionConfig::for_call(&self.config, AudioEncoding::Linear16.as_str())
    }

    /// Build the upgrade request with auth headers.
    fn build_request(&self) -> RealtimeResult<http::Request<()>> {
        let mut request = self
            .build_ws_url()
            .into_client_request()
            .map_err(|e| RealtimeError::InvalidConfiguration(format!("Invalid URL: {e}")))?;

        let headers = request.headers_mut();
        let auth = format!("Bearer {}", self.config.api_key)
            .parse()
            .map_err(|_| {
                RealtimeError::InvalidConfiguration("API key is not a valid header".to_string())
            })?;
        headers.insert(http::header::AUTHORIZATION, auth);
        headers.insert("OpenAI-Beta", http::HeaderValue::from_static("realtime=v1"));

        Ok(request)
    }

    fn mark_closed(&self) {
        *self.state.write() = ConnectionState::Closed;
    }

    /// Handle a server event.
    ///
    /// Only audio delta, audio done and speech started reach callbacks; the
    /// rest are logged.
    async fn handle_server_event(
        event: ServerEvent,
        call_id: &str,
        callbacks: &RealtimeCallbacks,
        session_id: &RwLock<Option<String>>,
    ) {
        match event {
            ServerEvent::SessionCreated { session } => {
                info!(call_id = %call_id, session_id = %session.id, "Realtime session created");
                *session_id.write() = Some(session.id);
            }

            ServerEvent::SessionUpdated { session } => {
                info!(call_id = %call_id, session_id = %session.id, "Realtime session updated");
            }

            ServerEvent::Error { error } => {
                error!(
                    call_id = %call_id,
                    error_type = %error.error_type,
                    code = ?error.code,
                    "Realtime service error: {}",
                    error.message
                );
            }

            ServerEvent::AudioDelta {
                delta,
                item_id,
                response_id,
            } => match ServerEvent::decode_audio_delta(&delta) {
                Ok(audio_bytes) if audio_bytes.is_empty() => {
                    trace!(call_id = %call_id, "Ignoring empty audio delta");
                }
                Ok(audio_bytes) => {
                    trace!(call_id = %call_id, bytes = audio_bytes.len(), "Audio delta");
                    if let Some(cb) = callbacks.on_audio.as_ref() {
                        cb(RealtimeAudioData {
                            data: Bytes::from(audio_bytes),
                            sample_rate: OPENAI_REALTIME_SAMPLE_RATE,
                            item_id,
                            response_id,
                        })
                        .await;
                    }
                }
                Err(e) => {
                    warn!(call_id = %call_id, "Failed to decode audio delta: {}", e);
                }
            },

            ServerEvent::AudioDone {
                item_id,
                response_id,
            } => {
                debug!(call_id = %call_id, item_id = ?item_id, "Audio done");
                if let Some(cb) = callbacks.on_audio_done.as_ref() {
                    cb(AudioDone {
                        item_id,
                        response_id,
                    })
                    .await;
                }
            }

            ServerEvent::SpeechStarted {
                audio_start_ms,
                item_id,
            } => {
                debug!(call_id = %call_id, "Speech started at {}ms", audio_start_ms);
                if let Some(cb) = callbacks.on_interrupt.as_ref() {
                    cb(SpeechStarted {
                        audio_start_ms,
                        item_id,
                    })
                    .await;
                }
            }

            ServerEvent::SpeechStopped { audio_end_ms, .. } => {
                debug!(call_id = %call_id, "Speech stopped at {}ms", audio_end_ms);
            }

            ServerEvent::TranscriptionCompleted { transcript, .. } => {
                info!(call_id = %call_id, transcript = %transcript, "Caller transcript");
            }

            ServerEvent::ResponseCreated { response } => {
                debug!(call_id = %call_id, response_id = %response.id, "Response created");
            }

            ServerEvent::ResponseDone { response } => {
                debug!(
                    call_id = %call_id,
                    response_id = %response.id,
                    status = ?response.status,
                    "Response done"
                );
            }

            ServerEvent::ConversationItemCreated { .. }
            | ServerEvent::OutputItemAdded { .. }
            | ServerEvent::ContentPartAdded { .. } => {
                trace!(call_id = %call_id, "Conversation progress event");
            }

            ServerEvent::Unknown => {
                trace!(call_id = %call_id, "Unhandled server event");
            }
        }
    }

    /// Send an event to the connection task.
    async fn send_event(&self, event: ClientEvent) -> RealtimeResult<()> {
        // Clone out so the lock is not held across the await
        let sender = self.ws_sender.lock().clone();
        match sender {
            Some(sender) => sender
                .send(event)
                .await
                .map_err(|e| RealtimeError::WebSocketError(e.to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BaseRealtime for OpenAIRealtime {
    async fn connect(&self) -> RealtimeResult<()> {
        {
            let mut state = self.state.write();
            match *state {
                ConnectionState::Open => return Ok(()),
                ConnectionState::Connecting => return Err(RealtimeError::AlreadyConnecting),
                ConnectionState::Closed => return Err(RealtimeError::Closed),
                ConnectionState::Idle => {}
            }

            if !self.config.has_api_key() {
                *state = ConnectionState::Closed;
                return Err(RealtimeError::InvalidConfiguration(
                    "OpenAI API key is not configured".to_string(),
                ));
            }

            *state = ConnectionState::Connecting;
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                self.mark_closed();
                return Err(e);
            }
        };

        let timeout = self.config.connect_timeout();
        let ws_stream =
            match tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request)).await {
                Ok(Ok((ws_stream, _response))) => ws_stream,
                Ok(Err(e)) => {
                    self.mark_closed();
                    return Err(RealtimeError::ConnectionFailed(e.to_string()));
                }
                Err(_) => {
                    self.mark_closed();
                    return Err(RealtimeError::Timeout(format!(
                        "handshake exceeded {}s",
                        timeout.as_secs()
                    )));
                }
            };

        // session.update must be the first frame on the wire
        let (tx, mut rx) = mpsc::channel::<ClientEvent>(WS_CHANNEL_CAPACITY);
        if let Err(e) = tx.try_send(ClientEvent::session_update(self.build_session_config())) {
            self.mark_closed();
            return Err(RealtimeError::WebSocketError(e.to_string()));
        }

        {
            let mut state = self.state.write();
            if *state != ConnectionState::Connecting {
                // disconnect() ran while the handshake was pending
                debug!(call_id = %self.call_id, "Handshake completed after disconnect, dropping socket");
                return Err(RealtimeError::Closed);
            }
            *self.ws_sender.lock() = Some(tx);
            *state = ConnectionState::Open;
        }

        info!(call_id = %self.call_id, model = %self.config.model, "Connected to OpenAI Realtime API");

        let call_id = self.call_id.clone();
        let callbacks = self.callbacks.clone();
        let session_id = self.session_id.clone();
        let state = self.state.clone();
        let ws_sender = self.ws_sender.clone();

        let handle = tokio::spawn(async move {
            let (mut ws_sink, mut ws_stream) = ws_stream.split();

            let reason = loop {
                tokio::select! {
                    outgoing = rx.recv() => match outgoing {
                        Some(event) => {
                            let json = match serde_json::to_string(&event) {
                                Ok(j) => j,
                                Err(e) => {
                                    error!(call_id = %call_id, "Failed to serialize event: {}", e);
                                    continue;
                                }
                            };
                            trace!(call_id = %call_id, kind = event.kind(), "Sending event");

                            if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                                error!(call_id = %call_id, "Failed to send WebSocket message: {}", e);
                                break CloseReason::Transport(e.to_string());
                            }
                        }
                        None => {
                            // All senders dropped: local disconnect
                            if let Err(e) = ws_sink.send(Message::Close(None)).await {
                                debug!(call_id = %call_id, "Failed to send close frame: {}", e);
                            }
                            break CloseReason::Local;
                        }
                    },

                    incoming = ws_stream.next() => match incoming {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ServerEvent>(text.as_str()) {
                                Ok(event) => {
                                    Self::handle_server_event(event, &call_id, &callbacks, &session_id).await;
                                }
                                Err(e) => {
                                    warn!(call_id = %call_id, "Failed to parse server event: {}", e);
                                }
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(call_id = %call_id, "WebSocket closed by server");
                            break CloseReason::Remote(frame.map(|f| f.reason.as_str().to_string()));
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = ws_sink.send(Message::Pong(data)).await {
                                error!(call_id = %call_id, "Failed to send pong: {}", e);
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!(call_id = %call_id, "WebSocket error: {}", e);
                            break CloseReason::Transport(e.to_string());
                        }
                        None => break CloseReason::Remote(None),
                    },
                }
            };

            *ws_sender.lock() = None;
            *state.write() = ConnectionState::Closed;
            info!(call_id = %call_id, reason = %reason, "OpenAI Realtime connection ended");

            if let Some(cb) = callbacks.on_closed.as_ref() {
                cb(reason).await;
            }
        });

        *self.connection_handle.lock() = Some(handle);
        Ok(())
    }

    async fn send_audio(&self, audio_data: Bytes) -> RealtimeResult<()> {
        if !self.is_open() {
            trace!(call_id = %self.call_id, "Dropping audio, connection not open");
            return Ok(());
        }
        self.send_event(ClientEvent::audio_append(&audio_data)).await
    }

    async fn interrupt(&self) -> RealtimeResult<()> {
        if !self.is_open() {
            return Ok(());
        }
        let sender = self.ws_sender.lock().clone();
        if let Some(sender) = sender
            && let Err(e) = sender.try_send(ClientEvent::ResponseCancel)
        {
            warn!(call_id = %self.call_id, "Failed to queue response.cancel: {}", e);
        }
        Ok(())
    }

    async fn disconnect(&self) -> RealtimeResult<()> {
        let sender = {
            let mut state = self.state.write();
            *state = ConnectionState::Closed;
            self.ws_sender.lock().take()
        };
        let handle = self.connection_handle.lock().take();

        // The task cleared the sender itself if the connection already ended
        let Some(sender) = sender else {
            return Ok(());
        };
        drop(sender);

        if let Some(mut handle) = handle
            && tokio::time::timeout(CLOSE_GRACE_PERIOD, &mut handle)
                .await
                .is_err()
        {
            warn!(call_id = %self.call_id, "Connection task did not stop in time, aborting");
            handle.abort();
        }

        info!(call_id = %self.call_id, "Disconnected from OpenAI Realtime API");
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Creates an [`OpenAIRealtime`] client per call from shared configuration.
#[derive(Debug, Clone)]
pub struct OpenAIRealtimeFactory {
    config: RealtimeConfig,
}

impl OpenAIRealtimeFactory {
    /// Create a factory.
    pub fn new(config: RealtimeConfig) -> Self {
        Self { config }
    }
}

impl RealtimeFactory for OpenAIRealtimeFactory {
    fn create(&self, call_id: &str, callbacks: RealtimeCallbacks) -> RealtimeResult<BoxedRealtime> {
        Ok(Arc::new(OpenAIRealtime::new(
            call_id,
            self.config.clone(),
            callbacks,
        )))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_config() -> RealtimeConfig {
        RealtimeConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_openai_realtime_creation() {
        let realtime = OpenAIRealtime::new("call-1", test_config(), RealtimeCallbacks::default());
        assert!(!realtime.is_open());
        assert_eq!(realtime.connection_state(), ConnectionState::Idle);
        assert!(realtime.session_id().is_none());
    }

    #[test]
    fn test_build_ws_url() {
        let realtime = OpenAIRealtime::new("call-1", test_config(), RealtimeCallbacks::default());
        assert_eq!(
            realtime.build_ws_url(),
            "wss://api.openai.com/v1/realtime?model=gpt-4o-realtime-preview-2024-10-01"
        );
    }

    #[test]
    fn test_build_request_headers() {
        let realtime = OpenAIRealtime::new("call-1", test_config(), RealtimeCallbacks::default());
        let request = realtime.build_request().unwrap();

        assert_eq!(request.headers()["authorization"], "Bearer test_key");
        assert_eq!(request.headers()["openai-beta"], "realtime=v1");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let config = RealtimeConfig {
            // Unroutable; must never be dialed
            url: "ws://10.255.255.1:9".to_string(),
            ..Default::default()
        };
        let realtime = OpenAIRealtime::new("call-1", config, RealtimeCallbacks::default());

        let err = realtime.connect().await.unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(realtime.connection_state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_send_audio_before_connect_is_noop() {
        let realtime = OpenAIRealtime::new("call-1", test_config(), RealtimeCallbacks::default());
        realtime
            .send_audio(Bytes::from(vec![0u8; 100]))
            .await
            .unwrap();
        realtime.interrupt().await.unwrap();
        assert_eq!(realtime.connection_state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let realtime = OpenAIRealtime::new("call-1", test_config(), RealtimeCallbacks::default());
        realtime.disconnect().await.unwrap();
        realtime.disconnect().await.unwrap();
        assert_eq!(realtime.connection_state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_closed_client_cannot_reconnect() {
        let realtime = OpenAIRealtime::new("call-1", test_config(), RealtimeCallbacks::default());
        realtime.disconnect().await.unwrap();
        assert!(matches!(
            realtime.connect().await,
            Err(RealtimeError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = RealtimeConfig {
            url: format!("ws://{addr}"),
            ..test_config()
        };
        let realtime = OpenAIRealtime::new("call-1", config, RealtimeCallbacks::default());

        let err = realtime.connect().await.unwrap_err();
        assert!(matches!(err, RealtimeError::ConnectionFailed(_)));
        assert_eq!(realtime.connection_state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_handshake_timeout() {
        // Accepts TCP but never answers the upgrade
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = RealtimeConfig {
            url: format!("ws://{addr}"),
            connect_timeout_seconds: 1,
            ..test_config()
        };
        let realtime = OpenAIRealtime::new("call-1", config, RealtimeCallbacks::default());

        let err = realtime.connect().await.unwrap_err();
        assert!(matches!(err, RealtimeError::Timeout(_)));
        assert_eq!(realtime.connection_state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_dispatch_audio_delta() {
        let received = Arc::new(Mutex::new(Vec::<RealtimeAudioData>::new()));
        let sink = received.clone();
        let callbacks = RealtimeCallbacks::default().with_audio(Arc::new(move |audio: RealtimeAudioData| {
            let sink = sink.clone();
            Box::pin(async move {
                sink.lock().push(audio);
            })
        }));
        let session_id = RwLock::new(None);

        let event = ServerEvent::AudioDelta {
            response_id: Some("resp_1".to_string()),
            item_id: Some("item_1".to_string()),
            delta: BASE64_STANDARD.encode([1u8, 2, 3, 4]),
        };
        OpenAIRealtime::handle_server_event(event, "call-1", &callbacks, &session_id).await;

        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(&received[0].data[..], &[1u8, 2, 3, 4]);
        assert_eq!(received[0].sample_rate, 24000);
        assert_eq!(received[0].response_id.as_deref(), Some("resp_1"));
    }

    #[tokio::test]
    async fn test_dispatch_bad_audio_delta_is_dropped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let callbacks = RealtimeCallbacks::default().with_audio(Arc::new(move |_: RealtimeAudioData| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        }));
        let session_id = RwLock::new(None);

        let event = ServerEvent::AudioDelta {
            response_id: None,
            item_id: None,
            delta: "not base64!!".to_string(),
        };
        OpenAIRealtime::handle_server_event(event, "call-1", &callbacks, &session_id).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_empty_audio_delta_is_dropped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let callbacks = RealtimeCallbacks::default().with_audio(Arc::new(move |_: RealtimeAudioData| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        }));
        let session_id = RwLock::new(None);

        for json in [
            r#"{"type":"response.audio.delta"}"#,
            r#"{"type":"response.audio.delta","delta":""}"#,
        ] {
            let event: ServerEvent = serde_json::from_str(json).unwrap();
            OpenAIRealtime::handle_server_event(event, "call-1", &callbacks, &session_id).await;
        }

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_speech_started_and_audio_done() {
        let interrupts = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));
        let (i, d) = (interrupts.clone(), done.clone());
        let callbacks = RealtimeCallbacks::default()
            .with_interrupt(Arc::new(move |_: SpeechStarted| {
                i.fetch_add(1, Ordering::SeqCst);
                Box::pin(async {})
            }))
            .with_audio_done(Arc::new(move |_: AudioDone| {
                d.fetch_add(1, Ordering::SeqCst);
                Box::pin(async {})
            }));
        let session_id = RwLock::new(None);

        for json in [
            r#"{"type":"input_audio_buffer.speech_started","audio_start_ms":120}"#,
            r#"{"type":"input_audio_buffer.speech_stopped","audio_end_ms":900}"#,
            r#"{"type":"response.audio.done","response_id":"r","item_id":"i"}"#,
            r#"{"type":"response.done","response":{"id":"r","status":"completed"}}"#,
            r#"{"type":"some.future.event"}"#,
        ] {
            let event: ServerEvent = serde_json::from_str(json).unwrap();
            OpenAIRealtime::handle_server_event(event, "call-1", &callbacks, &session_id).await;
        }

        assert_eq!(interrupts.load(Ordering::SeqCst), 1);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_session_created_records_id() {
        let session_id = RwLock::new(None);
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"session.created","session":{"id":"sess_42"}}"#)
                .unwrap();
        OpenAIRealtime::handle_server_event(
            event,
            "call-1",
            &RealtimeCallbacks::default(),
            &session_id,
        )
        .await;

        assert_eq!(session_id.read().as_deref(), Some("sess_42"));
    }

    #[test]
    fn test_factory_creates_idle_client() {
        let factory = OpenAIRealtimeFactory::new(test_config());
        let client = factory
            .create("call-1", RealtimeCallbacks::default())
            .unwrap();
        assert_eq!(client.connection_state(), ConnectionState::Idle);
    }
}
