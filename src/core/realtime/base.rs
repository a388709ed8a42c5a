//! Base traits and types for the realtime speech session client.
//!
//! A realtime client owns one persistent connection to a speech-to-speech AI
//! service for the lifetime of a single call. Its lifecycle is a one-way state
//! machine:
//!
//! ```text
//! Idle ──connect()──▶ Connecting ──handshake ok──▶ Open ──close/error──▶ Closed
//!                          │                                               ▲
//!                          └──────────── failure / timeout ────────────────┘
//! ```
//!
//! `Closed` is terminal: a closed client is never reconnected. A new call gets
//! a new client.
//!
//! # Audio Format
//!
//! Audio in both directions is PCM 16-bit signed little-endian at 24kHz.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::openai::config::{
    DEFAULT_CONNECT_TIMEOUT_SECONDS, DEFAULT_INSTRUCTIONS, DEFAULT_MAX_RESPONSE_OUTPUT_TOKENS,
    DEFAULT_REALTIME_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TRANSCRIPTION_MODEL, OPENAI_REALTIME_URL,
    OpenAIRealtimeVoice,
};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during realtime operations.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid or missing configuration (e.g. no API key)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Operation timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// A connect is already in flight
    #[error("Connect already in progress")]
    AlreadyConnecting,

    /// The client reached its terminal state
    #[error("Client is closed")]
    Closed,
}

impl RealtimeError {
    /// True for errors caused by configuration rather than the network.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RealtimeError::InvalidConfiguration(_))
    }
}

/// Result type for realtime operations.
pub type RealtimeResult<T> = Result<T, RealtimeError>;

// =============================================================================
// Configuration Types
// =============================================================================

/// Server-side voice activity detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnDetectionConfig {
    /// Activation threshold (0.0 to 1.0)
    pub threshold: f32,
    /// Audio kept before detected speech, in ms
    pub prefix_padding_ms: u32,
    /// Silence that ends a turn, in ms
    pub silence_duration_ms: u32,
}

impl Default for TurnDetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 200,
        }
    }
}

/// Configuration shared by every realtime session the bridge opens.
#[derive(Clone)]
pub struct RealtimeConfig {
    /// API key for authentication. Empty means "not configured".
    pub api_key: String,
    /// WebSocket endpoint, without query string
    pub url: String,
    /// Model name, sent as the `model` query parameter
    pub model: String,
    /// Output voice
    pub voice: OpenAIRealtimeVoice,
    /// System instructions for the assistant
    pub instructions: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens per response
    pub max_response_output_tokens: u32,
    /// Model used to transcribe caller audio
    pub transcription_model: String,
    /// Voice activity detection
    pub turn_detection: TurnDetectionConfig,
    /// Upper bound on the WebSocket handshake
    pub connect_timeout_seconds: u64,
}

impl RealtimeConfig {
    /// Handshake timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Whether an API key is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: OPENAI_REALTIME_URL.to_string(),
            model: DEFAULT_REALTIME_MODEL.to_string(),
            voice: OpenAIRealtimeVoice::default(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_response_output_tokens: DEFAULT_MAX_RESPONSE_OUTPUT_TOKENS,
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            turn_detection: TurnDetectionConfig::default(),
            connect_timeout_seconds: DEFAULT_CONNECT_TIMEOUT_SECONDS,
        }
    }
}

impl fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("api_key", &if self.has_api_key() { "***" } else { "" })
            .field("url", &self.url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("temperature", &self.temperature)
            .field("max_response_output_tokens", &self.max_response_output_tokens)
            .field("transcription_model", &self.transcription_model)
            .field("turn_detection", &self.turn_detection)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Connection State
// =============================================================================

/// Connection state of a realtime client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Constructed, never connected
    #[default]
    Idle,
    /// Handshake in progress
    Connecting,
    /// Connected and accepting audio
    Open,
    /// Terminal
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

// =============================================================================
// Event Payloads
// =============================================================================

/// Audio data produced by the AI service.
#[derive(Debug, Clone)]
pub struct RealtimeAudioData {
    /// Raw audio bytes (PCM 16-bit, 24kHz, mono, little-endian)
    pub data: Bytes,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Item ID from the provider
    pub item_id: Option<String>,
    /// Response ID from the provider
    pub response_id: Option<String>,
}

/// Marks the end of the audio for one response item.
#[derive(Debug, Clone, Default)]
pub struct AudioDone {
    /// Item ID from the provider
    pub item_id: Option<String>,
    /// Response ID from the provider
    pub response_id: Option<String>,
}

/// The service detected the caller starting to speak (barge-in).
#[derive(Debug, Clone, Default)]
pub struct SpeechStarted {
    /// Audio timestamp in milliseconds
    pub audio_start_ms: u64,
    /// Item ID
    pub item_id: Option<String>,
}

/// Why a realtime connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// `disconnect()` was called
    Local,
    /// The service closed the socket
    Remote(Option<String>),
    /// The transport failed
    Transport(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Local => write!(f, "closed locally"),
            CloseReason::Remote(Some(reason)) => write!(f, "closed by remote: {reason}"),
            CloseReason::Remote(None) => write!(f, "closed by remote"),
            CloseReason::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

// =============================================================================
// Callback Types
// =============================================================================

/// Callback type for audio output events.
pub type AudioOutputCallback =
    Arc<dyn Fn(RealtimeAudioData) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for end-of-audio events.
pub type AudioDoneCallback =
    Arc<dyn Fn(AudioDone) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for interrupt requests (caller speech detected).
pub type InterruptCallback =
    Arc<dyn Fn(SpeechStarted) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback type for connection closure.
pub type ClosedCallback =
    Arc<dyn Fn(CloseReason) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback slots handed to a client at construction.
///
/// Callbacks are moved into the client and never reassigned.
#[derive(Clone, Default)]
pub struct RealtimeCallbacks {
    /// Invoked per decoded audio chunk
    pub on_audio: Option<AudioOutputCallback>,
    /// Invoked when a response item has finished producing audio
    pub on_audio_done: Option<AudioDoneCallback>,
    /// Invoked when the caller starts speaking
    pub on_interrupt: Option<InterruptCallback>,
    /// Invoked exactly once when an open connection ends
    pub on_closed: Option<ClosedCallback>,
}

impl RealtimeCallbacks {
    /// Set the audio output callback.
    pub fn with_audio(mut self, callback: AudioOutputCallback) -> Self {
        self.on_audio = Some(callback);
        self
    }

    /// Set the audio complete callback.
    pub fn with_audio_done(mut self, callback: AudioDoneCallback) -> Self {
        self.on_audio_done = Some(callback);
        self
    }

    /// Set the interrupt request callback.
    pub fn with_interrupt(mut self, callback: InterruptCallback) -> Self {
        self.on_interrupt = Some(callback);
        self
    }

    /// Set the closed callback.
    pub fn with_closed(mut self, callback: ClosedCallback) -> Self {
        self.on_closed = Some(callback);
        self
    }
}

impl fmt::Debug for RealtimeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeCallbacks")
            .field("on_audio", &self.on_audio.is_some())
            .field("on_audio_done", &self.on_audio_done.is_some())
            .field("on_interrupt", &self.on_interrupt.is_some())
            .field("on_closed", &self.on_closed.is_some())
            .finish()
    }
}

// =============================================================================
// Base Trait
// =============================================================================

/// Base trait for realtime speech session clients.
///
/// All methods take `&self`; implementations keep their state behind interior
/// mutability so one client can be shared between the task feeding it audio
/// and the task tearing it down.
#[async_trait]
pub trait BaseRealtime: Send + Sync {
    /// Open the connection and send the session configuration.
    ///
    /// Suspends until the connection is open or has failed. Fails with
    /// [`RealtimeError::InvalidConfiguration`] when no API key is configured,
    /// without touching the network.
    async fn connect(&self) -> RealtimeResult<()>;

    /// Forward one chunk of PCM16 audio. No-op unless open.
    async fn send_audio(&self, audio_data: Bytes) -> RealtimeResult<()>;

    /// Ask the service to cancel the in-flight response. No-op unless open.
    async fn interrupt(&self) -> RealtimeResult<()>;

    /// Close the connection. Idempotent; always leaves the client closed.
    async fn disconnect(&self) -> RealtimeResult<()>;

    /// Current connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Whether the client accepts audio.
    fn is_open(&self) -> bool {
        self.connection_state() == ConnectionState::Open
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Shared trait object for realtime clients.
pub type BoxedRealtime = Arc<dyn BaseRealtime>;

/// Creates one realtime client per call.
pub trait RealtimeFactory: Send + Sync {
    /// Build an unconnected client for `call_id` with its callbacks bound.
    fn create(&self, call_id: &str, callbacks: RealtimeCallbacks) -> RealtimeResult<BoxedRealtime>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Idle.to_string(), "idle");
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Open.to_string(), "open");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
    }

    #[test]
    fn test_default_config() {
        let config = RealtimeConfig::default();
        assert!(!config.has_api_key());
        assert_eq!(config.url, "wss://api.openai.com/v1/realtime");
        assert_eq!(config.model, "gpt-4o-realtime-preview-2024-10-01");
        assert_eq!(config.voice, OpenAIRealtimeVoice::Alloy);
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.max_response_output_tokens, 4096);
        assert_eq!(config.transcription_model, "whisper-1");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_turn_detection() {
        let td = TurnDetectionConfig::default();
        assert_eq!(td.threshold, 0.5);
        assert_eq!(td.prefix_padding_ms, 300);
        assert_eq!(td.silence_duration_ms, 200);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = RealtimeConfig {
            api_key: "sk-secret".to_string(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_error_display() {
        let err = RealtimeError::ConnectionFailed("test".to_string());
        assert!(err.to_string().contains("Connection failed"));

        let err = RealtimeError::InvalidConfiguration("no key".to_string());
        assert!(err.is_configuration());
        assert!(!RealtimeError::Closed.is_configuration());
        assert_eq!(RealtimeError::Closed.to_string(), "Client is closed");
    }

    #[test]
    fn test_close_reason_display() {
        assert_eq!(CloseReason::Local.to_string(), "closed locally");
        assert_eq!(
            CloseReason::Remote(Some("bye".into())).to_string(),
            "closed by remote: bye"
        );
        assert!(
            CloseReason::Transport("reset".into())
                .to_string()
                .contains("reset")
        );
    }

    #[test]
    fn test_callbacks_builder() {
        let callbacks = RealtimeCallbacks::default()
            .with_audio(Arc::new(|_: RealtimeAudioData| Box::pin(async {})))
            .with_closed(Arc::new(|_: CloseReason| Box::pin(async {})));

        assert!(callbacks.on_audio.is_some());
        assert!(callbacks.on_audio_done.is_none());
        assert!(callbacks.on_interrupt.is_none());
        assert!(callbacks.on_closed.is_some());
    }
}
