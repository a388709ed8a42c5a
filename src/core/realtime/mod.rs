//! Realtime speech-to-speech session client.
//!
//! - `BaseRealtime` trait for the client abstraction
//! - `RealtimeFactory` to build one client per call
//! - Callback-based event handling, callbacks bound at construction
//!
//! # Audio Format
//!
//! PCM 16-bit signed little-endian at 24kHz in both directions.

mod base;
pub mod openai;

pub use base::{
    AudioDone, AudioDoneCallback, AudioOutputCallback, BaseRealtime, BoxedRealtime, CloseReason,
    ClosedCallback, ConnectionState, InterruptCallback, RealtimeAudioData, RealtimeCallbacks,
    RealtimeConfig, RealtimeError, RealtimeFactory, RealtimeResult, SpeechStarted,
    TurnDetectionConfig,
};
pub use openai::{
    OPENAI_REALTIME_SAMPLE_RATE, OPENAI_REALTIME_URL, OpenAIRealtime, OpenAIRealtimeFactory,
    OpenAIRealtimeVoice,
};
