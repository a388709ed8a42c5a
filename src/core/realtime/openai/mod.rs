//! OpenAI Realtime API client.
//!
//! Bidirectional audio streaming with server-side voice activity detection
//! over OpenAI's WebSocket Realtime API.
//!
//! # Supported Voices
//!
//! alloy, ash, ballad, coral, echo, sage, shimmer, verse
//!
//! # Audio Format
//!
//! Input and output audio is PCM 16-bit signed little-endian at 24kHz.

mod client;
pub mod config;
pub mod messages;

pub use client::{OpenAIRealtime, OpenAIRealtimeFactory};
pub use config::{
    DEFAULT_CONNECT_TIMEOUT_SECONDS, DEFAULT_INSTRUCTIONS, DEFAULT_MAX_RESPONSE_OUTPUT_TOKENS,
    DEFAULT_REALTIME_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TRANSCRIPTION_MODEL,
    OPENAI_REALTIME_SAMPLE_RATE, OPENAI_REALTIME_URL, OpenAIRealtimeVoice, TEMPERATURE_RANGE,
};
