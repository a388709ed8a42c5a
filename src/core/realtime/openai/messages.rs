//! OpenAI Realtime API WebSocket message types.
//!
//! All events are JSON-encoded and sent over WebSocket, tagged by `type`.
//!
//! # Protocol Overview
//!
//! Client events (sent to server):
//! - session.update - Configure the session once the socket opens
//! - input_audio_buffer.append - Append caller audio to the input buffer
//! - response.cancel - Cancel the response in flight
//!
//! Server events (received from server):
//! - session.created / session.updated
//! - conversation.item.created
//! - response.created / response.done
//! - response.output_item.added / response.content_part.added
//! - response.audio.delta - Audio data chunk
//! - response.audio.done - Audio for an item complete
//! - input_audio_buffer.speech_started / input_audio_buffer.speech_stopped
//! - conversation.item.input_audio_transcription.completed
//! - error
//!
//! Any other server event kind deserializes to [`ServerEvent::Unknown`].

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::{Modality, OpenAIRealtimeVoice};
use crate::core::realtime::base::{RealtimeConfig, TurnDetectionConfig};

// =============================================================================
// Session Configuration
// =============================================================================

/// Session configuration sent in `session.update`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    /// Response modalities
    pub modalities: Vec<Modality>,
    /// System instructions for the assistant
    pub instructions: String,
    /// Voice for audio output
    pub voice: OpenAIRealtimeVoice,
    /// Input audio format
    pub input_audio_format: String,
    /// Output audio format
    pub output_audio_format: String,
    /// Input audio transcription configuration
    pub input_audio_transcription: InputAudioTranscription,
    /// Turn detection configuration
    pub turn_detection: TurnDetection,
    /// Tool definitions; the bridge never registers tools
    pub tools: Vec<serde_json::Value>,
    /// Tool choice strategy
    pub tool_choice: String,
    /// Temperature for response generation
    pub temperature: f32,
    /// Maximum response output tokens
    pub max_response_output_tokens: u32,
}

impl SessionConfig {
    /// Build the session configuration for a bridged phone call.
    pub fn for_call(config: &RealtimeConfig, audio_format: &str) -> Self {
        Self {
            modalities: vec![Modality::Text, Modality::Audio],
            instructions: config.instructions.clone(),
            voice: config.voice,
            input_audio_format: audio_format.to_string(),
            output_audio_format: audio_format.to_string(),
            input_audio_transcription: InputAudioTranscription {
                model: config.transcription_model.clone(),
            },
            turn_detection: TurnDetection::from(config.turn_detection),
            tools: Vec::new(),
            tool_choice: "auto".to_string(),
            temperature: config.temperature,
            max_response_output_tokens: config.max_response_output_tokens,
        }
    }
}

/// Input audio transcription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputAudioTranscription {
    /// Transcription model (e.g., "whisper-1")
    pub model: String,
}

/// Turn detection configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD
    #[serde(rename = "server_vad")]
    ServerVad {
        /// Activation threshold
        threshold: f32,
        /// Audio prefix padding in ms
        prefix_padding_ms: u32,
        /// Silence duration in ms
        silence_duration_ms: u32,
    },
}

impl From<TurnDetectionConfig> for TurnDetection {
    fn from(td: TurnDetectionConfig) -> Self {
        TurnDetection::ServerVad {
            threshold: td.threshold,
            prefix_padding_ms: td.prefix_padding_ms,
            silence_duration_ms: td.silence_duration_ms,
        }
    }
}

// =============================================================================
// Client Events (sent to server)
// =============================================================================

/// Client events sent to the OpenAI Realtime API.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// Session configuration
        session: Box<SessionConfig>,
    },

    /// Append audio to input buffer
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        /// Base64-encoded audio data
        audio: String,
    },

    /// Cancel the current response
    #[serde(rename = "response.cancel")]
    ResponseCancel,
}

impl ClientEvent {
    /// Create an audio append event from raw bytes.
    pub fn audio_append(data: &[u8]) -> Self {
        ClientEvent::InputAudioBufferAppend {
            audio: BASE64_STANDARD.encode(data),
        }
    }

    /// Create a session update event.
    pub fn session_update(session: SessionConfig) -> Self {
        ClientEvent::SessionUpdate {
            session: Box::new(session),
        }
    }

    /// Wire name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEvent::SessionUpdate { .. } => "session.update",
            ClientEvent::InputAudioBufferAppend { .. } => "input_audio_buffer.append",
            ClientEvent::ResponseCancel => "response.cancel",
        }
    }
}

// =============================================================================
// Server Events (received from server)
// =============================================================================

/// Server events received from the OpenAI Realtime API.
///
/// Fields the bridge does not rely on are optional so partial events still
/// parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Error occurred
    #[serde(rename = "error")]
    Error {
        /// Error details
        #[serde(default)]
        error: ApiError,
    },

    /// Session created
    #[serde(rename = "session.created")]
    SessionCreated {
        /// Session information
        #[serde(default)]
        session: Session,
    },

    /// Session updated
    #[serde(rename = "session.updated")]
    SessionUpdated {
        /// Session information
        #[serde(default)]
        session: Session,
    },

    /// Conversation item created
    #[serde(rename = "conversation.item.created")]
    ConversationItemCreated {
        /// Created item
        item: Option<ConversationItem>,
    },

    /// Response created
    #[serde(rename = "response.created")]
    ResponseCreated {
        /// Response information
        #[serde(default)]
        response: Response,
    },

    /// Output item added to response
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded {
        /// Response ID
        response_id: Option<String>,
        /// Item
        item: Option<ConversationItem>,
    },

    /// Content part added
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded {
        /// Response ID
        response_id: Option<String>,
        /// Item ID
        item_id: Option<String>,
    },

    /// Audio delta (audio data chunk)
    #[serde(rename = "response.audio.delta")]
    AudioDelta {
        /// Response ID
        response_id: Option<String>,
        /// Item ID
        item_id: Option<String>,
        /// Base64-encoded audio delta
        #[serde(default)]
        delta: String,
    },

    /// Audio done
    #[serde(rename = "response.audio.done")]
    AudioDone {
        /// Response ID
        response_id: Option<String>,
        /// Item ID
        item_id: Option<String>,
    },

    /// Speech started (VAD detected speech)
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted {
        /// Audio start timestamp in ms
        #[serde(default)]
        audio_start_ms: u64,
        /// Item ID
        item_id: Option<String>,
    },

    /// Speech stopped (VAD detected silence)
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped {
        /// Audio end timestamp in ms
        #[serde(default)]
        audio_end_ms: u64,
        /// Item ID
        item_id: Option<String>,
    },

    /// Input audio transcription completed
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    TranscriptionCompleted {
        /// Item ID
        item_id: Option<String>,
        /// Transcript text
        #[serde(default)]
        transcript: String,
    },

    /// Response done
    #[serde(rename = "response.done")]
    ResponseDone {
        /// Response information
        #[serde(default)]
        response: Response,
    },

    /// Any event kind the bridge does not interpret
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Decode base64 audio from an AudioDelta event.
    pub fn decode_audio_delta(delta: &str) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(delta)
    }
}

// =============================================================================
// Supporting Types
// =============================================================================

/// API error information.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiError {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error code
    pub code: Option<String>,
    /// Error message
    pub message: String,
}

/// Session information.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Session ID
    pub id: String,
    /// Model used
    pub model: Option<String>,
    /// Voice
    pub voice: Option<String>,
}

/// Conversation item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationItem {
    /// Item ID
    pub id: Option<String>,
    /// Item type
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    /// Item role (user, assistant, system)
    pub role: Option<String>,
}

/// Response information.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Response {
    /// Response ID
    pub id: String,
    /// Response status
    pub status: Option<String>,
}
