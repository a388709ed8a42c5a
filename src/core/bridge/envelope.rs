//! Telephony media stream envelopes.
//!
//! Every WebSocket text message on the telephony side is one JSON envelope
//! tagged by `event`:
//!
//! ```json
//! {"event": "start", "start": {"call_control_id": "v3:abc"}}
//! {"event": "media", "media": {"track": "inbound", "payload": "<base64 µ-law>"}}
//! {"event": "stop"}
//! ```
//!
//! Other events (`connected`, `dtmf`, ...) parse as [`TelephonyEvent::Unknown`].

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::BridgeResult;

/// Inbound envelope from the telephony media stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyEvent {
    /// Stream started for a call
    Start {
        /// Stream metadata
        start: Option<StartPayload>,
    },
    /// One chunk of caller audio
    Media {
        /// Audio payload
        media: Option<MediaPayload>,
    },
    /// Stream ended
    Stop {
        /// Stop metadata, unused
        #[serde(default)]
        stop: Option<serde_json::Value>,
    },
    /// Any other event
    #[serde(other)]
    Unknown,
}

impl TelephonyEvent {
    /// Parse one text message.
    pub fn parse(text: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Media format advertised by a start event.
    pub fn media_format(&self) -> Option<&MediaFormat> {
        match self {
            TelephonyEvent::Start { start: Some(start) } => start.media_format.as_ref(),
            _ => None,
        }
    }

    /// Call identifier carried by a start event.
    pub fn call_control_id(&self) -> Option<&str> {
        match self {
            TelephonyEvent::Start { start: Some(start) } => start
                .call_control_id
                .as_deref()
                .filter(|id| !id.is_empty()),
            _ => None,
        }
    }
}

/// Payload of a `start` event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartPayload {
    /// Opaque call identifier
    pub call_control_id: Option<String>,
    /// Media format advertised by the telephony side
    pub media_format: Option<MediaFormat>,
}

/// Media format of the telephony stream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaFormat {
    /// Encoding name, e.g. `PCMU`
    pub encoding: Option<String>,
    /// Sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Channel count
    pub channels: Option<u32>,
}

impl MediaFormat {
    /// Whether the stream is 8kHz µ-law. Missing fields are assumed to match.
    pub fn is_mulaw_8k(&self) -> bool {
        let encoding_ok = self.encoding.as_deref().is_none_or(|encoding| {
            encoding.eq_ignore_ascii_case("PCMU") || encoding.eq_ignore_ascii_case("audio/x-mulaw")
        });
        encoding_ok && self.sample_rate.is_none_or(|rate| rate == 8000)
    }
}

/// Payload of a `media` event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaPayload {
    /// Which leg the audio belongs to
    pub track: Option<String>,
    /// Base64 µ-law audio
    pub payload: Option<String>,
}

/// Outbound envelope to the telephony media stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyOutbound {
    /// Audio to play to the caller
    Media {
        /// Audio payload
        media: OutboundMedia,
    },
}

/// Payload of an outbound `media` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMedia {
    /// Base64 µ-law audio
    pub payload: String,
}

impl TelephonyOutbound {
    /// Wrap µ-law audio in a media envelope.
    pub fn media(narrowband: &[u8]) -> Self {
        TelephonyOutbound::Media {
            media: OutboundMedia {
                payload: BASE64_STANDARD.encode(narrowband),
            },
        }
    }
}

/// Items for a telephony socket's writer task.
#[derive(Debug, Clone)]
pub enum TelephonyRoute {
    /// Send an envelope
    Outgoing(TelephonyOutbound),
    /// Close the socket and stop writing
    Close,
}
