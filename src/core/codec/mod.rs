//! Audio codec transcoding between the telephony and realtime AI media formats.
//!
//! Telephony media streams carry G.711 µ-law at 8kHz (one byte per sample).
//! The realtime AI service speaks PCM 16-bit signed little-endian at 24kHz.
//!
//! # Resampling
//!
//! Conversion between the two sample rates is deliberately naive:
//! - 8kHz → 24kHz repeats every sample three times (nearest neighbour)
//! - 24kHz → 8kHz keeps every third sample (decimation)
//!
//! No interpolation or anti-aliasing filter is applied. All functions are pure
//! and stateless, so they can be called concurrently from any number of calls.

mod mulaw;

use bytes::Bytes;

pub use mulaw::{
    MULAW_BIAS, MULAW_CLIP, UPSAMPLE_RATIO, decode_to_linear16, encode_from_linear16,
    linear_to_mulaw, mulaw_to_linear,
};

/// Sample rate of the telephony narrowband stream.
pub const TELEPHONY_SAMPLE_RATE: u32 = 8000;

/// Sample rate of the realtime AI linear PCM stream.
pub const LINEAR16_SAMPLE_RATE: u32 = TELEPHONY_SAMPLE_RATE * UPSAMPLE_RATIO as u32;

/// Encoding of an audio frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// G.711 µ-law, 8kHz, 8-bit
    Mulaw,
    /// PCM 16-bit signed little-endian, 24kHz
    Linear16,
}

impl AudioEncoding {
    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Mulaw => TELEPHONY_SAMPLE_RATE,
            Self::Linear16 => LINEAR16_SAMPLE_RATE,
        }
    }

    /// Bytes per sample.
    #[inline]
    pub fn sample_width(&self) -> usize {
        match self {
            Self::Mulaw => 1,
            Self::Linear16 => 2,
        }
    }

    /// Wire name of the encoding.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mulaw => "g711_ulaw",
            Self::Linear16 => "pcm16",
        }
    }
}

impl std::fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which way a frame is travelling through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDirection {
    /// Caller audio, telephony → AI
    Inbound,
    /// AI audio, AI → telephony
    Outbound,
}

/// One chunk of encoded audio in flight through the bridge.
///
/// Frames are transient: they are transcoded, relayed and dropped.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Encoded audio bytes
    pub data: Bytes,
    /// Encoding of `data`
    pub encoding: AudioEncoding,
    /// Travel direction
    pub direction: FrameDirection,
}

impl AudioFrame {
    /// Create a µ-law frame.
    pub fn mulaw(data: impl Into<Bytes>, direction: FrameDirection) -> Self {
        Self {
            data: data.into(),
            encoding: AudioEncoding::Mulaw,
            direction,
        }
    }

    /// Create a linear PCM16 frame.
    pub fn linear16(data: impl Into<Bytes>, direction: FrameDirection) -> Self {
        Self {
            data: data.into(),
            encoding: AudioEncoding::Linear16,
            direction,
        }
    }

    /// Number of whole samples in the frame.
    pub fn sample_count(&self) -> usize {
        self.data.len() / self.encoding.sample_width()
    }

    /// Playback duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.sample_count() as u64 * 1000) / self.encoding.sample_rate() as u64
    }

    /// Convert the frame to the other encoding, keeping its direction.
    pub fn transcode(&self) -> AudioFrame {
        match self.encoding {
            AudioEncoding::Mulaw => {
                AudioFrame::linear16(decode_to_linear16(&self.data), self.direction)
            }
            AudioEncoding::Linear16 => {
                AudioFrame::mulaw(encode_from_linear16(&self.data), self.direction)
            }
        }
    }
}
