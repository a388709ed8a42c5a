//! Telephony ⇄ realtime AI media bridge.
//!
//! Each telephony media stream is driven by a [`MediaConnection`]. A `start`
//! event opens a realtime AI session for its call id and registers it with
//! the shared [`MediaBridge`]; caller audio is transcoded to PCM16 and
//! forwarded, AI audio is transcoded back to µ-law and written to the
//! telephony socket. `stop`, socket closure or AI-side closure tear the
//! session down and remove it from the registry.

mod connection;
mod coordinator;
mod envelope;
mod error;
mod registry;

pub use connection::{InboundMessage, MediaConnection};
pub use coordinator::MediaBridge;
pub use envelope::{
    MediaFormat, MediaPayload, OutboundMedia, StartPayload, TelephonyEvent, TelephonyOutbound,
    TelephonyRoute,
};
pub use error::{BridgeError, BridgeResult};
pub use registry::{CallSession, SessionRegistry};
