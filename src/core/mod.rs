pub mod bridge;
pub mod codec;
pub mod realtime;

// Re-export commonly used types for convenience
pub use bridge::{
    BridgeError, BridgeResult, CallSession, InboundMessage, MediaBridge, MediaConnection,
    SessionRegistry, TelephonyEvent, TelephonyOutbound, TelephonyRoute,
};

pub use codec::{AudioEncoding, AudioFrame, FrameDirection, decode_to_linear16, encode_from_linear16};

pub use realtime::{
    BaseRealtime, BoxedRealtime, ConnectionState, OpenAIRealtime, OpenAIRealtimeFactory,
    RealtimeCallbacks, RealtimeConfig, RealtimeError, RealtimeFactory, RealtimeResult,
};
