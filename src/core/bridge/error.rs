use thiserror::Error;

use crate::core::realtime::RealtimeError;

/// Failures on a bridged call.
///
/// None of these escape the call they happened on.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Missing or invalid configuration, e.g. no API key
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Socket failure on either side of the bridge
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed or unexpected envelope
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Audio payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<RealtimeError> for BridgeError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::InvalidConfiguration(msg) => BridgeError::Configuration(msg),
            RealtimeError::AlreadyConnecting => BridgeError::Protocol(err.to_string()),
            other => BridgeError::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Protocol(err.to_string())
    }
}

impl From<base64::DecodeError> for BridgeError {
    fn from(err: base64::DecodeError) -> Self {
        BridgeError::Decode(err.to_string())
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
