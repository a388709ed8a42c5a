//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `media_bridge` - Telephony media stream WebSocket

pub mod api;
pub mod media_bridge;

pub use media_bridge::media_bridge_handler;
