//! Media bridge WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::media_bridge_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the media bridge WebSocket router
///
/// # Endpoint
///
/// `GET /media-bridge` - WebSocket upgrade for one telephony media stream
///
/// # Protocol
///
/// The telephony side sends JSON text frames:
///
/// ```json
/// {"event": "start", "start": {"call_control_id": "v3:abc"}}
/// {"event": "media", "media": {"payload": "<base64 µ-law, 8kHz>"}}
/// {"event": "stop"}
/// ```
///
/// The server answers with AI audio in the same envelope shape:
///
/// ```json
/// {"event": "media", "media": {"payload": "<base64 µ-law, 8kHz>"}}
/// ```
pub fn create_media_bridge_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media-bridge", get(media_bridge_handler))
        .layer(TraceLayer::new_for_http())
}
