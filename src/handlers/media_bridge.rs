//! Telephony media stream WebSocket handler
//!
//! The telephony provider connects here once per call and streams JSON
//! envelopes (`start`, `media`, `stop`). AI audio is written back on the same
//! socket as `media` envelopes.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt, future};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::core::bridge::{InboundMessage, MediaConnection, TelephonyRoute};
use crate::state::AppState;

/// Channel buffer between AI callbacks and the socket writer
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Maximum WebSocket frame size (1 MB)
const MAX_WS_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum WebSocket message size (1 MB)
const MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

/// Telephony media stream WebSocket handler
///
/// Upgrades the HTTP connection and hands the socket to the media bridge.
pub async fn media_bridge_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    debug!("Media bridge WebSocket upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_media_socket(socket, state))
}

async fn handle_media_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("Media bridge WebSocket connection established");

    let (mut sender, receiver) = socket.split();
    let (route_tx, mut route_rx) = mpsc::channel::<TelephonyRoute>(CHANNEL_BUFFER_SIZE);

    // Single writer keeps outbound envelopes in order
    let sender_task = tokio::spawn(async move {
        while let Some(route) = route_rx.recv().await {
            let result = match route {
                TelephonyRoute::Outgoing(envelope) => match serde_json::to_string(&envelope) {
                    Ok(json_str) => sender.send(Message::Text(json_str.into())).await,
                    Err(e) => {
                        error!("Failed to serialize telephony envelope: {}", e);
                        continue;
                    }
                },
                TelephonyRoute::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            };

            if let Err(e) = result {
                debug!("Failed to write to telephony socket: {}", e);
                break;
            }
        }
    });

    let inbound = receiver
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(InboundMessage::Text(text.as_str().to_owned())),
                Ok(Message::Close(_)) => Some(InboundMessage::Close),
                Ok(_) => None,
                Err(e) => Some(InboundMessage::Error(e.to_string())),
            })
        })
        .boxed();

    MediaConnection::new(app_state.bridge.clone(), route_tx.clone())
        .run(inbound)
        .await;

    let _ = route_tx.send(TelephonyRoute::Close).await;
    drop(route_tx);
    if let Err(e) = sender_task.await {
        error!("Telephony writer task failed: {}", e);
    }

    info!("Media bridge WebSocket connection closed");
}
