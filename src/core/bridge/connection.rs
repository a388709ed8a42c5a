//! Per-socket event processing for one telephony media stream.

use std::ops::ControlFlow;
use std::sync::Arc;

use base64::prelude::*;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use super::coordinator::MediaBridge;
use super::envelope::{MediaPayload, TelephonyEvent, TelephonyRoute};
use super::error::{BridgeError, BridgeResult};
use super::registry::CallSession;
use crate::core::codec::{AudioFrame, FrameDirection};

/// Transport-level message from a telephony socket.
#[derive(Debug, Clone)]
pub enum InboundMessage {
    /// One text frame
    Text(String),
    /// The peer closed the socket
    Close,
    /// The socket failed
    Error(String),
}

/// Drives one telephony media stream through its call lifecycle.
///
/// Events are handled strictly in arrival order. The connection owns at most
/// one call session at a time and tears it down when the stream ends, however
/// it ends.
pub struct MediaConnection {
    bridge: Arc<MediaBridge>,
    outbound: mpsc::Sender<TelephonyRoute>,
    session: Option<Arc<CallSession>>,
}

impl MediaConnection {
    /// Create a connection that writes outbound envelopes to `outbound`.
    pub fn new(bridge: Arc<MediaBridge>, outbound: mpsc::Sender<TelephonyRoute>) -> Self {
        Self {
            bridge,
            outbound,
            session: None,
        }
    }

    /// Process inbound messages until stop, close, error or end of stream,
    /// then tear down the session.
    pub async fn run<S>(mut self, mut inbound: S)
    where
        S: Stream<Item = InboundMessage> + Unpin + Send,
    {
        while let Some(message) = inbound.next().await {
            let flow = match message {
                InboundMessage::Text(text) => self.handle_text(&text, &mut inbound).await,
                InboundMessage::Close => {
                    info!(call_id = ?self.call_id(), "Telephony socket closed");
                    ControlFlow::Break(())
                }
                InboundMessage::Error(e) => {
                    let err = BridgeError::Transport(e);
                    error!(call_id = ?self.call_id(), "Telephony socket error: {}", err);
                    ControlFlow::Break(())
                }
            };

            if flow.is_break() {
                break;
            }
        }

        self.teardown().await;
    }

    fn call_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.call_id())
    }

    async fn handle_text<S>(&mut self, text: &str, inbound: &mut S) -> ControlFlow<()>
    where
        S: Stream<Item = InboundMessage> + Unpin + Send,
    {
        let event = match TelephonyEvent::parse(text) {
            Ok(event) => event,
            Err(e) => {
                warn!(call_id = ?self.call_id(), "Dropping telephony message: {}", e);
                return ControlFlow::Continue(());
            }
        };

        match event {
            TelephonyEvent::Start { .. } => match event.call_control_id() {
                Some(call_id) => {
                    if let Some(format) = event.media_format() {
                        if format.is_mulaw_8k() {
                            debug!(call_id = %call_id, ?format, "Telephony media format");
                        } else {
                            warn!(call_id = %call_id, ?format, "Unexpected telephony media format, treating as 8kHz µ-law");
                        }
                    }
                    self.handle_start(call_id.to_string(), inbound).await
                }
                None => {
                    warn!("Start event without call_control_id, ignoring");
                    ControlFlow::Continue(())
                }
            },
            TelephonyEvent::Media { media } => {
                self.handle_media(media).await;
                ControlFlow::Continue(())
            }
            TelephonyEvent::Stop { .. } => {
                info!(call_id = ?self.call_id(), "Telephony stream stopped");
                ControlFlow::Break(())
            }
            TelephonyEvent::Unknown => {
                trace!("Ignoring telephony event");
                ControlFlow::Continue(())
            }
        }
    }

    /// Open the AI session for a call. Media arriving during the handshake is
    /// dropped; stop, close or error abandons it.
    async fn handle_start<S>(&mut self, call_id: String, inbound: &mut S) -> ControlFlow<()>
    where
        S: Stream<Item = InboundMessage> + Unpin + Send,
    {
        info!(call_id = %call_id, "Telephony stream started");

        if let Some(previous) = self.session.take() {
            warn!(call_id = %previous.call_id(), "Second start on one stream, closing previous session");
            self.bridge.release(&previous).await;
        }

        let session = match self.bridge.create_session(&call_id, self.outbound.clone()) {
            Ok(session) => session,
            Err(e) => {
                error!(call_id = %call_id, "Failed to create realtime session: {}", e);
                return ControlFlow::Continue(());
            }
        };

        let client = session.client().clone();
        let connect = client.connect();
        tokio::pin!(connect);

        let outcome = loop {
            tokio::select! {
                result = &mut connect => break result.map_err(BridgeError::from),
                next = inbound.next() => match next {
                    Some(InboundMessage::Text(text)) => match TelephonyEvent::parse(&text) {
                        Ok(TelephonyEvent::Media { .. }) => {
                            debug!(call_id = %call_id, "Dropping media received during handshake");
                        }
                        Ok(TelephonyEvent::Stop { .. }) => {
                            info!(call_id = %call_id, "Stream stopped during handshake");
                            session.close().await;
                            return ControlFlow::Break(());
                        }
                        Ok(TelephonyEvent::Start { .. }) => {
                            warn!(call_id = %call_id, "Ignoring start received during handshake");
                        }
                        Ok(TelephonyEvent::Unknown) => {}
                        Err(e) => {
                            warn!(call_id = %call_id, "Dropping telephony message: {}", e);
                        }
                    },
                    Some(InboundMessage::Close) | None => {
                        info!(call_id = %call_id, "Telephony socket closed during handshake");
                        session.close().await;
                        return ControlFlow::Break(());
                    }
                    Some(InboundMessage::Error(e)) => {
                        error!(call_id = %call_id, "Telephony socket error during handshake: {}", e);
                        session.close().await;
                        return ControlFlow::Break(());
                    }
                },
            }
        };

        match outcome {
            Ok(()) => {
                self.bridge.register(session.clone()).await;
                self.session = Some(session);
            }
            Err(BridgeError::Configuration(msg)) => {
                error!(call_id = %call_id, "Realtime session not established: {}", msg);
                session.close().await;
            }
            Err(e) => {
                error!(call_id = %call_id, "Failed to connect realtime session: {}", e);
                session.close().await;
            }
        }

        ControlFlow::Continue(())
    }

    async fn handle_media(&self, media: Option<MediaPayload>) {
        let Some(session) = self.session.as_ref() else {
            trace!("Media before a session exists, ignoring");
            return;
        };
        if !session.client().is_open() {
            trace!(call_id = %session.call_id(), "Realtime not open, dropping media");
            return;
        }

        let frame = match decode_media(media) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(call_id = %session.call_id(), "Dropping media frame: {}", e);
                return;
            }
        };

        let linear = frame.transcode();
        if let Err(e) = session.client().send_audio(linear.data).await {
            warn!(call_id = %session.call_id(), "Failed to forward audio: {}", e);
        }
    }

    async fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            self.bridge.release(&session).await;
            info!(call_id = %session.call_id(), "Telephony stream finished");
        }
    }
}

/// Extract the µ-law frame from a media payload.
fn decode_media(media: Option<MediaPayload>) -> BridgeResult<AudioFrame> {
    let payload = media
        .and_then(|m| m.payload)
        .ok_or_else(|| BridgeError::Protocol("media event without payload".to_string()))?;
    let bytes = BASE64_STANDARD.decode(payload)?;
    Ok(AudioFrame::mulaw(bytes, FrameDirection::Inbound))
}
