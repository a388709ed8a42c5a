//! WebSocket mock of the OpenAI Realtime API
//!
//! Accepts connections on an ephemeral port, records every client event and
//! the upgrade headers, and sends scripted server events on demand.

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// Commands for the currently connected client
#[derive(Debug)]
pub enum MockCommand {
    /// Send a server event
    Send(Value),
    /// Send a close frame and drop the connection
    Close,
}

/// Handle to a running mock server
pub struct MockRealtimeServer {
    /// Base URL to put in `RealtimeConfig::url`
    pub url: String,
    /// Client events in arrival order
    pub received: Arc<Mutex<Vec<Value>>>,
    /// Authorization and OpenAI-Beta headers of the last upgrade
    pub headers: Arc<Mutex<Option<(String, String)>>>,
    /// Connections accepted so far
    pub connections: Arc<AtomicUsize>,
    /// Set once a client closed its side
    pub client_closes: Arc<AtomicUsize>,
    commands: mpsc::UnboundedSender<MockCommand>,
}

impl MockRealtimeServer {
    /// Bind to an ephemeral port and start accepting.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let headers = Arc::new(Mutex::new(None));
        let connections = Arc::new(AtomicUsize::new(0));
        let client_closes = Arc::new(AtomicUsize::new(0));
        let (commands, command_rx) = mpsc::unbounded_channel();
        let command_rx = Arc::new(tokio::sync::Mutex::new(command_rx));

        {
            let received = received.clone();
            let headers = headers.clone();
            let connections = connections.clone();
            let client_closes = client_closes.clone();

            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let received = received.clone();
                    let headers = headers.clone();
                    let connections = connections.clone();
                    let client_closes = client_closes.clone();
                    let command_rx = command_rx.clone();

                    tokio::spawn(async move {
                        let capture = headers.clone();
                        let callback = move |req: &Request, resp: Response| {
                            let header = |name: &str| {
                                req.headers()
                                    .get(name)
                                    .and_then(|v| v.to_str().ok())
                                    .unwrap_or_default()
                                    .to_string()
                            };
                            *capture.lock() = Some((header("authorization"), header("openai-beta")));
                            Ok::<Response, ErrorResponse>(resp)
                        };

                        let Ok(ws_stream) = accept_hdr_async(stream, callback).await else {
                            return;
                        };
                        connections.fetch_add(1, Ordering::SeqCst);

                        let (mut write, mut read) = ws_stream.split();
                        let mut command_rx = command_rx.lock().await;

                        loop {
                            tokio::select! {
                                msg = read.next() => match msg {
                                    Some(Ok(Message::Text(text))) => {
                                        if let Ok(value) = serde_json::from_str::<Value>(text.as_str()) {
                                            received.lock().push(value);
                                        }
                                    }
                                    Some(Ok(Message::Close(_))) | None => {
                                        client_closes.fetch_add(1, Ordering::SeqCst);
                                        break;
                                    }
                                    Some(Ok(_)) => {}
                                    Some(Err(_)) => break,
                                },
                                cmd = command_rx.recv() => match cmd {
                                    Some(MockCommand::Send(event)) => {
                                        if write.send(Message::Text(event.to_string().into())).await.is_err() {
                                            break;
                                        }
                                    }
                                    Some(MockCommand::Close) | None => {
                                        let _ = write.send(Message::Close(None)).await;
                                        break;
                                    }
                                },
                            }
                        }
                    });
                }
            });
        }

        Self {
            url: format!("ws://{addr}/v1/realtime"),
            received,
            headers,
            connections,
            client_closes,
            commands,
        }
    }

    /// Send a server event to the connected client.
    pub fn send(&self, event: Value) {
        let _ = self.commands.send(MockCommand::Send(event));
    }

    /// Close the connection from the server side.
    pub fn close(&self) {
        let _ = self.commands.send(MockCommand::Close);
    }

    /// Event types received so far.
    pub fn received_types(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .filter_map(|e| e.get("type").and_then(|t| t.as_str()).map(str::to_string))
            .collect()
    }

    /// Decoded `audio` of every `input_audio_buffer.append` received.
    pub fn appended_audio(&self) -> Vec<Vec<u8>> {
        use base64::prelude::*;

        self.received
            .lock()
            .iter()
            .filter(|e| e["type"] == "input_audio_buffer.append")
            .filter_map(|e| e["audio"].as_str())
            .filter_map(|a| BASE64_STANDARD.decode(a).ok())
            .collect()
    }
}
