// Connection manager: one WebSocket connection per session activation.

use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::use_cases::ports::ServerChannel;
use crate::use_cases::types::{InboundEvent, OutboundIntent};

use async_trait::async_trait;
use futures::SinkExt;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Handle to the background IO task driving one WebSocket connection.
///
/// Opening performs a single establishment attempt; there is no retry and no
/// reconnection. Once the transport stops, the only recovery is a fresh
/// connection for a fresh session.
pub struct ServerConnection {
    outbound_tx: Option<mpsc::UnboundedSender<OutboundIntent>>,
    inbound_rx: mpsc::Receiver<InboundEvent>,
    io_task: Option<tokio::task::JoinHandle<()>>,
}

impl ServerConnection {
    /// Start connecting to `endpoint` and return immediately.
    ///
    /// Intents sent before the handshake completes queue until the transport
    /// is ready. If establishment fails, the inbound stream simply ends;
    /// nothing beyond "no longer connected" is surfaced.
    pub fn open(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<OutboundIntent>();
        let (inbound_tx, inbound_rx) = mpsc::channel::<InboundEvent>(EVENT_CHANNEL_CAPACITY);

        let io_task = tokio::spawn(io_loop(endpoint, outbound_rx, inbound_tx));

        Self {
            outbound_tx: Some(outbound_tx),
            inbound_rx,
            io_task: Some(io_task),
        }
    }
}

#[async_trait]
impl ServerChannel for ServerConnection {
    async fn send(&mut self, intent: OutboundIntent) {
        // Best-effort: a send after teardown is a no-op.
        if let Some(tx) = &self.outbound_tx {
            let _ = tx.send(intent);
        }
    }

    async fn recv(&mut self) -> Option<InboundEvent> {
        self.inbound_rx.recv().await
    }

    async fn close(&mut self) {
        // Dropping the outbound sender asks the IO loop to send a close
        // frame and exit; calling close again is a no-op.
        self.outbound_tx = None;
        if let Some(mut task) = self.io_task.take() {
            if tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err() {
                task.abort();
            }
        }
    }
}

impl Drop for ServerConnection {
    // Teardown must run exactly once even on abnormal exit paths.
    fn drop(&mut self) {
        if let Some(task) = self.io_task.take() {
            task.abort();
        }
    }
}

async fn io_loop(
    endpoint: String,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundIntent>,
    inbound_tx: mpsc::Sender<InboundEvent>,
) {
    // Single establishment attempt per activation.
    let (stream, _response) = match tokio_tungstenite::connect_async(endpoint.as_str()).await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(%endpoint, error = %e, "connection establishment failed");
            return;
        }
    };
    debug!(%endpoint, "connected");

    let (mut sink, mut stream) = stream.split();

    loop {
        tokio::select! {
            intent = outbound_rx.recv() => {
                match intent {
                    Some(intent) => {
                        let msg = ClientMessage::from(intent);
                        let txt = match serde_json::to_string(&msg) {
                            Ok(txt) => txt,
                            Err(e) => {
                                warn!(error = %e, "failed to serialize client message");
                                continue;
                            }
                        };
                        if let Err(e) = sink.send(Message::Text(txt.into())).await {
                            warn!(error = %e, "websocket send failed");
                            break;
                        }
                    }
                    None => {
                        // Owner closed; say goodbye and stop.
                        let _ = sink.send(Message::Close(None)).await;
                        let _ = sink.close().await;
                        break;
                    }
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => {
                                if inbound_tx.send(InboundEvent::from(msg)).await.is_err() {
                                    // Session ended first; nothing left to deliver to.
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "failed to parse server message");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("server closed the connection");
                        break;
                    }
                    Some(Ok(other)) => {
                        debug!(?other, "ignoring unexpected frame");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket receive error");
                        break;
                    }
                }
            }
        }
    }
}
