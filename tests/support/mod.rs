// Scripted mock game server for driving the client over a real WebSocket.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::sink::SinkExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// One mock server per test; it accepts a single client connection on an
/// ephemeral port and lets the test script pushes and observe what the
/// client sent.
pub struct MockGameServer {
    endpoint: String,
    received: mpsc::UnboundedReceiver<serde_json::Value>,
    push_tx: mpsc::UnboundedSender<String>,
    close_tx: mpsc::UnboundedSender<()>,
    disconnected: mpsc::UnboundedReceiver<()>,
}

struct ServerState {
    received_tx: mpsc::UnboundedSender<serde_json::Value>,
    push_rx: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    close_rx: Arc<Mutex<mpsc::UnboundedReceiver<()>>>,
    disconnected_tx: mpsc::UnboundedSender<()>,
}

pub async fn start_mock_server() -> MockGameServer {
    let (received_tx, received) = mpsc::unbounded_channel();
    let (push_tx, push_rx) = mpsc::unbounded_channel();
    let (close_tx, close_rx) = mpsc::unbounded_channel();
    let (disconnected_tx, disconnected) = mpsc::unbounded_channel();

    let state = Arc::new(ServerState {
        received_tx,
        push_rx: Arc::new(Mutex::new(push_rx)),
        close_rx: Arc::new(Mutex::new(close_rx)),
        disconnected_tx,
    });

    let app = Router::new().route("/ws", get(ws_handler)).with_state(state);

    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockGameServer {
        endpoint: format!("ws://{addr}/ws"),
        received,
        push_tx,
        close_tx,
        disconnected,
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut push_rx = state.push_rx.lock().await;
    let mut close_rx = state.close_rx.lock().await;

    loop {
        tokio::select! {
            pushed = push_rx.recv() => {
                match pushed {
                    Some(txt) => {
                        if socket.send(Message::Text(txt.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            _ = close_rx.recv() => {
                let _ = socket.send(Message::Close(None)).await;
                let _ = socket.close().await;
                break;
            }

            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let value = serde_json::from_str(text.as_str())
                            .expect("client sent invalid JSON");
                        let _ = state.received_tx.send(value);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    let _ = state.disconnected_tx.send(());
}

impl MockGameServer {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Queue a raw server message for the connected client.
    pub fn push(&self, msg: serde_json::Value) {
        self.push_tx
            .send(msg.to_string())
            .expect("mock server task should be alive");
    }

    /// Ask the mock to close the WebSocket from the server side.
    pub fn close_client(&self) {
        self.close_tx
            .send(())
            .expect("mock server task should be alive");
    }

    /// Next message the client sent, parsed as JSON.
    pub async fn next_received(&mut self) -> serde_json::Value {
        tokio::time::timeout(Duration::from_secs(2), self.received.recv())
            .await
            .expect("timed out waiting for a client message")
            .expect("mock connection task ended")
    }

    /// Assert the client sends nothing for a short window.
    pub async fn assert_quiet(&mut self) {
        let outcome = tokio::time::timeout(Duration::from_millis(250), self.received.recv()).await;
        assert!(outcome.is_err(), "unexpected client message: {outcome:?}");
    }

    /// Wait until the client's socket is gone.
    pub async fn wait_disconnected(&mut self) {
        tokio::time::timeout(Duration::from_secs(2), self.disconnected.recv())
            .await
            .expect("timed out waiting for the client to disconnect")
            .expect("mock server task ended");
    }
}
