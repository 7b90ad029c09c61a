//! Shared helpers for integration tests.
//!
//! Spins up scripted in-process WebSocket servers that play the remote
//! RPC endpoint, so the transport and session are exercised over real
//! sockets.

use std::future::Future;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

/// Server-side socket handed to test handlers.
pub type ServerSocket = WebSocketStream<TcpStream>;

/// Installs the env-filtered log subscriber; later calls are no-ops.
///
/// Run tests with `RUST_LOG=websocket_rpc=trace` to see the client's
/// side of each exchange.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Spawns a WebSocket server running `handler` for every accepted
/// connection. Returns the `ws://` URL to connect to.
pub async fn spawn_server<F, Fut>(handler: F) -> String
where
    F: Fn(ServerSocket) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("websocket upgrade");
            let handler = Arc::clone(&handler);
            tokio::spawn(async move { handler(ws).await });
        }
    });

    format!("ws://{addr}")
}

/// Reads the next text frame and parses it as JSON.
///
/// Panics if the connection ends first.
pub async fn read_frame(ws: &mut ServerSocket) -> Value {
    loop {
        let message = ws
            .next()
            .await
            .expect("connection ended before a frame arrived")
            .expect("read frame");

        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("frame is JSON");
        }
    }
}

/// Sends `{"id": id, "payload": payload}` back to the client.
pub async fn reply(ws: &mut ServerSocket, id: &Value, payload: Value) {
    let frame = json!({"id": id, "payload": payload});
    ws.send(Message::text(frame.to_string()))
        .await
        .expect("send reply");
}

/// Sends an arbitrary JSON frame back to the client.
#[allow(dead_code)]
pub async fn send_raw(ws: &mut ServerSocket, frame: Value) {
    ws.send(Message::text(frame.to_string()))
        .await
        .expect("send raw frame");
}
