//! WebSocket connection and event loop.
//!
//! One [`Connection`] wraps one live socket. It spawns a tokio task that
//! owns both halves of the stream and handles:
//!
//! - Outgoing envelopes from [`Transport::send`](super::Transport::send)
//! - Incoming frames, routed to pending requests by correlation ID
//! - Draining every pending request with a rejection when the socket
//!   closes or errors
//!
//! The connection enforces no timeouts and no pending-request cap: a
//! request with no matching reply stays pending until the connection
//! closes. Callers wanting a deadline race the returned future against
//! their own timer.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::CorrelationId;
use crate::protocol::{Envelope, InboundFrame};

// ============================================================================
// Types
// ============================================================================

/// The client-side socket stream type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the socket, owned by the event loop.
type WsSink = SplitSink<WsStream, Message>;

/// Map of correlation IDs to settlement channels.
type PendingMap = FxHashMap<CorrelationId, oneshot::Sender<Result<Value>>>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Transmit an envelope and register its pending request.
    Send {
        envelope: Envelope,
        response_tx: oneshot::Sender<Result<Value>>,
    },
    /// Close the socket and stop the loop.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// A live WebSocket connection with request/response correlation.
///
/// Cheap to clone; clones share the same socket, event loop and pending
/// map. Owned exclusively by a [`Transport`](super::Transport), which
/// recreates it on demand after a loss.
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Pending requests (shared with event loop).
    pending: Arc<Mutex<PendingMap>>,
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl Connection {
    /// Opens a WebSocket connection to `uri` and spawns its event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the socket never reaches the open
    /// state (refused, DNS failure, handshake rejection).
    pub(crate) async fn open(uri: &str) -> Result<Self> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(uri)
            .await
            .map_err(|e| Error::connection(e.to_string()))?;

        debug!(uri, "WebSocket connection established");

        Ok(Self::new(ws_stream))
    }

    /// Creates a connection from an already-open stream.
    fn new(ws_stream: WsStream) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(PendingMap::default()));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&pending),
        ));

        Self {
            command_tx,
            pending,
        }
    }

    /// Sends `payload` under `id` and waits for the matching response.
    ///
    /// The returned future settles when a frame with the same correlation
    /// ID arrives, or rejects when the connection closes first. There is
    /// no timeout at this layer.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is already gone or
    ///   closes before the response arrives
    /// - [`Error::ChannelClosed`] if the event loop dropped the request
    ///   without settling it
    /// - [`Error::Json`] if the envelope fails to serialize
    pub async fn send(&self, id: CorrelationId, payload: Value) -> Result<Value> {
        let (response_tx, response_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Send {
                envelope: Envelope::new(id, payload),
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        Ok(response_rx.await??)
    }

    /// Returns `true` once the event loop has exited.
    ///
    /// A closed connection is dead weight; the owning transport replaces
    /// it on the next send.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Shuts the connection down gracefully.
    ///
    /// Pending requests are rejected by the event loop's exit path, so
    /// every outstanding future still settles exactly once.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that owns the socket.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        pending: Arc<Mutex<PendingMap>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::dispatch_frame(&text, &pending);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { envelope, response_tx }) => {
                            Self::handle_send_command(
                                envelope,
                                response_tx,
                                &mut ws_write,
                                &pending,
                            ).await;
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Reject all pending requests on the way out
        Self::fail_pending_requests(&pending);

        debug!("Event loop terminated");
    }

    /// Routes an incoming text frame to its pending request.
    fn dispatch_frame(text: &str, pending: &Arc<Mutex<PendingMap>>) {
        let frame = match from_str::<InboundFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to parse incoming frame");
                return;
            }
        };

        // Frames without an id are reserved for server push; ignored.
        let Some(id) = frame.id else {
            trace!("Ignoring frame without correlation id");
            return;
        };

        let tx = pending.lock().remove(&id);

        if let Some(tx) = tx {
            let _ = tx.send(Ok(frame.payload));
        } else {
            // Stale or duplicate response, benign. Dropped by design.
            trace!(%id, "Dropping response with no pending request");
        }
    }

    /// Transmits an envelope, registering its pending entry first.
    async fn handle_send_command(
        envelope: Envelope,
        response_tx: oneshot::Sender<Result<Value>>,
        ws_write: &mut WsSink,
        pending: &Arc<Mutex<PendingMap>>,
    ) {
        let id = envelope.id;

        let json = match to_string(&envelope) {
            Ok(j) => j,
            Err(e) => {
                let _ = response_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Register before sending so the response cannot race registration
        pending.lock().insert(id, response_tx);

        if let Err(e) = ws_write.send(Message::Text(json.into())).await
            && let Some(tx) = pending.lock().remove(&id)
        {
            let _ = tx.send(Err(Error::connection(e.to_string())));
        }

        trace!(%id, "Envelope sent");
    }

    /// Rejects every pending request with `ConnectionClosed`.
    fn fail_pending_requests(pending: &Arc<Mutex<PendingMap>>) {
        let drained: Vec<_> = pending.lock().drain().collect();
        let count = drained.len();

        for (_, tx) in drained {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Rejected pending requests on connection loss");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
