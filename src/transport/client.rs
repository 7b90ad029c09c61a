//! Multiplexed transport over a single lazy WebSocket connection.
//!
//! [`Transport`] owns at most one live [`Connection`], opens it on demand
//! at the first `send`, and assigns every outgoing payload a strictly
//! increasing correlation ID. Reconnection is purely lazy: after a loss
//! the next `send` transparently opens a fresh socket; no background
//! retries, no retry of the failed request itself.

// ============================================================================
// Imports
// ============================================================================

use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, trace};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::identifiers::CorrelationId;

use super::Connection;

// ============================================================================
// ConnState
// ============================================================================

/// Connection lifecycle state.
///
/// `Connecting` holds the senders of every call that arrived while the
/// handshake was in flight; they are drained exactly once, on transition
/// to `Open` (resolved) or back to `Idle` (rejected). The attempt number
/// lets a finishing connector recognize whether the state still belongs
/// to it, since `destroy` may have reset the state and a later send may
/// have started a new attempt in the meantime.
enum ConnState {
    /// No connection, none being opened.
    Idle,
    /// A handshake is in flight; queued waiters share its outcome.
    Connecting {
        attempt: u64,
        waiters: Vec<oneshot::Sender<Result<Connection>>>,
    },
    /// A connection is (or was) live.
    Open(Connection),
}

// ============================================================================
// Transport
// ============================================================================

/// Client-side multiplexed request/response transport.
///
/// Concurrent `send` calls are fully independent: all calls issued during
/// a handshake queue against the same in-flight connection attempt, and a
/// response for one request never blocks or affects another.
///
/// # Example
///
/// ```ignore
/// let config = Arc::new(ClientConfig::new());
/// let transport = Transport::new("ws://127.0.0.1:8072", config)?;
///
/// let response = transport.send(json!({"path": "/web/ping"})).await?;
/// ```
pub struct Transport {
    /// Target WebSocket endpoint.
    uri: Url,

    /// Shared runtime flags.
    config: Arc<ClientConfig>,

    /// Next correlation ID. Starts at 1, never reset, not even across
    /// reconnects.
    next_id: AtomicU64,

    /// Next connection attempt number.
    next_attempt: AtomicU64,

    /// Current connection state. Shared with in-flight connect tasks.
    state: Arc<Mutex<ConnState>>,
}

impl Transport {
    /// Creates a transport targeting `uri`.
    ///
    /// No connection is opened until the first [`send`](Self::send).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] if `uri` is not a `ws://` or `wss://`
    /// URL.
    pub fn new(uri: &str, config: Arc<ClientConfig>) -> Result<Self> {
        let parsed = Url::parse(uri).map_err(|_| Error::invalid_uri(uri))?;

        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(Error::invalid_uri(uri));
        }

        Ok(Self {
            uri: parsed,
            config,
            next_id: AtomicU64::new(1),
            next_attempt: AtomicU64::new(0),
            state: Arc::new(Mutex::new(ConnState::Idle)),
        })
    }

    /// Returns the target endpoint.
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Returns whether this transport may be used at all.
    ///
    /// Reads the feature flag fresh on every call; pure query, no side
    /// effects.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.websocket_enabled()
    }

    /// Sends `payload` and waits for the correlated response payload.
    ///
    /// Assigns the next correlation ID, lazily opens a connection if none
    /// is live, and returns the `payload` field of the matching inbound
    /// frame, unmodified. All failure is reported through the returned
    /// future; nothing is thrown synchronously.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the socket cannot be opened
    /// - [`Error::ConnectionClosed`] if the connection fails or closes
    ///   before the response arrives
    pub async fn send(&self, payload: Value) -> Result<Value> {
        let id = CorrelationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(%id, "Assigned correlation id");

        let connection = self.acquire().await?;
        connection.send(id, payload).await
    }

    /// Closes the active connection and rejects handshake waiters.
    ///
    /// Pending requests on the closed connection settle through its close
    /// path, so none are left dangling. Calling this with no active
    /// connection is a no-op; the transport remains usable and the next
    /// `send` opens a fresh connection.
    pub fn destroy(&self) {
        let previous = {
            let mut state = self.state.lock();
            mem::replace(&mut *state, ConnState::Idle)
        };

        match previous {
            ConnState::Open(connection) => {
                debug!("Destroying active connection");
                connection.shutdown();
            }
            ConnState::Connecting { waiters, .. } => {
                debug!(count = waiters.len(), "Rejecting handshake waiters");
                for tx in waiters {
                    let _ = tx.send(Err(Error::ConnectionClosed));
                }
            }
            ConnState::Idle => {}
        }
    }

    /// Returns a live connection, opening one if necessary.
    ///
    /// Only one connection attempt is ever in flight. The handshake runs
    /// on its own spawned task, so every caller, including the one that
    /// started the attempt, waits as an ordinary waiter. A caller that
    /// gives up and drops its future therefore cannot strand the attempt;
    /// the connect task still finishes, updates the state and settles the
    /// remaining waiters.
    async fn acquire(&self) -> Result<Connection> {
        let rx = {
            let mut state = self.state.lock();
            match &mut *state {
                ConnState::Open(connection) if !connection.is_closed() => {
                    return Ok(connection.clone());
                }
                ConnState::Connecting { waiters, .. } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    rx
                }
                // Idle, or Open whose event loop already exited
                _ => {
                    let attempt = self.next_attempt.fetch_add(1, Ordering::Relaxed);
                    let (tx, rx) = oneshot::channel();
                    *state = ConnState::Connecting {
                        attempt,
                        waiters: vec![tx],
                    };
                    tokio::spawn(Self::connect_and_drain(
                        self.uri.to_string(),
                        Arc::clone(&self.state),
                        attempt,
                    ));
                    rx
                }
            }
        };

        rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Handshake driver, run on a task of its own.
    ///
    /// Drains waiters with the outcome and updates the state, but only
    /// for its own attempt: if `destroy` reset the state while the
    /// handshake was in flight, the fresh socket is discarded and any
    /// newer attempt is left untouched.
    async fn connect_and_drain(uri: String, state: Arc<Mutex<ConnState>>, attempt: u64) {
        let result = Connection::open(&uri).await;

        let waiters = {
            let mut state = state.lock();
            match mem::replace(&mut *state, ConnState::Idle) {
                ConnState::Connecting {
                    attempt: current,
                    waiters,
                } if current == attempt => {
                    if let Ok(connection) = &result {
                        *state = ConnState::Open(connection.clone());
                    }
                    waiters
                }
                other => {
                    *state = other;
                    if let Ok(connection) = result {
                        connection.shutdown();
                    }
                    return;
                }
            }
        };

        match result {
            Ok(connection) => {
                for tx in waiters {
                    let _ = tx.send(Ok(connection.clone()));
                }
            }
            Err(e) => {
                let message = e.to_string();
                for tx in waiters {
                    let _ = tx.send(Err(Error::connection(message.clone())));
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
