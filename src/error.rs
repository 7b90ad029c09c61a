//! Error types for the WebSocket RPC client.
//!
//! Two layers of errors exist, matching the two components of the crate:
//!
//! - [`Error`]: internal transport-level failures (socket, serialization,
//!   channel plumbing). Produced by [`crate::transport`].
//! - [`RpcError`]: the caller-facing taxonomy produced by
//!   [`crate::session`]: either the remote endpoint explicitly returned an
//!   error payload ([`RpcError::Server`]), or the transport never delivered
//!   a response ([`RpcError::Communication`]).
//!
//! The distinction matters to callers: a session-expiry sentinel
//! ([`SESSION_EXPIRED_CODE`]) is only meaningful inside a server error,
//! while communication errors always carry the fixed
//! [`SOCKET_ERROR_CODE`]/`"SocketError"` pair and are deliberately opaque
//! about the underlying cause (never-opened vs. closed-mid-flight vs.
//! malformed frame).

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error as ThisError;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::protocol::ServerFault;

// ============================================================================
// Constants
// ============================================================================

/// Fixed error code carried by every [`RpcError::Communication`].
pub const SOCKET_ERROR_CODE: i64 = -32098;

/// Fixed error message carried by every [`RpcError::Communication`].
pub const SOCKET_ERROR_MESSAGE: &str = "SocketError";

/// Server fault code signalling that the authenticated session expired.
pub const SESSION_EXPIRED_CODE: i64 = 100;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias for transport-level operations.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Transport Error
// ============================================================================

/// Transport-level error.
///
/// These never reach RPC callers directly; the session adapter folds every
/// variant into [`RpcError::Communication`].
#[derive(ThisError, Debug)]
pub enum Error {
    /// WebSocket connection could not be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection closed before a response arrived.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Target URI is not a valid WebSocket endpoint.
    #[error("Invalid WebSocket URI: {uri}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket protocol error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Settlement channel closed without a value.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Transport Error - Constructors
// ============================================================================

impl Error {
    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an invalid URI error.
    #[inline]
    pub fn invalid_uri(uri: impl Into<String>) -> Self {
        Self::InvalidUri { uri: uri.into() }
    }
}

// ============================================================================
// RpcError
// ============================================================================

/// Caller-facing RPC error taxonomy.
///
/// Produced by the session adapter when classifying the outcome of a call.
#[derive(ThisError, Debug, Clone)]
pub enum RpcError {
    /// The remote endpoint explicitly returned an error payload.
    #[error("Server error {}: {}", .0.code, .0.message)]
    Server(ServerFault),

    /// The transport never delivered a response.
    ///
    /// Always carries [`SOCKET_ERROR_CODE`] and [`SOCKET_ERROR_MESSAGE`];
    /// the underlying cause is intentionally not distinguished.
    #[error("Communication error {code}: {message}")]
    Communication {
        /// Fixed code, [`SOCKET_ERROR_CODE`].
        code: i64,
        /// Fixed message, [`SOCKET_ERROR_MESSAGE`].
        message: String,
    },
}

// ============================================================================
// RpcError - Constructors
// ============================================================================

impl RpcError {
    /// Creates a server error from a fault payload.
    #[inline]
    #[must_use]
    pub fn server(fault: ServerFault) -> Self {
        Self::Server(fault)
    }

    /// Creates the (fixed) communication error.
    #[inline]
    #[must_use]
    pub fn communication() -> Self {
        Self::Communication {
            code: SOCKET_ERROR_CODE,
            message: SOCKET_ERROR_MESSAGE.to_string(),
        }
    }
}

// ============================================================================
// RpcError - Predicates
// ============================================================================

impl RpcError {
    /// Returns `true` if the remote endpoint reported this error.
    #[inline]
    #[must_use]
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server(_))
    }

    /// Returns `true` if this is a transport-level failure.
    #[inline]
    #[must_use]
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Communication { .. })
    }

    /// Returns `true` if this is a server error carrying the
    /// session-expiry sentinel code.
    #[inline]
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Server(fault) if fault.code == SESSION_EXPIRED_CODE)
    }

    /// Returns the error code, regardless of kind.
    #[inline]
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            Self::Server(fault) => fault.code,
            Self::Communication { code, .. } => *code,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
