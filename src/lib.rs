//! Multiplexed JSON-RPC client over a single persistent WebSocket.
//!
//! This library provides client-side request/response multiplexing over
//! one WebSocket connection, with JSON-RPC-style remote calls, correlation
//! IDs, lazy connection management, and a fallback switch to a legacy
//! transport.
//!
//! # Architecture
//!
//! Two components, leaf-first:
//!
//! - **[`Transport`]**: owns the single WebSocket connection, lazily
//!   establishes it, assigns strictly increasing correlation IDs, and
//!   routes inbound frames to the matching pending request. On connection
//!   loss, every pending request rejects and the next send reconnects.
//! - **[`Session`]**: wraps the transport with JSON-RPC envelopes,
//!   classifies failures into [`RpcError::Server`] vs
//!   [`RpcError::Communication`], emits lifecycle signals on an event
//!   bus, and routes to a [`FallbackTransport`] when WebSocket is
//!   disabled.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use websocket_rpc::{ClientConfig, RequestOptions, Session, Transport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ClientConfig::new());
//!     let transport = Arc::new(Transport::new("ws://127.0.0.1:8072", Arc::clone(&config))?);
//!     let session = Session::builder(transport, config).build();
//!
//!     let result = session
//!         .rpc("/web/ping", json!({}), RequestOptions::new())
//!         .await?;
//!     println!("pong: {result}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Runtime flags: feature flag, debug mode |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers for the two ID spaces |
//! | [`protocol`] | Wire message types (transport + JSON-RPC layers) |
//! | [`session`] | RPC session adapter, options, event bus |
//! | [`transport`] | WebSocket multiplexing transport |

// ============================================================================
// Modules
// ============================================================================

/// Runtime configuration flags.
///
/// Explicit shared state instead of ambient process globals.
pub mod config;

/// Error types and result aliases.
///
/// Transport-internal [`Error`] and caller-facing [`RpcError`].
pub mod error;

/// Type-safe identifiers.
///
/// [`CorrelationId`] (multiplexing) and [`CallId`] (tracing) never mix.
pub mod identifiers;

/// Wire protocol message types.
///
/// Envelope and JSON-RPC structures for both directions.
pub mod protocol;

/// RPC session layer.
///
/// JSON-RPC semantics, error classification, signals, fallback routing.
pub mod session;

/// WebSocket transport layer.
///
/// Lazy single-connection multiplexing with correlation IDs.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::ClientConfig;

// Error types
pub use error::{
    Error, Result, RpcError, SESSION_EXPIRED_CODE, SOCKET_ERROR_CODE, SOCKET_ERROR_MESSAGE,
};

// Identifier types
pub use identifiers::{CallId, CorrelationId};

// Protocol types
pub use protocol::{Envelope, InboundFrame, RpcCall, RpcResponse, ServerFault};

// Session types
pub use session::{
    DEBUG_HEADER, ErrorEvent, EventBus, FallbackTransport, RequestOptions, Session,
    SessionBuilder, SessionEvent, SessionGuard,
};

// Transport types
pub use transport::Transport;
