//! WebSocket transport layer.
//!
//! Multiplexes independent request/response exchanges over one persistent
//! WebSocket connection, correlated by [`CorrelationId`].
//!
//! ```text
//! ┌──────────────┐                          ┌──────────────┐
//! │   Session    │        WebSocket         │    Server    │
//! │              │◄────────────────────────►│              │
//! │  Transport   │   {"id": n, "payload"}   │   RPC        │
//! │  → Connection│                          │   endpoint   │
//! └──────────────┘                          └──────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Transport::new` - No socket yet; connection is lazy
//! 2. First `Transport::send` - Opens the socket, spawns the event loop
//! 3. Further sends - Reuse the open connection, queued during handshake
//! 4. Loss - All pending requests reject; next send reconnects
//! 5. `Transport::destroy` - Closes the connection explicitly
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | Lazy connection ownership and correlation ID assignment |
//! | `connection` | WebSocket event loop and pending-request dispatch |
//!
//! [`CorrelationId`]: crate::identifiers::CorrelationId

// ============================================================================
// Submodules
// ============================================================================

/// Lazy single-connection transport.
pub mod client;

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::Transport;
pub use connection::Connection;
