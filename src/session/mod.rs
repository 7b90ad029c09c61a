//! RPC session layer.
//!
//! Sits on top of the [`transport`](crate::transport) module and gives
//! calls request/response shape: JSON-RPC envelopes, typed error
//! classification, per-call options, lifecycle signals, and the fallback
//! switch to a legacy transport.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `bus` | Event bus with one-shot error suppression |
//! | `options` | Per-call request options |
//! | `rpc` | The [`Session`] adapter and collaborator traits |

// ============================================================================
// Submodules
// ============================================================================

/// Session event bus.
pub mod bus;

/// Per-call request options.
pub mod options;

/// The session adapter.
pub mod rpc;

// ============================================================================
// Re-exports
// ============================================================================

pub use bus::{ErrorEvent, ErrorListener, EventBus, LifecycleListener, SessionEvent};
pub use options::{DEBUG_HEADER, RequestOptions};
pub use rpc::{FallbackTransport, Session, SessionBuilder, SessionGuard};
