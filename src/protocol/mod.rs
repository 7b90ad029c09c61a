//! Wire protocol message types.
//!
//! Two nested layers share the wire, each with its own ID space:
//!
//! | Layer | Message | ID | Used for |
//! |-------|---------|----|----------|
//! | Transport | [`Envelope`] / [`InboundFrame`] | [`CorrelationId`] | Demultiplexing |
//! | RPC | [`RpcCall`] / [`RpcResponse`] | [`CallId`] | Tracing only |
//!
//! The transport treats the RPC layer as an opaque payload; the inner
//! JSON-RPC `id` is carried through but never consulted for correlation.
//!
//! [`CorrelationId`]: crate::identifiers::CorrelationId
//! [`CallId`]: crate::identifiers::CallId

// ============================================================================
// Submodules
// ============================================================================

/// Transport-level `{id, payload}` wrappers.
pub mod envelope;

/// JSON-RPC request/response payloads.
pub mod rpc;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{Envelope, InboundFrame};
pub use rpc::{JSONRPC_VERSION, JsonRpcRequest, RPC_METHOD, RpcCall, RpcResponse, ServerFault};
