//! Transport-level envelope types.
//!
//! Every WebSocket text frame carries one JSON object of the shape
//! `{"id": <int>, "payload": <opaque>}`. Outbound and inbound directions
//! get separate types because their contracts differ: outbound envelopes
//! always carry an ID, inbound frames may omit it (reserved for future
//! server-push messages, currently ignored).

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::CorrelationId;

// ============================================================================
// Envelope
// ============================================================================

/// An outbound wire message.
///
/// # Format
///
/// ```json
/// { "id": 1, "payload": { ... } }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// Correlation ID, required on every outbound message.
    pub id: CorrelationId,

    /// Opaque payload, passed through untouched by the transport.
    pub payload: Value,
}

impl Envelope {
    /// Creates an envelope wrapping `payload` under `id`.
    #[inline]
    #[must_use]
    pub fn new(id: CorrelationId, payload: Value) -> Self {
        Self { id, payload }
    }
}

// ============================================================================
// InboundFrame
// ============================================================================

/// An inbound wire message.
///
/// Frames without an `id` are reserved for server push and dropped by the
/// dispatcher. The `payload` defaults to `null` when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    /// Correlation ID of the pending request this frame answers, if any.
    #[serde(default)]
    pub id: Option<CorrelationId>,

    /// Response payload, handed unmodified to the pending request.
    #[serde(default)]
    pub payload: Value,
}

// ============================================================================
// Tests
// ============================================================================
