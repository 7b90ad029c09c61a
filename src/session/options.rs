//! Per-call request options.
//!
//! Ephemeral configuration attached to a single `rpc` invocation; never
//! persisted or shared between calls.

// ============================================================================
// Imports
// ============================================================================

use std::collections::HashMap;

// ============================================================================
// Constants
// ============================================================================

/// Header injected into outgoing metadata when the debug flag is set.
pub const DEBUG_HEADER: &str = "X-Debug-Mode";

// ============================================================================
// RequestOptions
// ============================================================================

/// Options for one RPC call.
///
/// # Example
///
/// ```ignore
/// use websocket_rpc::RequestOptions;
///
/// let options = RequestOptions::new()
///     .with_shadow()
///     .with_header("X-Trace-Id", "abc123");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Suppress request/response lifecycle signals for this call.
    ///
    /// The call still settles normally; only the event-bus notifications
    /// are skipped.
    pub shadow: bool,

    /// Headers merged into outgoing metadata.
    ///
    /// The WebSocket wire format does not carry them; they are consumed
    /// by the fallback transport and by observers.
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    /// Creates default options: not shadow, no headers.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this call as a shadow call.
    #[inline]
    #[must_use]
    pub fn with_shadow(mut self) -> Self {
        self.shadow = true;
        self
    }

    /// Adds a header to the outgoing metadata.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
