//! Type-safe identifiers for the two independent ID spaces.
//!
//! The wire protocol carries two unrelated integers that are easy to mix
//! up, so each gets a newtype:
//!
//! - [`CorrelationId`]: the transport-level multiplexing ID. Assigned by
//!   the transport, strictly increasing from 1, required on every outbound
//!   envelope and used to route inbound frames to their pending request.
//! - [`CallId`]: the JSON-RPC `id`. Freshly random per call, carried
//!   through for observability/tracing only, never consulted for
//!   correlation.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CorrelationId
// ============================================================================

/// Transport-level correlation ID.
///
/// Identifies which pending request an inbound envelope answers.
/// Serialized as a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(u64);

impl CorrelationId {
    /// Wraps a raw correlation ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CallId
// ============================================================================

/// Upper bound (exclusive) for generated JSON-RPC call IDs.
const CALL_ID_RANGE: u64 = 1_000_000_000;

/// JSON-RPC call ID.
///
/// A random integer in `[0, 10^9)`, generated per call. Purely
/// informational: the client never matches it against responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(u64);

impl CallId {
    /// Generates a fresh random call ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::rng().random_range(0..CALL_ID_RANGE))
    }

    /// Wraps a raw call ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
