//! Client configuration and runtime flags.
//!
//! The WebSocket feature flag and the debug flag live in an explicit
//! [`ClientConfig`] shared (via `Arc`) between the transport and the
//! session adapter rather than in ambient globals. Both flags are read
//! fresh on every call, never cached, so flipping one mid-session takes
//! effect on the next call.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// ClientConfig
// ============================================================================

/// Shared runtime configuration.
///
/// Both flags are externally togglable mid-session; toggling affects
/// subsequent calls only, never calls already in flight.
#[derive(Debug)]
pub struct ClientConfig {
    /// Whether the WebSocket transport may be attempted at all.
    websocket_enabled: AtomicBool,

    /// Whether the debug header is injected into outgoing metadata.
    debug: AtomicBool,
}

impl ClientConfig {
    /// Creates a config with the WebSocket transport enabled and debug off.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            websocket_enabled: AtomicBool::new(true),
            debug: AtomicBool::new(false),
        }
    }

    /// Returns whether the WebSocket transport is permitted.
    #[inline]
    #[must_use]
    pub fn websocket_enabled(&self) -> bool {
        self.websocket_enabled.load(Ordering::Relaxed)
    }

    /// Enables or disables the WebSocket transport.
    #[inline]
    pub fn set_websocket_enabled(&self, enabled: bool) {
        self.websocket_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Returns whether debug mode is on.
    #[inline]
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Enables or disables debug mode.
    #[inline]
    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
