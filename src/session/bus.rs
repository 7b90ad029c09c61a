//! Session event bus.
//!
//! Fire-and-forget observability signals emitted around each RPC call.
//! These notifications are not part of the RPC contract: callers always
//! get their own settlement regardless of what listeners do.
//!
//! Error broadcasts support one-shot suppression: listeners run in
//! registration order and each is invoked only while the event's
//! `default_prevented` flag is clear, so an earlier (caller-registered)
//! listener that handles the error can stop the generic handlers behind
//! it from firing a duplicate notification.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::RpcError;

// ============================================================================
// SessionEvent
// ============================================================================

/// Lifecycle signal emitted around an RPC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A non-shadow call is about to be issued.
    RequestStarted,
    /// A response arrived (success, or an explicit server error).
    ResponseReceived,
    /// The transport failed to deliver a response.
    ResponseFailed,
}

// ============================================================================
// ErrorEvent
// ============================================================================

/// An error broadcast with one-shot suppression.
#[derive(Debug)]
pub struct ErrorEvent {
    /// The classified error being broadcast.
    error: RpcError,
    /// Set by a listener to stop propagation to later listeners.
    prevented: AtomicBool,
}

impl ErrorEvent {
    /// Creates an unprevented event carrying `error`.
    #[inline]
    #[must_use]
    pub fn new(error: RpcError) -> Self {
        Self {
            error,
            prevented: AtomicBool::new(false),
        }
    }

    /// Returns the error being broadcast.
    #[inline]
    #[must_use]
    pub fn error(&self) -> &RpcError {
        &self.error
    }

    /// Marks the error as handled; later listeners will not see it.
    #[inline]
    pub fn prevent_default(&self) {
        self.prevented.store(true, Ordering::Relaxed);
    }

    /// Returns whether a listener already handled this error.
    #[inline]
    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.prevented.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Types
// ============================================================================

/// Lifecycle listener callback.
pub type LifecycleListener = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Error listener callback.
pub type ErrorListener = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

// ============================================================================
// EventBus
// ============================================================================

/// Observer registry for session signals.
///
/// Listeners are invoked synchronously on the emitting task, in
/// registration order. Emission works on a snapshot of the registry, so
/// a listener may itself register listeners; additions made during an
/// emit are first seen by the next emit.
#[derive(Default)]
pub struct EventBus {
    lifecycle: Mutex<Vec<LifecycleListener>>,
    errors: Mutex<Vec<ErrorListener>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lifecycle listener.
    pub fn on_lifecycle(&self, listener: impl Fn(SessionEvent) + Send + Sync + 'static) {
        self.lifecycle.lock().push(Arc::new(listener));
    }

    /// Registers an error listener.
    ///
    /// Registration order matters: a listener that calls
    /// [`ErrorEvent::prevent_default`] suppresses every listener
    /// registered after it for that event.
    pub fn on_error(&self, listener: impl Fn(&ErrorEvent) + Send + Sync + 'static) {
        self.errors.lock().push(Arc::new(listener));
    }

    /// Broadcasts a lifecycle signal to all listeners.
    pub fn emit(&self, event: SessionEvent) {
        // Snapshot first; listeners run outside the registry lock
        let listeners: Vec<LifecycleListener> =
            self.lifecycle.lock().iter().map(Arc::clone).collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Broadcasts an error event, honoring one-shot suppression.
    pub fn emit_error(&self, event: &ErrorEvent) {
        // Snapshot first; listeners run outside the registry lock
        let listeners: Vec<ErrorListener> = self.errors.lock().iter().map(Arc::clone).collect();

        for listener in listeners {
            if event.is_default_prevented() {
                break;
            }
            listener(event);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
