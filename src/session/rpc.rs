//! RPC session adapter.
//!
//! Wraps the multiplexed [`Transport`] with JSON-RPC envelope semantics,
//! classifies failures into the caller-facing [`RpcError`] taxonomy, and
//! emits lifecycle signals on the session [`EventBus`].
//!
//! The adapter also owns the fallback switch: the top-level
//! [`Session::rpc`] checks [`Transport::is_enabled`] fresh on every call
//! and routes to the configured [`FallbackTransport`] when the WebSocket
//! path is unavailable or disabled, so flipping the feature flag
//! mid-session changes routing for subsequent calls only.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{RpcError, SESSION_EXPIRED_CODE};
use crate::protocol::{RpcCall, RpcResponse};
use crate::transport::Transport;

use super::bus::{ErrorEvent, EventBus, SessionEvent};
use super::options::{DEBUG_HEADER, RequestOptions};

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Session-identifier refresh precondition.
///
/// Invoked before every WebSocket-path call; the call proceeds only once
/// the returned future resolves.
#[async_trait]
pub trait SessionGuard: Send + Sync {
    /// Ensures the session identifier is current.
    ///
    /// # Errors
    ///
    /// A rejection aborts the call before anything is sent or signalled.
    async fn ensure_session(&self) -> Result<(), RpcError>;
}

/// Legacy non-WebSocket transport used when the WebSocket path is
/// unavailable or disabled.
#[async_trait]
pub trait FallbackTransport: Send + Sync {
    /// Performs the call over the fallback transport.
    async fn rpc(
        &self,
        path: &str,
        params: Value,
        options: RequestOptions,
    ) -> Result<Value, RpcError>;
}

// ============================================================================
// Session
// ============================================================================

/// RPC session over a multiplexed WebSocket transport.
///
/// # Example
///
/// ```ignore
/// let config = Arc::new(ClientConfig::new());
/// let transport = Arc::new(Transport::new("ws://127.0.0.1:8072", Arc::clone(&config))?);
/// let session = Session::builder(transport, config).build();
///
/// let records = session
///     .rpc("/web/dataset/search_read", params, RequestOptions::new())
///     .await?;
/// ```
pub struct Session {
    /// The multiplexed WebSocket transport.
    transport: Arc<Transport>,

    /// Shared runtime flags (debug header injection).
    config: Arc<ClientConfig>,

    /// Lifecycle/error signal bus.
    bus: Arc<EventBus>,

    /// Session-refresh precondition, if any.
    guard: Option<Arc<dyn SessionGuard>>,

    /// Legacy transport for when WebSocket is disabled.
    fallback: Option<Arc<dyn FallbackTransport>>,

    /// Cached authenticated-user identifier; cleared on session expiry.
    uid: Mutex<Option<u64>>,
}

impl Session {
    /// Starts building a session around `transport`.
    #[must_use]
    pub fn builder(transport: Arc<Transport>, config: Arc<ClientConfig>) -> SessionBuilder {
        SessionBuilder {
            transport,
            config,
            bus: None,
            guard: None,
            fallback: None,
        }
    }

    /// Returns the session's event bus.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Returns the cached authenticated-user identifier, if any.
    #[inline]
    #[must_use]
    pub fn uid(&self) -> Option<u64> {
        *self.uid.lock()
    }

    /// Caches the authenticated-user identifier.
    #[inline]
    pub fn set_uid(&self, uid: u64) {
        *self.uid.lock() = Some(uid);
    }

    /// Clears the cached authenticated-user identifier.
    #[inline]
    pub fn clear_uid(&self) {
        *self.uid.lock() = None;
    }

    /// Performs one RPC call, routing by the transport feature flag.
    ///
    /// The flag is evaluated fresh on every invocation. When it is off,
    /// the call goes to the fallback transport and the WebSocket path is
    /// never touched.
    ///
    /// # Errors
    ///
    /// - [`RpcError::Server`] when the remote endpoint returns an error
    /// - [`RpcError::Communication`] for any transport-level failure, or
    ///   when WebSocket is disabled and no fallback is configured
    pub async fn rpc(
        &self,
        path: &str,
        params: Value,
        options: RequestOptions,
    ) -> Result<Value, RpcError> {
        if !self.transport.is_enabled() {
            debug!(path, "WebSocket transport disabled, routing to fallback");
            let options = self.finalize_options(options);
            return match &self.fallback {
                Some(fallback) => fallback.rpc(path, params, options).await,
                None => {
                    warn!(path, "No fallback transport configured");
                    Err(RpcError::communication())
                }
            };
        }

        self.ws_rpc(path, params, options).await
    }

    /// Builds and sends one JSON-RPC call over the transport, without
    /// lifecycle signalling.
    ///
    /// # Errors
    ///
    /// - [`RpcError::Server`] when the response carries an `error` field
    /// - [`RpcError::Communication`] when the transport fails or the
    ///   response payload is not an RPC response
    pub async fn call(&self, path: &str, params: Value) -> Result<Value, RpcError> {
        let call = RpcCall::new(path, params);
        let payload = serde_json::to_value(&call).map_err(|_| RpcError::communication())?;

        let raw = self.transport.send(payload).await.map_err(|e| {
            debug!(path, error = %e, "Transport failure");
            RpcError::communication()
        })?;

        let response: RpcResponse =
            serde_json::from_value(raw).map_err(|_| RpcError::communication())?;

        response.into_result().map_err(RpcError::server)
    }

    /// The WebSocket-path call with full sequencing.
    async fn ws_rpc(
        &self,
        path: &str,
        params: Value,
        options: RequestOptions,
    ) -> Result<Value, RpcError> {
        if let Some(guard) = &self.guard {
            guard.ensure_session().await?;
        }

        let options = self.finalize_options(options);
        let shadow = options.shadow;

        if !shadow {
            self.bus.emit(SessionEvent::RequestStarted);
        }

        let outcome = self.call(path, params).await;

        match &outcome {
            Ok(_) => {
                if !shadow {
                    self.bus.emit(SessionEvent::ResponseReceived);
                }
            }
            Err(error @ RpcError::Server(fault)) => {
                // A server error is still a delivered response
                if !shadow {
                    self.bus.emit(SessionEvent::ResponseReceived);
                }

                if fault.code == SESSION_EXPIRED_CODE {
                    debug!("Session expired, clearing cached uid");
                    self.clear_uid();
                }

                self.bus.emit_error(&ErrorEvent::new(error.clone()));
            }
            Err(error @ RpcError::Communication { .. }) => {
                if !shadow {
                    self.bus.emit(SessionEvent::ResponseFailed);
                }

                self.bus.emit_error(&ErrorEvent::new(error.clone()));
            }
        }

        outcome
    }

    /// Merges the debug header into the outgoing metadata when enabled.
    fn finalize_options(&self, mut options: RequestOptions) -> RequestOptions {
        if self.config.debug() {
            options
                .headers
                .insert(DEBUG_HEADER.to_string(), "1".to_string());
        }
        options
    }
}

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for [`Session`].
pub struct SessionBuilder {
    transport: Arc<Transport>,
    config: Arc<ClientConfig>,
    bus: Option<Arc<EventBus>>,
    guard: Option<Arc<dyn SessionGuard>>,
    fallback: Option<Arc<dyn FallbackTransport>>,
}

impl SessionBuilder {
    /// Uses an existing event bus instead of a fresh one.
    #[must_use]
    pub fn bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Installs the session-refresh precondition.
    #[must_use]
    pub fn guard(mut self, guard: Arc<dyn SessionGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Installs the legacy fallback transport.
    #[must_use]
    pub fn fallback(mut self, fallback: Arc<dyn FallbackTransport>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Builds the session.
    #[must_use]
    pub fn build(self) -> Session {
        Session {
            transport: self.transport,
            config: self.config,
            bus: self.bus.unwrap_or_default(),
            guard: self.guard,
            fallback: self.fallback,
            uid: Mutex::new(None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct RecordingFallback {
        calls: Mutex<Vec<(String, Value, RequestOptions)>>,
    }

    impl RecordingFallback {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl FallbackTransport for RecordingFallback {
        async fn rpc(
            &self,
            path: &str,
            params: Value,
            options: RequestOptions,
        ) -> Result<Value, RpcError> {
            self.calls
                .lock()
                .push((path.to_string(), params, options));
            Ok(json!("fallback"))
        }
    }

    fn session_parts() -> (Arc<Transport>, Arc<ClientConfig>) {
        let config = Arc::new(ClientConfig::new());
        let transport = Arc::new(
            Transport::new("ws://127.0.0.1:9", Arc::clone(&config)).expect("valid uri"),
        );
        (transport, config)
    }

    #[test]
    fn test_uid_cache() {
        let (transport, config) = session_parts();
        let session = Session::builder(transport, config).build();

        assert_eq!(session.uid(), None);
        session.set_uid(7);
        assert_eq!(session.uid(), Some(7));
        session.clear_uid();
        assert_eq!(session.uid(), None);
    }

    #[tokio::test]
    async fn test_disabled_flag_routes_to_fallback() {
        let (transport, config) = session_parts();
        let fallback = RecordingFallback::new();
        let session = Session::builder(transport, Arc::clone(&config))
            .fallback(Arc::clone(&fallback) as Arc<dyn FallbackTransport>)
            .build();

        config.set_websocket_enabled(false);

        let result = session
            .rpc("/web/ping", json!({"a": 1}), RequestOptions::new())
            .await
            .expect("fallback should answer");

        assert_eq!(result, json!("fallback"));

        let calls = fallback.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/web/ping");
        assert_eq!(calls[0].1, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_disabled_flag_without_fallback_is_communication_error() {
        let (transport, config) = session_parts();
        let session = Session::builder(transport, Arc::clone(&config)).build();

        config.set_websocket_enabled(false);

        let err = session
            .rpc("/web/ping", json!({}), RequestOptions::new())
            .await
            .expect_err("no fallback configured");

        assert!(err.is_communication());
    }

    #[tokio::test]
    async fn test_debug_header_reaches_fallback() {
        let (transport, config) = session_parts();
        let fallback = RecordingFallback::new();
        let session = Session::builder(transport, Arc::clone(&config))
            .fallback(Arc::clone(&fallback) as Arc<dyn FallbackTransport>)
            .build();

        config.set_websocket_enabled(false);
        config.set_debug(true);

        session
            .rpc("/web/ping", json!({}), RequestOptions::new())
            .await
            .expect("fallback should answer");

        let calls = fallback.calls.lock();
        assert_eq!(
            calls[0].2.headers.get(DEBUG_HEADER).map(String::as_str),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_no_debug_header_when_flag_off() {
        let (transport, config) = session_parts();
        let fallback = RecordingFallback::new();
        let session = Session::builder(transport, Arc::clone(&config))
            .fallback(Arc::clone(&fallback) as Arc<dyn FallbackTransport>)
            .build();

        config.set_websocket_enabled(false);

        session
            .rpc("/web/ping", json!({}), RequestOptions::new())
            .await
            .expect("fallback should answer");

        let calls = fallback.calls.lock();
        assert!(!calls[0].2.headers.contains_key(DEBUG_HEADER));
    }
}
