//! JSON-RPC payload types.
//!
//! These ride inside the transport envelope's `payload` field.
//!
//! # Format
//!
//! Outbound:
//! ```json
//! {
//!   "path": "/web/dataset/call_kw",
//!   "rpc": { "jsonrpc": "2.0", "method": "call", "params": { ... }, "id": 48613 }
//! }
//! ```
//!
//! Inbound, either shape:
//! ```json
//! { "result": ... }
//! { "error": { "code": 100, "message": "Session expired", "data": ... } }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::CallId;

// ============================================================================
// Constants
// ============================================================================

/// JSON-RPC protocol version sent on every call.
pub const JSONRPC_VERSION: &str = "2.0";

/// The single JSON-RPC method this client issues.
pub const RPC_METHOD: &str = "call";

// ============================================================================
// RpcCall
// ============================================================================

/// An outbound RPC call payload.
#[derive(Debug, Clone, Serialize)]
pub struct RpcCall {
    /// Endpoint path the server routes the call to.
    pub path: String,

    /// JSON-RPC envelope.
    pub rpc: JsonRpcRequest,
}

impl RpcCall {
    /// Builds a call for `path` with a freshly generated random call ID.
    #[must_use]
    pub fn new(path: impl Into<String>, params: Value) -> Self {
        Self {
            path: path.into(),
            rpc: JsonRpcRequest {
                jsonrpc: JSONRPC_VERSION,
                method: RPC_METHOD,
                params,
                id: CallId::generate(),
            },
        }
    }
}

// ============================================================================
// JsonRpcRequest
// ============================================================================

/// The inner JSON-RPC 2.0 request object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: &'static str,

    /// Always [`RPC_METHOD`].
    pub method: &'static str,

    /// Call parameters, opaque to this client.
    pub params: Value,

    /// Random per-call ID; informational only, never used for correlation.
    pub id: CallId,
}

// ============================================================================
// RpcResponse
// ============================================================================

/// An inbound RPC response payload.
///
/// Exactly one of `result` / `error` is expected; an `error` field wins
/// when both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Successful result, if any.
    #[serde(default)]
    pub result: Option<Value>,

    /// Server-reported fault, if any.
    #[serde(default)]
    pub error: Option<ServerFault>,
}

impl RpcResponse {
    /// Extracts the result, treating a present `error` field as a fault.
    ///
    /// A success response without a `result` field yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns the [`ServerFault`] when the response carries one.
    pub fn into_result(self) -> Result<Value, ServerFault> {
        match self.error {
            Some(fault) => Err(fault),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ============================================================================
// ServerFault
// ============================================================================

/// An error object explicitly returned by the remote endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFault {
    /// Server-assigned error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,

    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_serialization() {
        let call = RpcCall::new("/web/dataset/call_kw", json!({"model": "res.users"}));
        let value = serde_json::to_value(&call).expect("serialize");

        assert_eq!(value["path"], "/web/dataset/call_kw");
        assert_eq!(value["rpc"]["jsonrpc"], "2.0");
        assert_eq!(value["rpc"]["method"], "call");
        assert_eq!(value["rpc"]["params"], json!({"model": "res.users"}));
        assert!(value["rpc"]["id"].is_u64());
    }

    #[test]
    fn test_response_result() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"result": {"records": []}}"#).expect("parse");

        let result = response.into_result().expect("should be success");
        assert_eq!(result, json!({"records": []}));
    }

    #[test]
    fn test_response_error() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"error": {"code": 100, "message": "Session expired"}}"#)
                .expect("parse");

        let fault = response.into_result().expect_err("should be fault");
        assert_eq!(fault.code, 100);
        assert_eq!(fault.message, "Session expired");
        assert_eq!(fault.data, None);
    }

    #[test]
    fn test_response_empty_is_null_result() {
        let response: RpcResponse = serde_json::from_str("{}").expect("parse");
        let result = response.into_result().expect("should be success");
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_fault_data_omitted_when_absent() {
        let fault = ServerFault {
            code: 200,
            message: "Validation failed".to_string(),
            data: None,
        };
        let value = serde_json::to_value(&fault).expect("serialize");
        assert_eq!(value, json!({"code": 200, "message": "Validation failed"}));
    }

    #[test]
    fn test_fault_data_roundtrip() {
        let json_str = r#"{"code": 200, "message": "boom", "data": {"debug": "trace"}}"#;
        let fault: ServerFault = serde_json::from_str(json_str).expect("parse");
        assert_eq!(fault.data, Some(json!({"debug": "trace"})));
    }
}
