// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC 2.0 message model.
//!
//! The three shapes are distinguished structurally: a request carries both
//! `id` and `method`, a notification carries `method` without `id`, and a
//! response carries `id` with either `result` or `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request id space exhausted by handler dispatch: unknown method.
pub const ERROR_UNKNOWN_METHOD: i64 = -32601;
/// Internal transport/serialization failure.
pub const ERROR_INTERNAL: i64 = -32603;
/// Handler returned an error; `data.stack` carries detail when available.
pub const ERROR_HANDLER: i64 = -32000;

/// Error member of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn unknown_method(method: &str) -> Self {
        Self {
            code: ERROR_UNKNOWN_METHOD,
            message: format!("Unknown method: {method}"),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { code: ERROR_INTERNAL, message: message.into(), data: None }
    }

    /// Handler failure with an optional stack-like detail string in `data`.
    pub fn handler(message: impl Into<String>, stack: Option<String>) -> Self {
        Self {
            code: ERROR_HANDLER,
            message: message.into(),
            data: stack.map(|s| serde_json::json!({ "stack": s })),
        }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

/// A single wire message, either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcMessage {
    /// Carries an `id`; the peer must answer with a matching response.
    Request { id: String, method: String, params: Value },
    /// Answer to a request. Exactly one of `result`/`error` is present.
    Response { id: String, result: Result<Value, RpcError> },
    /// Fire-and-forget; handlers must not attempt to respond.
    Notification { method: String, params: Value },
}

impl RpcMessage {
    /// Convert to the JSON-RPC 2.0 object shape.
    pub fn to_value(&self) -> Value {
        match self {
            RpcMessage::Request { id, method, params } => serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }),
            RpcMessage::Response { id, result } => match result {
                Ok(value) => serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": value,
                }),
                Err(error) => serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": error,
                }),
            },
            RpcMessage::Notification { method, params } => serde_json::json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
            }),
        }
    }

    /// Parse from a JSON-RPC 2.0 object. Returns `None` when the object is
    /// structurally not a JSON-RPC message (missing both `method` and `id`).
    pub fn from_value(value: Value) -> Option<RpcMessage> {
        let obj = value.as_object()?;
        let id = obj.get("id").and_then(|v| v.as_str()).map(|s| s.to_string());
        let method = obj.get("method").and_then(|v| v.as_str()).map(|s| s.to_string());

        match (id, method) {
            (Some(id), Some(method)) => {
                let params = obj.get("params").cloned().unwrap_or(Value::Null);
                Some(RpcMessage::Request { id, method, params })
            }
            (None, Some(method)) => {
                let params = obj.get("params").cloned().unwrap_or(Value::Null);
                Some(RpcMessage::Notification { method, params })
            }
            (Some(id), None) => {
                let result = match obj.get("error") {
                    Some(err) => Err(serde_json::from_value(err.clone()).ok()?),
                    None => Ok(obj.get("result").cloned().unwrap_or(Value::Null)),
                };
                Some(RpcMessage::Response { id, result })
            }
            (None, None) => None,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
