//! JSON-RPC 2.0 envelope.
//!
//! Request and response framing for the faucet endpoint: single-or-batch
//! body parsing, validity checks and the standard error codes. The
//! response shape mirrors the request shape, so callers sending a batch
//! (a JSON array, of any length) get an array back, and callers sending a
//! single object get a single object back.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes used by the faucet.
pub mod codes {
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const SERVER_ERROR: i32 = -32000;
}

/// Errors raised while decoding a request body.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid request body: {0}")]
    Malformed(String),
}

/// A single JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version; assumed 2.0 when the field is omitted.
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,

    /// Caller-chosen request id; 0 when absent or unparsable.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u64,

    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub params: Vec<Value>,

    /// Opaque metadata passed through untouched, for middleware use.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub meta: Value,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
            meta: Value::Null,
        }
    }

    /// A valid base request declares version 2.0 and a non-empty method.
    pub fn is_valid(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION && !self.method.is_empty()
    }
}

/// A single JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn new(id: u64, result: Option<Value>, error: Option<RpcError>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
            error,
        }
    }

    pub fn success(id: u64, result: Value) -> Self {
        Self::new(id, Some(result), None)
    }

    pub fn error(id: u64, error: RpcError) -> Self {
        Self::new(id, None, Some(error))
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Wraps an arbitrary failure as a `-32000` server error.
    pub fn server_error(err: impl std::fmt::Display) -> Self {
        Self::new(codes::SERVER_ERROR, err.to_string())
    }
}

/// Requests decoded from one HTTP body, remembering the input shape so
/// the response can mirror it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequests {
    pub requests: Vec<Request>,
    pub batch: bool,
}

/// Decodes a request body as either a batch (JSON array) or a single
/// request object. Anything else, including an empty body, is malformed.
pub fn parse_requests(body: &[u8]) -> Result<ParsedRequests, EnvelopeError> {
    if let Ok(requests) = serde_json::from_slice::<Vec<Request>>(body) {
        return Ok(ParsedRequests {
            requests,
            batch: true,
        });
    }

    match serde_json::from_slice::<Request>(body) {
        Ok(request) => Ok(ParsedRequests {
            requests: vec![request],
            batch: false,
        }),
        Err(err) => Err(EnvelopeError::Malformed(err.to_string())),
    }
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

/// Accepts numeric ids, numeric strings, or anything else as 0, so a
/// response can still echo something back on malformed input.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Value::deserialize(deserializer)?;

    Ok(match raw {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    })
}
