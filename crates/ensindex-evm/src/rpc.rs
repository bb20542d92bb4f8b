//! JSON-RPC 2.0 wire types and the HTTP transport.
//!
//! Requests are sent once: there is no retry, backoff, or circuit breaker.
//! The only bound on a stuck call is the client's request timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use ensindex_core::ExtractorError;

/// Default per-request timeout for `HttpRpcClient`.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Wire types ───────────────────────────────────────────────────────────────

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// A successful response carrying `result`.
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id: Value::from(id),
            result: Some(result),
            error: None,
        }
    }

    /// Unwrap the result value or return the node's error.
    ///
    /// A missing `result` is returned as `Value::Null`.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors from a single RPC round trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, timeout, non-2xx status, unreadable body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for ExtractorError {
    fn from(err: TransportError) -> Self {
        ExtractorError::Provider(err.to_string())
    }
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// The transport abstraction every RPC client goes through.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send a single JSON-RPC request and return the raw response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Allocate a request id.
    fn next_id(&self) -> u64;

    /// The endpoint this transport talks to.
    fn url(&self) -> &str;

    /// Call a method and deserialize the result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let req = JsonRpcRequest::new(self.next_id(), method, params);
        let resp = self.send(req).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}

/// HTTP JSON-RPC client backed by `reqwest`.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    ids: AtomicU64,
}

impl HttpRpcClient {
    /// Create a client for `url` with the given request timeout.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            ids: AtomicU64::new(1),
        })
    }

    /// Create with the default 30 s timeout.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        tracing::trace!(method = %req.method, id = req.id, "rpc request");

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<JsonRpcResponse>()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))
    }

    fn next_id(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::Relaxed)
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(1, "eth_getTransactionReceipt", vec![Value::from("0x01")]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"eth_getTransactionReceipt\""));
    }

    #[test]
    fn response_error_object() {
        let resp: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"header not found"}}"#,
        )
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, -32000);
    }

    #[test]
    fn null_result_is_null_value() {
        let resp: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert_eq!(resp.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn transport_error_maps_to_provider_error() {
        let err: ExtractorError = TransportError::Http("connection refused".into()).into();
        assert!(err.is_provider());
    }
}
