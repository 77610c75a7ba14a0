//! JSON-RPC channel to the on-device automation server.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uiautomator_core::error::ApiError;
use uiautomator_core::protocol::{method, RpcRequest, RpcResponse};
use uuid::Uuid;

/// Upper bound for the liveness probe; a hung server must read as "not alive".
const PING_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A connection to the automation server that issues remote calls.
pub trait RpcChannel: Send + Sync {
    /// Call `method` with positional `params` and return its result.
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ApiError>;

    /// Ask the server to shut itself down.
    fn shutdown(&self) -> Result<(), ApiError>;
}

/// Deserialize a call result into the type the caller expects.
pub fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::rpc(format!("Malformed reply to '{}': {}", method, e)))
}

/// [`RpcChannel::call`] followed by [`decode`].
pub fn call_as<T: DeserializeOwned>(
    channel: &dyn RpcChannel,
    method: &str,
    params: Vec<Value>,
) -> Result<T, ApiError> {
    decode(method, channel.call(method, params)?)
}

/// JSON-RPC 2.0 over HTTP to a forwarded local port.
pub struct HttpRpcChannel {
    client: reqwest::blocking::Client,
    rpc_url: String,
    stop_url: String,
}

impl HttpRpcChannel {
    pub fn new(local_port: u16) -> Result<Self, ApiError> {
        // Remote waits (waitForExists, clickAndWait, ...) run as long as the
        // caller asks, so only the ping carries a request timeout.
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None)
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rpc_url: format!("http://localhost:{}/jsonrpc/device", local_port),
            stop_url: format!("http://localhost:{}/stop", local_port),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn stop_url(&self) -> &str {
        &self.stop_url
    }
}

impl RpcChannel for HttpRpcChannel {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ApiError> {
        let request = RpcRequest::new(Uuid::new_v4().to_string(), method, params);
        debug!("RPC -> {} {:?}", request.method, request.params);

        let mut builder = self.client.post(&self.rpc_url).json(&request);
        if method == method::PING {
            builder = builder.timeout(PING_TIMEOUT);
        }

        let response = builder.send().map_err(|e| {
            ApiError::rpc(format!("Failed to reach automation server at {}: {}", self.rpc_url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::rpc(format!(
                "Automation server answered '{}' with HTTP {}",
                method, status
            )));
        }

        let reply: RpcResponse = response.json().map_err(|e| {
            ApiError::rpc(format!("Malformed JSON-RPC reply to '{}': {}", method, e))
        })?;
        debug!("RPC <- {} {:?}", method, reply.result);

        reply.into_result(method)
    }

    fn shutdown(&self) -> Result<(), ApiError> {
        debug!("GET {}", self.stop_url);
        self.client
            .get(&self.stop_url)
            .timeout(PING_TIMEOUT)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ApiError::rpc(format!("Stop request failed: {}", e)))?;
        Ok(())
    }
}
