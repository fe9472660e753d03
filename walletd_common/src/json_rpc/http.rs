use log::{debug, trace};
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Value};

use crate::config::RpcConfig;
use super::{JsonRPCResult, JSON_RPC_VERSION};

/// Blocking JSON-RPC client for walletd.
///
/// walletd authenticates every request through a `password` field placed
/// next to `method` in the request body, not through HTTP headers.
pub struct JsonRPCClient {
    http: HttpClient,
    target: String,
    password: String,
    id: String,
}

impl JsonRPCClient {
    pub fn new(config: &RpcConfig) -> JsonRPCResult<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(JsonRPCClient {
            http,
            target: config.target(),
            password: config.password.clone(),
            id: config.request_id.clone(),
        })
    }

    pub fn get_target(&self) -> &str {
        &self.target
    }

    pub fn build_request(&self, method: &str, params: &Value) -> Value {
        json!({
            "jsonrpc": JSON_RPC_VERSION,
            "method": method,
            "password": self.password,
            "id": self.id,
            "params": params
        })
    }

    // Send the request and return the full response envelope without looking at it
    pub fn call_raw(&self, method: &str, params: &Value) -> JsonRPCResult<Value> {
        debug!("Sending {} to {}", method, self.target);
        let request = self.build_request(method, params);
        let response: Value = self.http.post(&self.target)
            .json(&request)
            .send()?
            .json()?;

        trace!("Response from walletd: {}", response);
        Ok(response)
    }
}
