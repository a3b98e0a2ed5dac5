//! JSON-RPC oracle reader
//!
//! Calls `latestAnswer()` through `eth_call` and decodes the `int256` answer.

use alloy_primitives::{hex, Address, Bytes, I256};
use alloy_sol_types::{sol, SolCall};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use feedcheck_core::{NetworkId, ReadError, ReadFailure, ReadResult};

use crate::reader::ValueReader;

sol! {
    function latestAnswer() external view returns (int256);
}

/// Endpoint settings for one network
#[derive(Debug, Clone)]
pub struct RpcReaderConfig {
    pub network: NetworkId,
    pub url: String,
    pub request_timeout: Duration,
}

impl RpcReaderConfig {
    pub fn new(network: impl Into<NetworkId>, url: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            url: url.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Bytes>,
    error: Option<serde_json::Value>,
}

/// `eth_call` based reader, one per network
pub struct JsonRpcReader {
    network: NetworkId,
    url: String,
    client: Client,
}

impl JsonRpcReader {
    pub fn new(config: RpcReaderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            network: config.network,
            url: config.url,
            client,
        })
    }

    fn fail(&self, address: Address, cause: ReadFailure) -> ReadError {
        ReadError::new(self.network.clone(), address, cause)
    }

    fn transport_failure(err: reqwest::Error) -> ReadFailure {
        if err.is_timeout() {
            ReadFailure::Timeout
        } else {
            ReadFailure::Transport(err.to_string())
        }
    }
}

/// `eth_call` payload for `latestAnswer()` on `address`
fn latest_answer_request(address: Address) -> serde_json::Value {
    let data = hex::encode_prefixed(latestAnswerCall {}.abi_encode());

    serde_json::json!({
        "jsonrpc": "2.0",
        "method": "eth_call",
        "params": [{
            "to": address.to_string(),
            "data": data
        }, "latest"],
        "id": 1
    })
}

/// Decode a raw JSON-RPC response body into the oracle answer
fn decode_answer(body: &str) -> Result<I256, ReadFailure> {
    let response: JsonRpcResponse =
        serde_json::from_str(body).map_err(|e| ReadFailure::Malformed(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(ReadFailure::Rpc(err.to_string()));
    }

    let result = response
        .result
        .ok_or_else(|| ReadFailure::Malformed("no result in RPC response".to_string()))?;

    // Calls to accounts without code succeed with empty return data
    if result.is_empty() {
        return Err(ReadFailure::NotAContract);
    }

    let decoded = latestAnswerCall::abi_decode_returns(&result, true)
        .map_err(|e| ReadFailure::Malformed(e.to_string()))?;

    Ok(decoded._0)
}

#[async_trait::async_trait]
impl ValueReader for JsonRpcReader {
    fn network(&self) -> &NetworkId {
        &self.network
    }

    async fn read_latest(&self, address: Address) -> ReadResult<I256> {
        debug!("Reading latestAnswer of {} on {}", address, self.network);

        let response = self
            .client
            .post(&self.url)
            .json(&latest_answer_request(address))
            .send()
            .await
            .map_err(|e| self.fail(address, Self::transport_failure(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.fail(address, ReadFailure::Transport(format!("HTTP {}", status))));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.fail(address, Self::transport_failure(e)))?;

        decode_answer(&body).map_err(|cause| self.fail(address, cause))
    }
}
