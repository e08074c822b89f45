//! CENNZnet JSON-RPC Client
//!
//! HTTP JSON-RPC client for the node endpoints the linking flow needs:
//!
//! - `ethWallet_addressNonce` - replay nonce of an Ethereum address
//! - `author_submitExtrinsic` - submit the unsigned `ethWallet.call` extrinsic
//! - `system_chain` - chain name, used as a connectivity probe
//!
//! The client is an explicit handle: construct one and share it with
//! `Arc` between the nonce tracker and the submitter.

use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::call::{Call, CallIndex};
use crate::error::{ChainQueryError, SubmissionError};
use crate::nonce::ChainQuery;
use crate::submit::{encode_eth_wallet_call, encode_unsigned_extrinsic, ChainSubmission};
use crate::types::{Nonce, Signature, SourceAddress, SubmissionHandle};

/// Default request timeout
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// Failure of a single JSON-RPC round trip
#[derive(Debug, Clone, PartialEq)]
enum RpcFailure {
    Transport(String),
    Malformed(String),
    Rpc { code: i64, message: String },
}

impl From<RpcFailure> for ChainQueryError {
    fn from(failure: RpcFailure) -> Self {
        match failure {
            RpcFailure::Transport(e) => ChainQueryError::Transport(e),
            RpcFailure::Malformed(e) => ChainQueryError::Malformed(e),
            RpcFailure::Rpc { code, message } => ChainQueryError::Rpc { code, message },
        }
    }
}

impl From<RpcFailure> for SubmissionError {
    fn from(failure: RpcFailure) -> Self {
        match failure {
            RpcFailure::Transport(e) => SubmissionError::Transport(e),
            RpcFailure::Malformed(e) => SubmissionError::Malformed(e),
            RpcFailure::Rpc { code, message } => SubmissionError::Rejected { code, message },
        }
    }
}

/// JSON-RPC client for a CENNZnet node
pub struct CennznetClient {
    /// Node HTTP RPC URL
    rpc_url: String,
    /// Dispatch index of `ethWallet.call`
    eth_wallet_call: CallIndex,
    /// HTTP client
    client: Client,
    next_id: AtomicU64,
}

impl CennznetClient {
    /// Create a new client
    pub fn new(rpc_url: &str, eth_wallet_call: CallIndex, timeout: Duration) -> Result<Self> {
        url::Url::parse(rpc_url).wrap_err_with(|| format!("Invalid RPC URL: {}", rpc_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to create HTTP client")?;

        Ok(Self {
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            eth_wallet_call,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, RpcFailure> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(method, id = request.id, rpc = %self.rpc_url, "JSON-RPC request");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcFailure::Transport(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RpcFailure::Transport(format!("{} response unreadable: {}", method, e)))?;
        let body = serde_json::from_str::<Value>(&text);

        // A JSON-RPC error object is the node's answer whatever the status
        if let Some(error) = body
            .as_ref()
            .ok()
            .and_then(|b| b.get("error"))
            .filter(|e| !e.is_null())
        {
            return Err(rpc_error(method, error));
        }

        if !status.is_success() {
            return Err(RpcFailure::Transport(format!(
                "{} failed with status {}",
                method, status
            )));
        }

        let body = body
            .map_err(|e| RpcFailure::Malformed(format!("{} returned invalid JSON: {}", method, e)))?;

        body.get("result")
            .cloned()
            .ok_or_else(|| RpcFailure::Malformed(format!("{} response has no result", method)))
    }

    /// Chain name reported by the node
    pub async fn chain_name(&self) -> std::result::Result<String, ChainQueryError> {
        let result = self.request("system_chain", json!([])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainQueryError::Malformed(format!("expected chain name, got {}", result)))
    }

    /// Check the node answers, logging its chain name
    pub async fn check_connection(&self) -> Result<String> {
        let name = self
            .chain_name()
            .await
            .map_err(|e| eyre!("Node at {} unreachable: {}", self.rpc_url, e))?;
        debug!(chain = %name, rpc = %self.rpc_url, "Connected to node");
        Ok(name)
    }
}

#[async_trait]
impl ChainQuery for CennznetClient {
    async fn query_nonce(
        &self,
        address: &SourceAddress,
    ) -> std::result::Result<Option<Nonce>, ChainQueryError> {
        let result = self
            .request("ethWallet_addressNonce", json!([address.to_hex()]))
            .await?;

        parse_nonce(&result)
    }
}

#[async_trait]
impl ChainSubmission for CennznetClient {
    async fn submit_signed_call(
        &self,
        call: &Call,
        address: &SourceAddress,
        signature: &Signature,
    ) -> std::result::Result<SubmissionHandle, SubmissionError> {
        let encoded = encode_eth_wallet_call(self.eth_wallet_call, call, address, signature);
        let extrinsic = encode_unsigned_extrinsic(&encoded);

        let result = self
            .request(
                "author_submitExtrinsic",
                json!([format!("0x{}", hex::encode(&extrinsic))]),
            )
            .await?;

        parse_tx_hash(&result)
    }
}

fn rpc_error(method: &str, error: &Value) -> RpcFailure {
    match (error["code"].as_i64(), error["message"].as_str()) {
        (Some(code), Some(message)) => RpcFailure::Rpc {
            code,
            message: message.to_string(),
        },
        _ => RpcFailure::Malformed(format!("{} returned invalid error object: {}", method, error)),
    }
}

fn parse_nonce(result: &Value) -> std::result::Result<Option<Nonce>, ChainQueryError> {
    if result.is_null() {
        return Ok(None);
    }

    result
        .as_u64()
        .and_then(|n| Nonce::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| ChainQueryError::Malformed(format!("expected u32 nonce, got {}", result)))
}

fn parse_tx_hash(result: &Value) -> std::result::Result<SubmissionHandle, SubmissionError> {
    let malformed = || SubmissionError::Malformed(format!("expected 32-byte hash, got {}", result));

    let hex_str = result.as_str().ok_or_else(malformed)?;
    let bytes = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str)).map_err(|_| malformed())?;
    let tx_hash: [u8; 32] = bytes.try_into().map_err(|_| malformed())?;

    Ok(SubmissionHandle { tx_hash })
}
