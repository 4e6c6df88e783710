// crates/flash-harness/src/rpc.rs
// ============================================================================
// Module: Node JSON-RPC Client
// Description: Blocking JSON-RPC 2.0 client for the local forking node.
// Purpose: Typed access to the handful of methods the harness needs.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`RpcClient`] posts JSON-RPC 2.0 envelopes over HTTP with bounded
//! connect and request timeouts and a hard response size limit. Quantities
//! travel as `0x`-prefixed hex strings and are decoded at this boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use flash_harness_config::Address;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::fork::ForkPoint;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted JSON-RPC response size.
const MAX_RPC_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Connect timeout for the local node.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Delay between receipt polls.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// JSON-RPC failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The HTTP client could not be built.
    #[error("rpc client build failed: {0}")]
    Client(String),
    /// The request could not be delivered.
    #[error("rpc request failed: {0}")]
    Transport(String),
    /// The request or response timed out.
    #[error("rpc request timed out")]
    Timeout,
    /// The node answered with a non-success HTTP status.
    #[error("rpc http status {0}")]
    Status(u16),
    /// The response exceeded the size limit.
    #[error("rpc response too large")]
    TooLarge,
    /// The response was not a valid JSON-RPC envelope or result.
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
    /// The node returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Remote {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: u64,
    /// Remote method name.
    method: &'a str,
    /// Positional parameters.
    params: Value,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// Successful result payload.
    #[serde(default)]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// JSON-RPC error payload.
#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Parameters of `eth_sendTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    /// Sending account (must be unlocked on the node).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Recipient; absent for contract creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Call data or init code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Gas limit as a hex quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    /// Value in wei as a hex quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Subset of a mined or pending transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction hash.
    pub hash: String,
    /// Sender.
    pub from: Address,
    /// Recipient; absent for contract creation.
    #[serde(default)]
    pub to: Option<Address>,
    /// Call data.
    pub input: String,
    /// Gas limit as a hex quantity.
    pub gas: String,
    /// Value in wei as a hex quantity.
    pub value: String,
    /// Sender nonce as a hex quantity.
    pub nonce: String,
    /// Chain id as a hex quantity, when the transaction is replay-protected.
    #[serde(default)]
    pub chain_id: Option<String>,
}

/// Subset of a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Hash of the receipted transaction.
    pub transaction_hash: String,
    /// `0x1` on success, `0x0` on revert.
    #[serde(default)]
    pub status: Option<String>,
    /// Address of a created contract.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Gas consumed as a hex quantity.
    pub gas_used: String,
    /// Including block as a hex quantity.
    #[serde(default)]
    pub block_number: Option<String>,
}

impl Receipt {
    /// Returns true when the transaction executed without reverting.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status.as_deref().is_some_and(|status| parse_quantity(status).ok() == Some(1))
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking JSON-RPC client bound to one node endpoint.
#[derive(Debug)]
pub struct RpcClient {
    /// Endpoint URL.
    url: String,
    /// Shared HTTP client.
    client: Client,
    /// Next request id.
    next_id: AtomicU64,
}

impl RpcClient {
    /// Builds a client for `url` with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Client`] when the HTTP client cannot be built.
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|err| RpcError::Client(err.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Calls `method` and decodes its result.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] for transport failures, JSON-RPC error objects,
    /// or results that do not decode into `T`.
    pub fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let mut response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(|err| map_send_error(&err))?;
        if !response.status().is_success() {
            return Err(RpcError::Status(response.status().as_u16()));
        }
        let bytes = read_body(&mut response)?;
        let envelope: JsonRpcResponse = serde_json::from_slice(&bytes)
            .map_err(|err| RpcError::InvalidResponse(err.to_string()))?;
        if let Some(error) = envelope.error {
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            });
        }
        let result = envelope.result.unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|err| RpcError::InvalidResponse(format!("{method}: {err}")))
    }

    /// `eth_chainId`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    pub fn chain_id(&self) -> Result<u64, RpcError> {
        let raw: String = self.call("eth_chainId", json!([]))?;
        let id = parse_quantity(&raw)?;
        u64::try_from(id).map_err(|_| RpcError::InvalidResponse("chain id overflows u64".into()))
    }

    /// `eth_accounts`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    pub fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.call("eth_accounts", json!([]))
    }

    /// `eth_getBalance` at the latest block, in wei.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    pub fn balance(&self, account: &Address) -> Result<u128, RpcError> {
        let raw: String = self.call("eth_getBalance", json!([account, "latest"]))?;
        parse_quantity(&raw)
    }

    /// `eth_sendTransaction`; returns the transaction hash.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the node rejects the transaction.
    pub fn send_transaction(&self, request: &TransactionRequest) -> Result<String, RpcError> {
        self.call("eth_sendTransaction", json!([request]))
    }

    /// `eth_getTransactionByHash`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    pub fn transaction(&self, hash: &str) -> Result<Option<Transaction>, RpcError> {
        self.call("eth_getTransactionByHash", json!([hash]))
    }

    /// `eth_getTransactionReceipt`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    pub fn receipt(&self, hash: &str) -> Result<Option<Receipt>, RpcError> {
        self.call("eth_getTransactionReceipt", json!([hash]))
    }

    /// Polls for a receipt until it appears or `timeout` expires.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Timeout`] when no receipt appears in time.
    pub fn wait_for_receipt(&self, hash: &str, timeout: Duration) -> Result<Receipt, RpcError> {
        let start = Instant::now();
        loop {
            if let Some(receipt) = self.receipt(hash)? {
                return Ok(receipt);
            }
            if start.elapsed() > timeout {
                return Err(RpcError::Timeout);
            }
            thread::sleep(RECEIPT_POLL_INTERVAL);
        }
    }

    /// `hardhat_reset` onto a forked block.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the node refuses the reset.
    pub fn hardhat_reset(&self, point: &ForkPoint) -> Result<(), RpcError> {
        let accepted: bool = self.call("hardhat_reset", point.reset_params())?;
        if accepted {
            Ok(())
        } else {
            Err(RpcError::InvalidResponse("hardhat_reset returned false".to_string()))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a `0x`-prefixed hex quantity.
///
/// # Errors
///
/// Returns [`RpcError::InvalidResponse`] for malformed or oversized values.
pub fn parse_quantity(raw: &str) -> Result<u128, RpcError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("quantity `{raw}` lacks 0x prefix")))?;
    if digits.is_empty() {
        return Err(RpcError::InvalidResponse("empty quantity".to_string()));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|err| RpcError::InvalidResponse(format!("quantity `{raw}`: {err}")))
}

/// Reads the response body under [`MAX_RPC_RESPONSE_BYTES`].
fn read_body(response: &mut reqwest::blocking::Response) -> Result<Vec<u8>, RpcError> {
    let max_bytes = u64::try_from(MAX_RPC_RESPONSE_BYTES).unwrap_or(u64::MAX);
    if response.content_length().is_some_and(|length| length > max_bytes) {
        return Err(RpcError::TooLarge);
    }
    let mut limited = response.take(max_bytes.saturating_add(1));
    let mut buf = Vec::new();
    limited.read_to_end(&mut buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::TimedOut {
            RpcError::Timeout
        } else {
            RpcError::Transport(err.to_string())
        }
    })?;
    if buf.len() > MAX_RPC_RESPONSE_BYTES {
        return Err(RpcError::TooLarge);
    }
    Ok(buf)
}

/// Maps reqwest send errors to stable RPC errors.
fn map_send_error(error: &reqwest::Error) -> RpcError {
    if error.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::Transport(error.to_string())
    }
}
