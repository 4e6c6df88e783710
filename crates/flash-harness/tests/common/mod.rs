// crates/flash-harness/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Scriptable JSON-RPC node and fixture builders.
// Purpose: Exercise the harness without a forked mainnet node.
// Dependencies: flash-harness, serde_json, tiny_http
// ============================================================================

//! ## Overview
//! [`StubNode`] serves JSON-RPC over a local `tiny_http` server and answers
//! each call through a caller-supplied handler. Every call is recorded so
//! tests can assert on what the harness sent.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use flash_harness::RpcClient;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Stub Node
// ============================================================================

/// First account the stub node exposes.
pub const OWNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Address every stub deployment lands on.
pub const FLASH: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// Answer to one JSON-RPC call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `result` member.
    Result(Value),
    /// `error` member.
    Error {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },
    /// Bare HTTP status with a non-JSON body.
    Status(u16),
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Method name.
    pub method: String,
    /// Params member.
    pub params: Value,
}

/// Local JSON-RPC server driven by a handler closure.
pub struct StubNode {
    /// Endpoint URL.
    url: String,
    /// Calls in arrival order.
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// Shutdown flag.
    stop: Arc<AtomicBool>,
    /// Server thread.
    worker: Option<JoinHandle<()>>,
}

impl StubNode {
    /// Starts a node answering through `handler`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Reply + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let calls = Arc::clone(&calls);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let Ok(Some(mut request)) = server.recv_timeout(Duration::from_millis(20))
                    else {
                        continue;
                    };
                    let mut body = String::new();
                    request.as_reader().read_to_string(&mut body).unwrap();
                    let call: Value = serde_json::from_str(&body).unwrap();
                    let method = call["method"].as_str().unwrap_or_default().to_string();
                    let params = call["params"].clone();
                    calls.lock().unwrap().push(RecordedCall {
                        method: method.clone(),
                        params: params.clone(),
                    });
                    let envelope = match handler(&method, &params) {
                        Reply::Result(result) => {
                            json!({"jsonrpc": "2.0", "id": call["id"], "result": result})
                        }
                        Reply::Error {
                            code,
                            message,
                        } => json!({
                            "jsonrpc": "2.0",
                            "id": call["id"],
                            "error": {"code": code, "message": message}
                        }),
                        Reply::Status(status) => {
                            let response =
                                Response::from_string("unavailable").with_status_code(status);
                            let _ = request.respond(response);
                            continue;
                        }
                    };
                    let header =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                    let response = Response::from_string(envelope.to_string()).with_header(header);
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            url: format!("http://{addr}"),
            calls,
            stop,
            worker: Some(worker),
        }
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns a client for this node.
    pub fn client(&self) -> RpcClient {
        RpcClient::new(&self.url, Duration::from_secs(5)).unwrap()
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the recorded calls to `method`.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|call| call.method == method).collect()
    }

    /// Returns the recorded method names.
    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.method).collect()
    }
}

impl Drop for StubNode {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// A receipt for `hash` with the given status.
pub fn receipt(hash: &str, status: &str, contract: Option<&str>) -> Value {
    json!({
        "transactionHash": hash,
        "status": status,
        "contractAddress": contract,
        "gasUsed": "0x5208",
        "blockNumber": "0xd1a24b"
    })
}

/// Writes a minimal Hardhat artifact and returns its path.
pub fn write_artifact(dir: &Path) -> PathBuf {
    let path = dir.join("FlashLiquidator.json");
    fs::write(
        &path,
        json!({
            "contractName": "FlashLiquidator",
            "abi": [],
            "bytecode": "0x6080604052"
        })
        .to_string(),
    )
    .unwrap();
    path
}

/// A liquidator log line as the JSON formatter emits it.
pub fn log_line(level: &str, message: &str, fields: &[(&str, &str)]) -> String {
    let mut object = serde_json::Map::new();
    object.insert("level".to_string(), json!(level));
    object.insert("target".to_string(), json!("yield_liquidator::liquidations"));
    let mut field_map = serde_json::Map::new();
    field_map.insert("message".to_string(), json!(message));
    for (key, value) in fields {
        field_map.insert((*key).to_string(), json!(value));
    }
    object.insert("fields".to_string(), Value::Object(field_map));
    Value::Object(object).to_string()
}
