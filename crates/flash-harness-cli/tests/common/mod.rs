// crates/flash-harness-cli/tests/common/mod.rs
// ============================================================================
// Module: CLI Test Chain
// Description: Local JSON-RPC stub chain for `flash-harness run` tests.
// Purpose: Drive fork, deploy, and replay calls without a forked node.
// Dependencies: serde_json, tiny_http
// ============================================================================

//! ## Overview
//! [`StubChain`] answers the calls a regression run makes: chain id, reset,
//! accounts, balances, deployment, transaction lookup, and receipts. Every
//! deployment lands at [`FLASH`], and replayed transactions get the receipt
//! status the test asks for.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based setup."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// First account the stub exposes.
pub const OWNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
/// Address every stub deployment lands on.
pub const FLASH: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
/// Balance before a run: 10 ETH.
const BALANCE_BEFORE: &str = "0x8ac7230489e80000";
/// Balance after a run: 0.0025 ETH less.
const BALANCE_AFTER: &str = "0x8abe4147edf7c000";

/// Behavior of the stub chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainBehavior {
    /// Answer to `eth_chainId`.
    pub chain_id: &'static str,
    /// Receipt status of replayed transactions.
    pub replay_status: &'static str,
}

impl Default for ChainBehavior {
    fn default() -> Self {
        Self {
            chain_id: "0x7a69",
            replay_status: "0x1",
        }
    }
}

/// Local JSON-RPC chain served over `tiny_http`.
pub struct StubChain {
    /// Endpoint URL.
    url: String,
    /// Method names in arrival order.
    methods: Arc<Mutex<Vec<String>>>,
    /// Shutdown flag.
    stop: Arc<AtomicBool>,
    /// Server thread.
    worker: Option<JoinHandle<()>>,
}

impl StubChain {
    /// Starts a chain with `behavior`.
    pub fn start(behavior: ChainBehavior) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let methods = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let methods = Arc::clone(&methods);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let balances = AtomicUsize::new(0);
                let deployments = AtomicUsize::new(0);
                let replays = AtomicUsize::new(0);
                while !stop.load(Ordering::SeqCst) {
                    let Ok(Some(mut request)) = server.recv_timeout(Duration::from_millis(20))
                    else {
                        continue;
                    };
                    let mut body = String::new();
                    request.as_reader().read_to_string(&mut body).unwrap();
                    let call: Value = serde_json::from_str(&body).unwrap();
                    let method = call["method"].as_str().unwrap_or_default().to_string();
                    methods.lock().unwrap().push(method.clone());
                    let params = &call["params"];
                    let result = match method.as_str() {
                        "eth_chainId" => json!(behavior.chain_id),
                        "hardhat_reset" => json!(true),
                        "eth_accounts" => json!([OWNER]),
                        "eth_getBalance" => {
                            if balances.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                                json!(BALANCE_BEFORE)
                            } else {
                                json!(BALANCE_AFTER)
                            }
                        }
                        "eth_sendTransaction" => {
                            if params[0].get("to").is_none() {
                                let n = deployments.fetch_add(1, Ordering::SeqCst);
                                json!(format!("0xd{n}"))
                            } else {
                                let n = replays.fetch_add(1, Ordering::SeqCst);
                                json!(format!("0xe{n}"))
                            }
                        }
                        "eth_getTransactionReceipt" => {
                            let hash = params[0].as_str().unwrap_or_default();
                            let deployed = hash.starts_with("0xd");
                            json!({
                                "transactionHash": hash,
                                "status": if deployed { "0x1" } else { behavior.replay_status },
                                "contractAddress": if deployed { Some(FLASH) } else { None },
                                "gasUsed": "0x5208",
                                "blockNumber": "0xd1a24b"
                            })
                        }
                        "eth_getTransactionByHash" => json!({
                            "hash": params[0],
                            "from": OWNER,
                            "to": FLASH,
                            "input": "0xdeadbeef",
                            "gas": "0x7a120",
                            "value": "0x0",
                            "nonce": "0x1",
                            "chainId": "0x7a69"
                        }),
                        _ => Value::Null,
                    };
                    let envelope = json!({"jsonrpc": "2.0", "id": call["id"], "result": result});
                    let header =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                    let response = Response::from_string(envelope.to_string()).with_header(header);
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            url: format!("http://{addr}"),
            methods,
            stop,
            worker: Some(worker),
        }
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns how many times `method` was called.
    pub fn count(&self, method: &str) -> usize {
        self.methods.lock().unwrap().iter().filter(|called| *called == method).count()
    }
}

impl Drop for StubChain {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
