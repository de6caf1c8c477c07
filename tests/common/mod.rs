//! Shared test doubles for the integration suites.
//!
//! None of these talk to a real wallet: each one scripts what a wallet SDK
//! would answer and records what it was asked.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use eth_wallet_connector::bridge::{
    BridgeRequest, ProviderRpcError, RemoteSession, RemoteSessionRequest, RemoteSigningBridge,
    RemoteSigningFailure, WalletBridge, WalletEnvironment,
};
use eth_wallet_connector::config::Config;
use eth_wallet_connector::connector::{Activation, BackendKind, Connector};
use eth_wallet_connector::error::{ErrorClass, SessionError, SessionResult};
use eth_wallet_connector::network::NetworkRegistry;
use eth_wallet_connector::session::WalletSession;
use eth_wallet_connector::switch::NetworkSwitcher;

pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

/// Session on the builtin registry (chain 3 at index 0, chain 97 at index 1).
pub fn session_with(environment: WalletEnvironment) -> WalletSession {
    WalletSession::new(NetworkRegistry::builtin(), Config::default(), environment)
        .expect("builtin registry has a network at the default index")
}

pub fn activation(backend: BackendKind, chain_id: u64) -> Activation {
    Activation {
        backend,
        accounts: vec![ALICE],
        chain_id,
    }
}

/// In-memory EIP-1193 wallet.
///
/// Answers `eth_requestAccounts`, `eth_chainId` and
/// `wallet_switchEthereumChain`; everything else is 4200.
pub struct MockWalletBridge {
    chain_id: Mutex<u64>,
    reject_accounts: bool,
    refuse_switch: bool,
    follow_switch: bool,
    requests: Mutex<Vec<BridgeRequest>>,
}

impl MockWalletBridge {
    /// A cooperative wallet sitting on `chain_id`.
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            chain_id: Mutex::new(chain_id),
            reject_accounts: false,
            refuse_switch: false,
            follow_switch: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The user dismisses the account prompt.
    pub fn rejecting_accounts(mut self) -> Self {
        self.reject_accounts = true;
        self
    }

    /// The wallet answers switch requests with 4902.
    pub fn refusing_switch(mut self) -> Self {
        self.refuse_switch = true;
        self
    }

    /// The wallet acknowledges switch requests but stays where it is.
    pub fn ignoring_switch(mut self) -> Self {
        self.follow_switch = false;
        self
    }

    pub fn requests(&self) -> Vec<BridgeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.method).collect()
    }

    pub fn current_chain(&self) -> u64 {
        *self.chain_id.lock().unwrap()
    }
}

#[async_trait]
impl WalletBridge for MockWalletBridge {
    async fn request(&self, request: BridgeRequest) -> Result<Value, ProviderRpcError> {
        self.requests.lock().unwrap().push(request.clone());

        match request.method.as_str() {
            "eth_requestAccounts" if self.reject_accounts => {
                Err(ProviderRpcError::new(4001, "User rejected the request."))
            }
            "eth_requestAccounts" => Ok(json!([ALICE.to_string()])),
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.current_chain()))),
            "wallet_switchEthereumChain" if self.refuse_switch => Err(ProviderRpcError::new(
                4902,
                "Unrecognized chain ID. Try adding the chain using wallet_addEthereumChain first.",
            )),
            "wallet_switchEthereumChain" => {
                let target = request.params[0]["chainId"]
                    .as_str()
                    .and_then(|hex| u64::from_str_radix(hex.trim_start_matches("0x"), 16).ok())
                    .ok_or_else(|| ProviderRpcError::new(-32602, "Invalid chainId"))?;
                if self.follow_switch {
                    *self.chain_id.lock().unwrap() = target;
                }
                Ok(Value::Null)
            }
            other => Err(ProviderRpcError::new(
                4200,
                format!("The Provider does not support the requested method: {other}"),
            )),
        }
    }
}

/// QR-code remote signing library whose disconnect always fails.
///
/// Reports a fixed chain, or the chain of a paired wallet so that a switch
/// sent through that wallet is visible to the next session.
pub struct MockRemoteBridge {
    chain_id: u64,
    paired: Option<Arc<MockWalletBridge>>,
    pub connect_requests: Mutex<Vec<RemoteSessionRequest>>,
    pub disconnects: AtomicUsize,
}

impl MockRemoteBridge {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            chain_id,
            paired: None,
            connect_requests: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Follow `wallet`'s current chain.
    pub fn paired_with(wallet: Arc<MockWalletBridge>) -> Self {
        Self {
            paired: Some(wallet),
            ..Self::on_chain(0)
        }
    }

    fn current_chain(&self) -> u64 {
        self.paired
            .as_ref()
            .map_or(self.chain_id, |wallet| wallet.current_chain())
    }
}

#[async_trait]
impl RemoteSigningBridge for MockRemoteBridge {
    async fn connect(
        &self,
        request: &RemoteSessionRequest,
    ) -> Result<RemoteSession, RemoteSigningFailure> {
        self.connect_requests.lock().unwrap().push(request.clone());
        Ok(RemoteSession {
            accounts: vec![ALICE],
            chain_id: self.current_chain(),
        })
    }

    async fn disconnect(&self) -> Result<(), RemoteSigningFailure> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Err(RemoteSigningFailure::Failed {
            name: "Error".to_string(),
            message: "Session currently disconnected".to_string(),
        })
    }
}

/// Connector that replays a fixed list of activation outcomes.
pub struct ScriptedConnector {
    backend: BackendKind,
    outcomes: Mutex<VecDeque<Result<Activation, ErrorClass>>>,
    deactivate_result: Result<(), ErrorClass>,
    pub activations: AtomicUsize,
    pub deactivations: AtomicUsize,
    /// Signalled when an activation starts.
    pub started: Arc<Notify>,
    /// When set, every activation waits for this before answering.
    gate: Option<Arc<Notify>>,
}

impl ScriptedConnector {
    pub fn new(
        backend: BackendKind,
        outcomes: impl IntoIterator<Item = Result<Activation, ErrorClass>>,
    ) -> Self {
        Self {
            backend,
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            deactivate_result: Ok(()),
            activations: AtomicUsize::new(0),
            deactivations: AtomicUsize::new(0),
            started: Arc::new(Notify::new()),
            gate: None,
        }
    }

    pub fn failing_deactivate(mut self, class: ErrorClass) -> Self {
        self.deactivate_result = Err(class);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn supported_chain_ids(&self) -> Vec<u64> {
        vec![3]
    }

    async fn activate(&self) -> Result<Activation, ErrorClass> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ErrorClass::unknown("Exhausted", "no scripted outcome left")))
    }

    async fn deactivate(&self) -> Result<(), ErrorClass> {
        self.deactivations.fetch_add(1, Ordering::SeqCst);
        self.deactivate_result.clone()
    }
}

/// Switch requester that records chain ids and answers with a fixed result.
pub struct CountingSwitcher {
    succeed: bool,
    pub requested: Mutex<Vec<u64>>,
}

impl CountingSwitcher {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkSwitcher for CountingSwitcher {
    async fn request_switch(&self, chain_id: u64) -> SessionResult<()> {
        self.requested.lock().unwrap().push(chain_id);
        if self.succeed {
            Ok(())
        } else {
            Err(SessionError::network_switch(chain_id, "User rejected the request."))
        }
    }
}
