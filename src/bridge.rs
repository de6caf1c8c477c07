//! Boundary with the wallet SDKs.
//!
//! The connectors drive three kinds of wallet bridge, each supplied by the
//! host application:
//!
//! - [`WalletBridge`]: an EIP-1193 provider injected by a browser extension
//! - [`RemoteSigningBridge`]: a QR-code remote signing session (WalletConnect style)
//! - [`ChainSpecificBridge`]: a chain vendor's own extension (Binance Chain wallet style)
//!
//! Each bridge reports its own failure type. Only the connector adapters in
//! [`crate::connector`] look at these; everything above them sees an
//! [`ErrorClass`](crate::error::ErrorClass).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC style request sent through an injected bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRequest {
    /// RPC method name
    pub method: String,
    /// Positional parameters
    pub params: Value,
}

impl BridgeRequest {
    /// Build a request.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Error codes defined by EIP-1193 and EIP-3326.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// 4001: the user rejected the request
    UserRejected,
    /// 4100: the method or account has not been authorized
    Unauthorized,
    /// 4200: the provider does not support the method
    UnsupportedMethod,
    /// 4900: the provider is disconnected from all chains
    Disconnected,
    /// 4901: the provider is not connected to the requested chain
    ChainDisconnected,
    /// 4902: the wallet does not know the requested chain
    UnrecognizedChain,
    /// Any other code
    Other(i64),
}

impl From<i64> for ProviderErrorCode {
    fn from(code: i64) -> Self {
        match code {
            4001 => Self::UserRejected,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            4902 => Self::UnrecognizedChain,
            other => Self::Other(other),
        }
    }
}

/// Failure reported by an injected EIP-1193 bridge.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderRpcError {
    /// Numeric error code
    pub code: i64,
    /// Provider-supplied message
    pub message: String,
    /// Optional extra data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    /// Build an error without data.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Decoded error code.
    #[must_use]
    pub fn kind(&self) -> ProviderErrorCode {
        ProviderErrorCode::from(self.code)
    }
}

/// An EIP-1193 provider injected into the host environment.
#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// Send one request and wait for the wallet's answer.
    ///
    /// May wait indefinitely on a user prompt.
    async fn request(&self, request: BridgeRequest) -> Result<Value, ProviderRpcError>;
}

/// Parameters for opening a remote signing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSessionRequest {
    /// Chain id to RPC endpoint routing table
    pub rpc: BTreeMap<u64, String>,
    /// Show the pairing QR code
    pub qrcode: bool,
    /// How often the bridge polls the relay
    pub polling_interval: Duration,
}

/// An established remote signing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    /// Accounts exposed by the remote wallet
    pub accounts: Vec<Address>,
    /// Chain the remote wallet is on
    pub chain_id: u64,
}

/// Failure reported by a remote signing bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteSigningFailure {
    /// The user closed the QR modal or declined in the remote wallet.
    #[error("User rejected the session request")]
    UserRejected,
    /// The relay could not be reached.
    #[error("Relay unavailable: {0}")]
    RelayUnavailable(String),
    /// Any other failure.
    #[error("{name}: {message}")]
    Failed {
        /// Failure name
        name: String,
        /// Failure message
        message: String,
    },
}

/// A QR-code remote signing library.
#[async_trait]
pub trait RemoteSigningBridge: Send + Sync {
    /// Pair with a remote wallet and open a session.
    async fn connect(
        &self,
        request: &RemoteSessionRequest,
    ) -> Result<RemoteSession, RemoteSigningFailure>;

    /// Close the current session.
    async fn disconnect(&self) -> Result<(), RemoteSigningFailure>;
}

/// Failure reported by a chain-specific wallet bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainSpecificFailure {
    /// The user declined the authorization prompt.
    #[error("The user rejected the request")]
    UserRejected,
    /// Any other failure.
    #[error("{name}: {message}")]
    Failed {
        /// Failure name
        name: String,
        /// Failure message
        message: String,
    },
}

/// A chain vendor's wallet extension.
#[async_trait]
pub trait ChainSpecificBridge: Send + Sync {
    /// Ask for account access.
    async fn enable(&self) -> Result<Vec<Address>, ChainSpecificFailure>;

    /// Chain the extension is on.
    async fn chain_id(&self) -> Result<u64, ChainSpecificFailure>;

    /// Release account access.
    async fn disconnect(&self) -> Result<(), ChainSpecificFailure>;
}

/// Which bridges the host environment provides.
///
/// A missing injected or chain-specific bridge means the user has no such
/// extension installed. A missing remote signing bridge means the
/// application was built without that backend.
#[derive(Clone, Default)]
pub struct WalletEnvironment {
    /// Injected EIP-1193 provider
    pub injected: Option<Arc<dyn WalletBridge>>,
    /// Remote signing library
    pub remote_signing: Option<Arc<dyn RemoteSigningBridge>>,
    /// Chain-specific extension
    pub chain_specific: Option<Arc<dyn ChainSpecificBridge>>,
}

impl WalletEnvironment {
    /// An environment with no bridges.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add an injected provider.
    #[must_use]
    pub fn with_injected(mut self, bridge: Arc<dyn WalletBridge>) -> Self {
        self.injected = Some(bridge);
        self
    }

    /// Add a remote signing library.
    #[must_use]
    pub fn with_remote_signing(mut self, bridge: Arc<dyn RemoteSigningBridge>) -> Self {
        self.remote_signing = Some(bridge);
        self
    }

    /// Add a chain-specific extension.
    #[must_use]
    pub fn with_chain_specific(mut self, bridge: Arc<dyn ChainSpecificBridge>) -> Self {
        self.chain_specific = Some(bridge);
        self
    }
}

impl fmt::Debug for WalletEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletEnvironment")
            .field("injected", &self.injected.is_some())
            .field("remote_signing", &self.remote_signing.is_some())
            .field("chain_specific", &self.chain_specific.is_some())
            .finish()
    }
}

/// Parse the result of `eth_requestAccounts` / `eth_accounts`.
///
/// # Errors
///
/// Returns a description of the first malformed entry.
pub fn parse_accounts(value: &Value) -> Result<Vec<Address>, String> {
    let entries = value
        .as_array()
        .ok_or_else(|| format!("expected an array of accounts, got {value}"))?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .ok_or_else(|| format!("account is not a string: {entry}"))
                .and_then(|s| Address::from_str(s).map_err(|e| format!("bad account {s}: {e}")))
        })
        .collect()
}

/// Parse the result of `eth_chainId`, which wallets return as hex (or,
/// occasionally, as a decimal number).
///
/// # Errors
///
/// Returns a description of the malformed value.
///
/// # Example
///
/// ```
/// use eth_wallet_connector::bridge::parse_chain_id;
/// use serde_json::json;
///
/// assert_eq!(parse_chain_id(&json!("0x61")), Ok(97));
/// assert_eq!(parse_chain_id(&json!(3)), Ok(3));
/// ```
pub fn parse_chain_id(value: &Value) -> Result<u64, String> {
    match value {
        Value::String(s) => {
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse::<u64>(),
            };
            parsed.map_err(|e| format!("bad chain id {s}: {e}"))
        }
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("bad chain id {n}")),
        other => Err(format!("bad chain id {other}")),
    }
}
