//! Session state as seen by the rest of the application.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::Value;

use crate::bridge::{BridgeRequest, ProviderRpcError, WalletBridge};
use crate::connector::{Activation, BackendKind};

/// Where the controller is in the login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No wallet session
    #[default]
    Disconnected,
    /// Waiting on a backend to activate
    Connecting(BackendKind),
    /// A wallet session is active
    Connected(BackendKind),
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting(backend) => write!(f, "connecting ({backend})"),
            Self::Connected(backend) => write!(f, "connected ({backend})"),
        }
    }
}

/// Interactive, signing-capable provider over the live injected bridge.
///
/// Distinct from the read-only [`ChainDataProvider`](crate::rpc::ChainDataProvider):
/// requests go to the user's wallet and may prompt them.
#[derive(Clone)]
pub struct WalletProvider {
    bridge: Arc<dyn WalletBridge>,
}

impl WalletProvider {
    /// Wrap an injected bridge.
    #[must_use]
    pub fn new(bridge: Arc<dyn WalletBridge>) -> Self {
        Self { bridge }
    }

    /// Forward a request to the wallet.
    ///
    /// # Errors
    ///
    /// Whatever the wallet reports.
    pub async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Value, ProviderRpcError> {
        self.bridge.request(BridgeRequest::new(method, params)).await
    }
}

impl fmt::Debug for WalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletProvider").finish_non_exhaustive()
    }
}

/// Snapshot of the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Lifecycle position
    pub status: ConnectionStatus,
    /// Result of the last successful activation, while connected
    pub activation: Option<Activation>,
    /// Signing-capable provider, while connected through the injected backend
    pub wallet_provider: Option<WalletProvider>,
}

impl SessionState {
    pub(crate) fn connecting(backend: BackendKind) -> Self {
        Self {
            status: ConnectionStatus::Connecting(backend),
            ..Self::default()
        }
    }

    /// Whether a wallet session is active.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connected(_))
    }

    /// Backend of the active session.
    #[must_use]
    pub const fn connected_backend(&self) -> Option<BackendKind> {
        match self.status {
            ConnectionStatus::Connected(backend) => Some(backend),
            _ => None,
        }
    }

    /// Accounts of the active session; empty when disconnected.
    #[must_use]
    pub fn accounts(&self) -> &[Address] {
        self.activation
            .as_ref()
            .map_or(&[], |activation| activation.accounts.as_slice())
    }
}
