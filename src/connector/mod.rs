//! Per-backend connectors.
//!
//! A connector knows how to activate and deactivate a wallet session against
//! one backend, and which chain ids it accepts. Each adapter classifies its
//! backend's failures into an [`ErrorClass`] at this boundary, so the session
//! controller never sees a backend-specific failure type.
//!
//! ## Backends
//!
//! | Kind | Adapter | Bridge |
//! |------|---------|--------|
//! | [`BackendKind::Injected`] | [`InjectedConnector`] | [`WalletBridge`](crate::bridge::WalletBridge) |
//! | [`BackendKind::RemoteSigning`] | [`RemoteSigningConnector`] | [`RemoteSigningBridge`](crate::bridge::RemoteSigningBridge) |
//! | [`BackendKind::ChainSpecific`] | [`ChainSpecificConnector`] | [`ChainSpecificBridge`](crate::bridge::ChainSpecificBridge) |
//!
//! [`ConnectorSet`] holds one of each for the selected network.

use std::fmt;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::error::ErrorClass;

pub mod chain_specific;
pub mod injected;
pub mod remote;
pub mod set;

pub use chain_specific::ChainSpecificConnector;
pub use injected::InjectedConnector;
pub use remote::RemoteSigningConnector;
pub use set::ConnectorSet;

/// A method of obtaining wallet authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    /// Browser-injected wallet extension
    Injected,
    /// QR-code remote signing
    RemoteSigning,
    /// Chain vendor's wallet extension
    ChainSpecific,
}

impl BackendKind {
    /// All backends, in display order.
    pub const ALL: [Self; 3] = [Self::Injected, Self::RemoteSigning, Self::ChainSpecific];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Injected => "injected",
            Self::RemoteSigning => "remote-signing",
            Self::ChainSpecific => "chain-specific",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Backend that was activated
    pub backend: BackendKind,
    /// Accounts the wallet exposed
    pub accounts: Vec<Address>,
    /// Chain the wallet is on
    pub chain_id: u64,
}

impl Activation {
    /// First exposed account, if any.
    #[must_use]
    pub fn primary_account(&self) -> Option<Address> {
        self.accounts.first().copied()
    }
}

/// Activate/deactivate capability for one backend on one network.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Backend this connector drives.
    fn backend(&self) -> BackendKind;

    /// Chain ids this connector accepts.
    fn supported_chain_ids(&self) -> Vec<u64>;

    /// Establish an authorized session.
    ///
    /// Waits for as long as the backend does; user prompts are unbounded.
    async fn activate(&self) -> Result<Activation, ErrorClass>;

    /// Tear the session down.
    async fn deactivate(&self) -> Result<(), ErrorClass>;
}

impl fmt::Debug for dyn Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("backend", &self.backend())
            .field("supported_chain_ids", &self.supported_chain_ids())
            .finish()
    }
}

/// Reject an activation whose chain is outside `supported`.
pub(crate) fn ensure_supported(chain_id: u64, supported: &[u64]) -> Result<(), ErrorClass> {
    if supported.contains(&chain_id) {
        Ok(())
    } else {
        Err(ErrorClass::UnsupportedChain {
            wallet_chain_id: chain_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        let names: Vec<_> = BackendKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["injected", "remote-signing", "chain-specific"]);
    }

    #[test]
    fn test_ensure_supported() {
        assert!(ensure_supported(3, &[3]).is_ok());
        assert_eq!(
            ensure_supported(1, &[3]),
            Err(ErrorClass::UnsupportedChain { wallet_chain_id: 1 })
        );
    }

    #[test]
    fn test_primary_account() {
        let activation = Activation {
            backend: BackendKind::Injected,
            accounts: Vec::new(),
            chain_id: 3,
        };
        assert!(activation.primary_account().is_none());
    }
}
