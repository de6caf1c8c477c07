//! Connector for a browser-injected EIP-1193 wallet.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ensure_supported, Activation, BackendKind, Connector};
use crate::bridge::{
    parse_accounts, parse_chain_id, BridgeRequest, ProviderErrorCode, ProviderRpcError,
    WalletBridge,
};
use crate::error::ErrorClass;

/// Activates through `eth_requestAccounts` on the injected provider.
pub struct InjectedConnector {
    bridge: Option<Arc<dyn WalletBridge>>,
    supported_chain_ids: Vec<u64>,
}

impl InjectedConnector {
    /// Build a connector accepting `supported_chain_ids`.
    ///
    /// A `None` bridge is allowed: activation then reports
    /// [`ErrorClass::ProviderUnavailable`].
    #[must_use]
    pub fn new(bridge: Option<Arc<dyn WalletBridge>>, supported_chain_ids: Vec<u64>) -> Self {
        Self {
            bridge,
            supported_chain_ids,
        }
    }

    async fn call(
        bridge: &dyn WalletBridge,
        method: &str,
    ) -> Result<serde_json::Value, ErrorClass> {
        debug!(method, "Injected bridge request");
        bridge
            .request(BridgeRequest::new(method, json!([])))
            .await
            .map_err(|e| classify(&e))
    }
}

/// Map an EIP-1193 error onto the shared taxonomy.
#[must_use]
pub fn classify(error: &ProviderRpcError) -> ErrorClass {
    match error.kind() {
        ProviderErrorCode::UserRejected => ErrorClass::UserRejected,
        ProviderErrorCode::Disconnected | ProviderErrorCode::ChainDisconnected => {
            ErrorClass::ProviderUnavailable
        }
        _ => ErrorClass::unknown("ProviderRpcError", error.message.clone()),
    }
}

#[async_trait]
impl Connector for InjectedConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::Injected
    }

    fn supported_chain_ids(&self) -> Vec<u64> {
        self.supported_chain_ids.clone()
    }

    #[instrument(skip(self), fields(backend = "injected"))]
    async fn activate(&self) -> Result<Activation, ErrorClass> {
        let bridge = self
            .bridge
            .as_deref()
            .ok_or(ErrorClass::ProviderUnavailable)?;

        let accounts = Self::call(bridge, "eth_requestAccounts").await?;
        let accounts = parse_accounts(&accounts)
            .map_err(|message| ErrorClass::unknown("InvalidResponse", message))?;

        let chain_id = Self::call(bridge, "eth_chainId").await?;
        let chain_id = parse_chain_id(&chain_id)
            .map_err(|message| ErrorClass::unknown("InvalidResponse", message))?;

        ensure_supported(chain_id, &self.supported_chain_ids)?;

        Ok(Activation {
            backend: BackendKind::Injected,
            accounts,
            chain_id,
        })
    }

    async fn deactivate(&self) -> Result<(), ErrorClass> {
        // EIP-1193 has no disconnect request; the wallet keeps its grant.
        Ok(())
    }
}
