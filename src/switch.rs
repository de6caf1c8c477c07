//! Asking the wallet environment to change its active chain.
//!
//! The requester only switches; it never registers a chain with the wallet
//! and it never retries. Retry policy belongs to the session controller.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::bridge::{BridgeRequest, WalletBridge};
use crate::error::{SessionError, SessionResult};
use crate::network::chain_id_hex;

/// Something that can ask the wallet to switch chains.
#[async_trait]
pub trait NetworkSwitcher: Send + Sync {
    /// Ask the wallet to make `chain_id` its active chain.
    ///
    /// # Errors
    ///
    /// [`SessionError::NetworkSwitchFailed`] if the wallet refuses, errors,
    /// or the capability is missing.
    async fn request_switch(&self, chain_id: u64) -> SessionResult<()>;
}

/// The `wallet_switchEthereumChain` request for `chain_id`.
///
/// # Example
///
/// ```
/// use eth_wallet_connector::switch::switch_request;
/// use serde_json::json;
///
/// let request = switch_request(97);
/// assert_eq!(request.method, "wallet_switchEthereumChain");
/// assert_eq!(request.params, json!([{ "chainId": "0x61" }]));
/// ```
#[must_use]
pub fn switch_request(chain_id: u64) -> BridgeRequest {
    BridgeRequest::new(
        "wallet_switchEthereumChain",
        json!([{ "chainId": chain_id_hex(chain_id) }]),
    )
}

/// Switches through the injected EIP-1193 provider.
pub struct InjectedNetworkSwitcher {
    bridge: Option<Arc<dyn WalletBridge>>,
}

impl InjectedNetworkSwitcher {
    /// Build a switcher over an optional injected provider.
    #[must_use]
    pub fn new(bridge: Option<Arc<dyn WalletBridge>>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl NetworkSwitcher for InjectedNetworkSwitcher {
    #[instrument(skip(self))]
    async fn request_switch(&self, chain_id: u64) -> SessionResult<()> {
        let Some(bridge) = self.bridge.as_deref() else {
            error!(
                chain_id,
                "Cannot switch network: no injected wallet provider in this environment"
            );
            return Err(SessionError::network_switch(
                chain_id,
                "no injected wallet provider",
            ));
        };

        match bridge.request(switch_request(chain_id)).await {
            Ok(_) => {
                info!(chain_id, "Wallet switched network");
                Ok(())
            }
            Err(e) => {
                warn!(chain_id, code = e.code, error = %e, "Wallet refused network switch");
                Err(SessionError::network_switch(chain_id, e.to_string()))
            }
        }
    }
}
