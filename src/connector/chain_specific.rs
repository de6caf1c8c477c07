//! Connector for a chain vendor's wallet extension.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use super::{ensure_supported, Activation, BackendKind, Connector};
use crate::bridge::{ChainSpecificBridge, ChainSpecificFailure};
use crate::error::ErrorClass;

/// Activates through the vendor extension's `enable` call.
pub struct ChainSpecificConnector {
    bridge: Option<Arc<dyn ChainSpecificBridge>>,
    supported_chain_ids: Vec<u64>,
}

impl ChainSpecificConnector {
    /// Build a connector accepting `supported_chain_ids`.
    ///
    /// A `None` bridge means the extension is not installed; activation then
    /// reports [`ErrorClass::ProviderUnavailable`].
    #[must_use]
    pub fn new(
        bridge: Option<Arc<dyn ChainSpecificBridge>>,
        supported_chain_ids: Vec<u64>,
    ) -> Self {
        Self {
            bridge,
            supported_chain_ids,
        }
    }
}

/// Map a chain-specific failure onto the shared taxonomy.
#[must_use]
pub fn classify(failure: ChainSpecificFailure) -> ErrorClass {
    match failure {
        ChainSpecificFailure::UserRejected => ErrorClass::UserRejected,
        ChainSpecificFailure::Failed { name, message } => ErrorClass::Unknown { name, message },
    }
}

#[async_trait]
impl Connector for ChainSpecificConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::ChainSpecific
    }

    fn supported_chain_ids(&self) -> Vec<u64> {
        self.supported_chain_ids.clone()
    }

    #[instrument(skip(self), fields(backend = "chain-specific"))]
    async fn activate(&self) -> Result<Activation, ErrorClass> {
        let bridge = self
            .bridge
            .as_deref()
            .ok_or(ErrorClass::ProviderUnavailable)?;

        let accounts = bridge.enable().await.map_err(classify)?;
        let chain_id = bridge.chain_id().await.map_err(classify)?;
        ensure_supported(chain_id, &self.supported_chain_ids)?;

        Ok(Activation {
            backend: BackendKind::ChainSpecific,
            accounts,
            chain_id,
        })
    }

    async fn deactivate(&self) -> Result<(), ErrorClass> {
        match self.bridge.as_deref() {
            Some(bridge) => bridge.disconnect().await.map_err(classify),
            None => Ok(()),
        }
    }
}
