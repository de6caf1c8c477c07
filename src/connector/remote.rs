//! Connector for QR-code remote signing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::{ensure_supported, Activation, BackendKind, Connector};
use crate::bridge::{RemoteSessionRequest, RemoteSigningBridge, RemoteSigningFailure};
use crate::error::ErrorClass;

/// Opens a remote signing session routed to the configured RPC endpoints.
///
/// The supported chain ids are the keys of the routing table.
pub struct RemoteSigningConnector {
    bridge: Arc<dyn RemoteSigningBridge>,
    request: RemoteSessionRequest,
}

impl RemoteSigningConnector {
    /// Build a connector from a routing table.
    #[must_use]
    pub fn new(
        bridge: Arc<dyn RemoteSigningBridge>,
        rpc: BTreeMap<u64, String>,
        qrcode: bool,
        polling_interval: Duration,
    ) -> Self {
        Self {
            bridge,
            request: RemoteSessionRequest {
                rpc,
                qrcode,
                polling_interval,
            },
        }
    }

    /// Session parameters sent to the bridge.
    #[must_use]
    pub const fn session_request(&self) -> &RemoteSessionRequest {
        &self.request
    }
}

/// Map a remote signing failure onto the shared taxonomy.
#[must_use]
pub fn classify(failure: RemoteSigningFailure) -> ErrorClass {
    match failure {
        RemoteSigningFailure::UserRejected => ErrorClass::UserRejected,
        RemoteSigningFailure::RelayUnavailable(_) => ErrorClass::ProviderUnavailable,
        RemoteSigningFailure::Failed { name, message } => ErrorClass::Unknown { name, message },
    }
}

#[async_trait]
impl Connector for RemoteSigningConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::RemoteSigning
    }

    fn supported_chain_ids(&self) -> Vec<u64> {
        self.request.rpc.keys().copied().collect()
    }

    #[instrument(skip(self), fields(backend = "remote-signing", qrcode = self.request.qrcode))]
    async fn activate(&self) -> Result<Activation, ErrorClass> {
        let session = self.bridge.connect(&self.request).await.map_err(classify)?;
        info!(
            chain_id = session.chain_id,
            accounts = session.accounts.len(),
            "Remote signing session opened"
        );

        ensure_supported(session.chain_id, &self.supported_chain_ids())?;

        Ok(Activation {
            backend: BackendKind::RemoteSigning,
            accounts: session.accounts,
            chain_id: session.chain_id,
        })
    }

    async fn deactivate(&self) -> Result<(), ErrorClass> {
        self.bridge.disconnect().await.map_err(classify)
    }
}
