//! One connector per backend, bound to a single network.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::{BackendKind, ChainSpecificConnector, Connector, InjectedConnector, RemoteSigningConnector};
use crate::bridge::WalletEnvironment;
use crate::config::Config;
use crate::network::NetworkDescriptor;

/// The connectors for the selected network.
///
/// Built by [`ConnectorSet::build`] and replaced wholesale on every network
/// change; a set is never re-pointed at another chain.
#[derive(Debug)]
pub struct ConnectorSet {
    network_index: usize,
    chain_id: u64,
    connectors: BTreeMap<BackendKind, Arc<dyn Connector>>,
}

impl ConnectorSet {
    /// Build the connectors for the network at `network_index`.
    ///
    /// Every connector accepts exactly `network.chain_id`. The remote signing
    /// connector routes that chain to `network.rpc_url` and is only built when
    /// the environment provides a remote signing library.
    #[must_use]
    pub fn build(
        network_index: usize,
        network: &NetworkDescriptor,
        environment: &WalletEnvironment,
        config: &Config,
    ) -> Self {
        let chain_id = network.chain_id;
        let mut connectors: BTreeMap<BackendKind, Arc<dyn Connector>> = BTreeMap::new();

        connectors.insert(
            BackendKind::Injected,
            Arc::new(InjectedConnector::new(
                environment.injected.clone(),
                vec![chain_id],
            )),
        );

        if let Some(bridge) = &environment.remote_signing {
            connectors.insert(
                BackendKind::RemoteSigning,
                Arc::new(RemoteSigningConnector::new(
                    Arc::clone(bridge),
                    BTreeMap::from([(chain_id, network.rpc_url.clone())]),
                    config.remote_qrcode(),
                    config.remote_polling_interval(),
                )),
            );
        } else {
            debug!("No remote signing library configured; connector left absent");
        }

        connectors.insert(
            BackendKind::ChainSpecific,
            Arc::new(ChainSpecificConnector::new(
                environment.chain_specific.clone(),
                vec![chain_id],
            )),
        );

        info!(
            network_index,
            chain_id,
            connectors = connectors.len(),
            "Connector set built"
        );

        Self {
            network_index,
            chain_id,
            connectors,
        }
    }

    /// Registry index this set was built for.
    #[must_use]
    pub const fn network_index(&self) -> usize {
        self.network_index
    }

    /// Chain id every connector in this set accepts.
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Whether this set was built for `network` at `network_index`.
    #[must_use]
    pub fn is_bound_to(&self, network_index: usize, network: &NetworkDescriptor) -> bool {
        self.network_index == network_index && self.chain_id == network.chain_id
    }

    /// The connector for `backend`, if one is configured.
    #[must_use]
    pub fn get(&self, backend: BackendKind) -> Option<Arc<dyn Connector>> {
        self.connectors.get(&backend).cloned()
    }

    /// Backends with a configured connector.
    pub fn backends(&self) -> impl Iterator<Item = BackendKind> + '_ {
        self.connectors.keys().copied()
    }
}
