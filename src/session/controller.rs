//! The login/logout state machine and its network context.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use tracing::{debug, error, info, instrument, warn};

use super::state::{ConnectionStatus, SessionState, WalletProvider};
use crate::bridge::WalletEnvironment;
use crate::config::Config;
use crate::connector::{Activation, BackendKind, Connector, ConnectorSet};
use crate::error::{ErrorClass, SessionError, SessionResult};
use crate::network::{NetworkDescriptor, NetworkRegistry};
use crate::rpc::{ChainDataProvider, ProviderCache};
use crate::switch::{InjectedNetworkSwitcher, NetworkSwitcher};

/// Everything that depends on the selected network.
///
/// Replaced as a unit, so the index, the connectors and the cached provider
/// always agree.
struct NetworkBinding {
    index: usize,
    connectors: ConnectorSet,
    provider: ProviderCache,
}

impl NetworkBinding {
    fn build(
        index: usize,
        registry: &NetworkRegistry,
        environment: &WalletEnvironment,
        config: &Config,
    ) -> SessionResult<Self> {
        let network = registry.describe(index)?;
        Ok(Self {
            index,
            connectors: ConnectorSet::build(index, network, environment, config),
            provider: ProviderCache::new(),
        })
    }
}

struct Inner {
    state: SessionState,
    // Bumped by every login start, every logout, and a network change during
    // a login. A login only proceeds or commits while it is unchanged.
    generation: u64,
}

/// Session context and controller.
///
/// Owns the selected network, its connector set, the cached read-only
/// provider and the login state. Share it as `Arc<WalletSession>`; all
/// operations take `&self`.
///
/// # Example
///
/// ```no_run
/// use eth_wallet_connector::bridge::WalletEnvironment;
/// use eth_wallet_connector::config::Config;
/// use eth_wallet_connector::network::NetworkRegistry;
/// use eth_wallet_connector::session::WalletSession;
///
/// # async fn example(environment: WalletEnvironment) -> eth_wallet_connector::error::SessionResult<()> {
/// let session = WalletSession::new(NetworkRegistry::builtin(), Config::default(), environment)?;
///
/// match session.login_remote().await {
///     Ok(activation) => println!("connected as {:?}", activation.primary_account()),
///     Err(e) => {
///         if let Some(notice) = e.user_notice() {
///             eprintln!("{notice}");
///         }
///     }
/// }
///
/// session.logout_remote().await;
/// # Ok(())
/// # }
/// ```
pub struct WalletSession {
    registry: NetworkRegistry,
    config: Config,
    environment: WalletEnvironment,
    switcher: Arc<dyn NetworkSwitcher>,
    binding: RwLock<NetworkBinding>,
    inner: Mutex<Inner>,
}

impl WalletSession {
    /// Create a session on the configured default network.
    ///
    /// Network switches go through the injected provider, if any.
    ///
    /// # Errors
    ///
    /// [`SessionError::OutOfRange`] if the default network is not in `registry`.
    pub fn new(
        registry: NetworkRegistry,
        config: Config,
        environment: WalletEnvironment,
    ) -> SessionResult<Self> {
        let binding =
            NetworkBinding::build(config.default_network(), &registry, &environment, &config)?;
        let switcher = Arc::new(InjectedNetworkSwitcher::new(environment.injected.clone()));

        Ok(Self {
            registry,
            config,
            environment,
            switcher,
            binding: RwLock::new(binding),
            inner: Mutex::new(Inner {
                state: SessionState::default(),
                generation: 0,
            }),
        })
    }

    /// Replace the network switch requester.
    #[must_use]
    pub fn with_switcher(mut self, switcher: Arc<dyn NetworkSwitcher>) -> Self {
        self.switcher = switcher;
        self
    }

    /// The network registry.
    #[must_use]
    pub const fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    /// The configuration this session was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Registry index of the selected network.
    #[must_use]
    pub fn selected_network(&self) -> usize {
        self.read_binding().index
    }

    /// Descriptor of the selected network.
    ///
    /// # Errors
    ///
    /// Never in practice; the selected index is validated on selection.
    pub fn current_network(&self) -> SessionResult<NetworkDescriptor> {
        let index = self.selected_network();
        self.registry.describe(index).cloned()
    }

    /// Select another network.
    ///
    /// Builds the new connector set first, then swaps it in together with an
    /// empty provider cache. Readers see either the old binding or the new
    /// one, never a mix. An established session is left alone; a pending
    /// login is superseded and the state returns to
    /// [`ConnectionStatus::Disconnected`].
    ///
    /// # Errors
    ///
    /// [`SessionError::OutOfRange`] if `index` is not in the registry; the
    /// current selection is kept.
    #[instrument(skip(self))]
    pub fn select_network(&self, index: usize) -> SessionResult<()> {
        let binding = NetworkBinding::build(index, &self.registry, &self.environment, &self.config)?;
        let chain_id = binding.connectors.chain_id();

        let previous = {
            let mut guard = self.binding.write().unwrap_or_else(PoisonError::into_inner);
            let previous = std::mem::replace(&mut *guard, binding);

            // Lock order: binding, then inner.
            let mut inner = self.lock_inner();
            if let ConnectionStatus::Connecting(pending) = inner.state.status {
                inner.generation += 1;
                inner.state = SessionState::default();
                warn!(%pending, "Network changed during login; pending login superseded");
            }
            previous
        };
        previous.provider.invalidate();

        info!(from = previous.index, to = index, chain_id, "Network selected");
        Ok(())
    }

    /// The read-only provider for the selected network, created on first use.
    ///
    /// # Errors
    ///
    /// Provider construction errors (bad endpoint scheme or URL).
    pub fn read_provider(&self) -> SessionResult<Arc<ChainDataProvider>> {
        let binding = self.read_binding();
        let network = self.registry.describe(binding.index)?;
        binding
            .provider
            .get_or_create(&network.rpc_url, self.config.node_timeout())
    }

    /// The connector for `backend` on the selected network, if configured.
    #[must_use]
    pub fn connector(&self, backend: BackendKind) -> Option<Arc<dyn Connector>> {
        self.bound_connector(backend).0
    }

    /// Snapshot of the session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock_inner().state.clone()
    }

    /// Log in through the injected browser wallet.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoProviderAvailable`] without touching the state if
    /// no injected provider exists; otherwise as [`WalletSession::connect`].
    pub async fn login_injected(&self) -> SessionResult<Activation> {
        self.login(BackendKind::Injected).await
    }

    /// Log in through QR-code remote signing.
    ///
    /// # Errors
    ///
    /// As [`WalletSession::connect`].
    pub async fn login_remote(&self) -> SessionResult<Activation> {
        self.login(BackendKind::RemoteSigning).await
    }

    /// Log in through the chain-specific extension.
    ///
    /// # Errors
    ///
    /// As [`WalletSession::connect`].
    pub async fn login_chain_specific(&self) -> SessionResult<Activation> {
        self.login(BackendKind::ChainSpecific).await
    }

    /// Log in through `backend` using the selected network's connector.
    ///
    /// # Errors
    ///
    /// As [`WalletSession::login_injected`] and [`WalletSession::connect`].
    pub async fn login(&self, backend: BackendKind) -> SessionResult<Activation> {
        if backend == BackendKind::Injected && self.environment.injected.is_none() {
            warn!("Injected login requested but no wallet provider is present");
            return Err(SessionError::NoProviderAvailable);
        }

        let (connector, chain_id) = self.bound_connector(backend);
        self.connect_to(connector, chain_id).await
    }

    /// Run the login algorithm against an arbitrary connector.
    ///
    /// 1. A missing connector fails with [`SessionError::MisconfiguredConnector`].
    /// 2. Otherwise the connector is activated.
    /// 3. If the wallet is on another chain, a switch to the selected
    ///    network's chain is requested and, if granted, activation is tried
    ///    exactly once more. The second result is final.
    ///
    /// A logout or network change while the login is pending supersedes it:
    /// no further switch or activation is attempted and nothing is committed.
    ///
    /// # Errors
    ///
    /// The classified activation failure, [`SessionError::NetworkSwitchFailed`],
    /// [`SessionError::LoginInProgress`] or [`SessionError::Superseded`].
    pub async fn connect(&self, connector: Option<Arc<dyn Connector>>) -> SessionResult<Activation> {
        let chain_id = self.read_binding().connectors.chain_id();
        self.connect_to(connector, chain_id).await
    }

    #[instrument(skip(self, connector), fields(backend = tracing::field::Empty))]
    async fn connect_to(
        &self,
        connector: Option<Arc<dyn Connector>>,
        target_chain_id: u64,
    ) -> SessionResult<Activation> {
        let Some(connector) = connector else {
            error!("Login requested with a missing connector");
            return Err(SessionError::MisconfiguredConnector);
        };

        let backend = connector.backend();
        tracing::Span::current().record("backend", backend.as_str());

        let generation = self.begin(backend, target_chain_id)?;
        let classify = |class: ErrorClass| SessionError::classified(backend, class, target_chain_id);

        let outcome = match connector.activate().await {
            Err(ErrorClass::UnsupportedChain { wallet_chain_id }) => {
                self.ensure_current(generation, backend)?;
                info!(
                    wallet_chain_id,
                    target_chain_id, "Wallet is on another chain; requesting a switch"
                );
                match self.switcher.request_switch(target_chain_id).await {
                    Ok(()) => {
                        self.ensure_current(generation, backend)?;
                        connector.activate().await.map_err(classify)
                    }
                    Err(e) => Err(e),
                }
            }
            first => first.map_err(classify),
        };

        self.finish(generation, backend, outcome)
    }

    fn begin(&self, backend: BackendKind, target_chain_id: u64) -> SessionResult<u64> {
        let binding = self.read_binding();
        let mut inner = self.lock_inner();
        if binding.connectors.chain_id() != target_chain_id {
            warn!(
                %backend,
                target_chain_id,
                selected_chain_id = binding.connectors.chain_id(),
                "Network changed before login started"
            );
            return Err(SessionError::Superseded { backend });
        }
        if let ConnectionStatus::Connecting(pending) = inner.state.status {
            warn!(%backend, %pending, "Login rejected: another login is pending");
            return Err(SessionError::LoginInProgress { backend: pending });
        }

        inner.generation += 1;
        inner.state = SessionState::connecting(backend);
        info!(%backend, "Connecting");
        Ok(inner.generation)
    }

    /// Fails with [`SessionError::Superseded`] if a logout or network change
    /// happened since `generation` was issued.
    fn ensure_current(&self, generation: u64, backend: BackendKind) -> SessionResult<()> {
        if self.lock_inner().generation == generation {
            Ok(())
        } else {
            warn!(%backend, "Login superseded while pending; stopping");
            Err(SessionError::Superseded { backend })
        }
    }

    fn finish(
        &self,
        generation: u64,
        backend: BackendKind,
        outcome: SessionResult<Activation>,
    ) -> SessionResult<Activation> {
        let mut inner = self.lock_inner();
        if inner.generation != generation {
            warn!(%backend, "Login resolved after a logout or network change; discarding result");
            return Err(SessionError::Superseded { backend });
        }

        match outcome {
            Ok(activation) => {
                let wallet_provider = match backend {
                    BackendKind::Injected => {
                        self.environment.injected.clone().map(WalletProvider::new)
                    }
                    _ => None,
                };
                inner.state = SessionState {
                    status: ConnectionStatus::Connected(backend),
                    activation: Some(activation.clone()),
                    wallet_provider,
                };
                info!(
                    %backend,
                    chain_id = activation.chain_id,
                    accounts = activation.accounts.len(),
                    "Connected"
                );
                Ok(activation)
            }
            Err(e) => {
                inner.state = SessionState::default();
                warn!(%backend, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Log out of `backend`.
    ///
    /// The state becomes [`ConnectionStatus::Disconnected`] first; then the
    /// backend's connector is deactivated. Deactivation failures are logged
    /// and dropped.
    #[instrument(skip(self))]
    pub async fn logout(&self, backend: BackendKind) {
        {
            let mut inner = self.lock_inner();
            inner.generation += 1;
            inner.state = SessionState::default();
        }
        info!(%backend, "Disconnected");

        match self.connector(backend) {
            Some(connector) => {
                if let Err(class) = connector.deactivate().await {
                    warn!(%backend, error = %class, "Deactivation failed; ignoring");
                }
            }
            None => debug!(%backend, "No connector configured; nothing to deactivate"),
        }
    }

    /// Log out of the injected wallet.
    pub async fn logout_injected(&self) {
        self.logout(BackendKind::Injected).await;
    }

    /// Log out of the remote signing session.
    pub async fn logout_remote(&self) {
        self.logout(BackendKind::RemoteSigning).await;
    }

    /// Log out of the chain-specific extension.
    pub async fn logout_chain_specific(&self) {
        self.logout(BackendKind::ChainSpecific).await;
    }

    /// Connector for `backend` plus the chain id it is bound to.
    fn bound_connector(&self, backend: BackendKind) -> (Option<Arc<dyn Connector>>, u64) {
        let binding = self.read_binding();
        debug_assert!(self
            .registry
            .describe(binding.index)
            .is_ok_and(|network| binding.connectors.is_bound_to(binding.index, network)));
        (binding.connectors.get(backend), binding.connectors.chain_id())
    }

    fn read_binding(&self) -> RwLockReadGuard<'_, NetworkBinding> {
        self.binding.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
