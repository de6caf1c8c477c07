//! Read-only chain-data provider with a uniform timeout contract.
//!
//! [`create_provider`] picks the transport from the endpoint scheme and
//! returns a [`ChainDataProvider`] without touching the network. Every read
//! through it is bounded by the configured timeout, including the lazy
//! WebSocket handshake.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use tracing::{debug, instrument, warn};

use super::http::{create_http_provider, redact_endpoint, HttpProvider};
use super::websocket::WebSocketProvider;
use crate::error::{SessionError, SessionResult};

/// Transport selected for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Request/response over `http://` or `https://`
    Http,
    /// Persistent socket over `ws://` or `wss://`
    WebSocket,
}

impl Transport {
    /// Select the transport from the endpoint scheme.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for any other scheme.
    ///
    /// # Example
    ///
    /// ```
    /// use eth_wallet_connector::rpc::Transport;
    ///
    /// assert_eq!(Transport::for_endpoint("wss://node/ws").ok(), Some(Transport::WebSocket));
    /// assert_eq!(Transport::for_endpoint("https://node").ok(), Some(Transport::Http));
    /// assert!(Transport::for_endpoint("ftp://node").is_err());
    /// ```
    pub fn for_endpoint(endpoint: &str) -> SessionResult<Self> {
        let scheme = endpoint
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase());

        match scheme.as_deref() {
            Some("ws" | "wss") => Ok(Self::WebSocket),
            Some("http" | "https") => Ok(Self::Http),
            _ => Err(SessionError::config(
                format!(
                    "unsupported RPC endpoint scheme: '{}'",
                    redact_endpoint(endpoint)
                ),
                None,
            )),
        }
    }
}

enum Backend {
    Http(HttpProvider),
    WebSocket(WebSocketProvider),
}

/// Read-only provider for chain state on one network.
pub struct ChainDataProvider {
    endpoint: String,
    timeout: Duration,
    backend: Backend,
}

/// Build a read-only provider for `endpoint`.
///
/// Performs no network I/O.
///
/// # Errors
///
/// Returns a configuration error for an unsupported scheme and an RPC error
/// for an HTTP URL that does not parse.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use eth_wallet_connector::rpc::{create_provider, Transport};
///
/// let provider = create_provider("wss://bsc.example/ws", Duration::from_secs(10)).unwrap();
/// assert_eq!(provider.transport(), Transport::WebSocket);
/// ```
pub fn create_provider(endpoint: &str, timeout: Duration) -> SessionResult<ChainDataProvider> {
    let transport = Transport::for_endpoint(endpoint)?;
    debug!(
        endpoint = %redact_endpoint(endpoint),
        ?transport,
        timeout_ms = timeout.as_millis(),
        "Creating read-only provider"
    );

    let backend = match transport {
        Transport::Http => Backend::Http(create_http_provider(endpoint)?),
        Transport::WebSocket => Backend::WebSocket(WebSocketProvider::new(endpoint.to_string())),
    };

    Ok(ChainDataProvider {
        endpoint: endpoint.to_string(),
        timeout,
        backend,
    })
}

impl ChainDataProvider {
    /// Endpoint this provider reads from.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Transport in use.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        match self.backend {
            Backend::Http(_) => Transport::Http,
            Backend::WebSocket(_) => Transport::WebSocket,
        }
    }

    /// Chain id reported by the node.
    ///
    /// # Errors
    ///
    /// [`SessionError::ProviderTimeout`] past the timeout, otherwise an RPC
    /// or WebSocket connection error.
    #[instrument(skip(self), fields(endpoint = %redact_endpoint(&self.endpoint)))]
    pub async fn chain_id(&self) -> SessionResult<u64> {
        self.bounded("eth_chainId", async {
            let result = match &self.backend {
                Backend::Http(p) => p.get_chain_id().await,
                Backend::WebSocket(ws) => ws.provider().await?.get_chain_id().await,
            };
            result.map_err(|e| SessionError::rpc("eth_chainId request failed", Some(Box::new(e))))
        })
        .await
    }

    /// Latest block number.
    ///
    /// # Errors
    ///
    /// Same as [`ChainDataProvider::chain_id`].
    #[instrument(skip(self), fields(endpoint = %redact_endpoint(&self.endpoint)))]
    pub async fn block_number(&self) -> SessionResult<u64> {
        self.bounded("eth_blockNumber", async {
            let result = match &self.backend {
                Backend::Http(p) => p.get_block_number().await,
                Backend::WebSocket(ws) => ws.provider().await?.get_block_number().await,
            };
            result.map_err(|e| {
                SessionError::rpc("eth_blockNumber request failed", Some(Box::new(e)))
            })
        })
        .await
    }

    /// Native-currency balance of `address` at the latest block.
    ///
    /// # Errors
    ///
    /// Same as [`ChainDataProvider::chain_id`].
    #[instrument(skip(self), fields(endpoint = %redact_endpoint(&self.endpoint)))]
    pub async fn balance(&self, address: Address) -> SessionResult<U256> {
        self.bounded("eth_getBalance", async {
            let result = match &self.backend {
                Backend::Http(p) => p.get_balance(address).await,
                Backend::WebSocket(ws) => ws.provider().await?.get_balance(address).await,
            };
            result.map_err(|e| SessionError::rpc("eth_getBalance request failed", Some(Box::new(e))))
        })
        .await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        request: impl Future<Output = SessionResult<T>>,
    ) -> SessionResult<T> {
        let start = std::time::Instant::now();
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => {
                debug!(
                    operation,
                    duration_ms = start.elapsed().as_millis(),
                    ok = result.is_ok(),
                    "Provider request finished"
                );
                result
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis(),
                    "Provider request timed out"
                );
                Err(SessionError::provider_timeout(operation, self.timeout))
            }
        }
    }
}

impl std::fmt::Debug for ChainDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainDataProvider")
            .field("endpoint", &redact_endpoint(&self.endpoint))
            .field("transport", &self.transport())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_selection() {
        assert_eq!(
            Transport::for_endpoint("https://ropsten.infura.io/v3/key").ok(),
            Some(Transport::Http)
        );
        assert_eq!(
            Transport::for_endpoint("http://localhost:8545").ok(),
            Some(Transport::Http)
        );
        assert_eq!(
            Transport::for_endpoint("wss://ropsten.infura.io/ws/v3/key").ok(),
            Some(Transport::WebSocket)
        );
        assert_eq!(
            Transport::for_endpoint("WS://localhost:8546").ok(),
            Some(Transport::WebSocket)
        );
        assert!(Transport::for_endpoint("localhost:8545").is_err());
    }

    #[test]
    fn test_create_provider_keeps_timeout() {
        let provider = create_provider("http://localhost:8545", Duration::from_millis(1500));
        assert!(provider.is_ok());
        if let Ok(provider) = provider {
            assert_eq!(provider.timeout(), Duration::from_millis(1500));
            assert_eq!(provider.transport(), Transport::Http);
            assert_eq!(provider.endpoint(), "http://localhost:8545");
        }
    }

    #[test]
    fn test_create_provider_rejects_unknown_scheme() {
        let result = create_provider("ipc:///tmp/geth.ipc", Duration::from_secs(1));
        assert!(matches!(result, Err(SessionError::ConfigError { .. })));
    }
}
