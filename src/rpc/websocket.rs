//! WebSocket transport for the read-only chain-data provider.
//!
//! The socket is opened lazily: [`WebSocketProvider::new`] only records the
//! endpoint, and the first call to [`WebSocketProvider::provider`] performs the
//! handshake. Concurrent first callers share one connection attempt.
//!
//! # Example
//!
//! ```no_run
//! use eth_wallet_connector::rpc::websocket::WebSocketProvider;
//! use alloy::providers::Provider;
//!
//! # async fn example() -> eth_wallet_connector::error::SessionResult<()> {
//! let ws = WebSocketProvider::new("wss://bsc.example/ws".to_string());
//! assert!(!ws.is_connected());
//!
//! let block = ws.provider().await?.get_block_number().await;
//! # Ok(())
//! # }
//! ```

use alloy::{
    providers::{ProviderBuilder, RootProvider},
    transports::BoxTransport,
};
use eyre::Result;
use tokio::sync::OnceCell;
use tracing::{error, info, instrument};

use super::http::redact_endpoint;
use crate::error::SessionResult;

/// Persistent-socket provider, connected on first use.
pub struct WebSocketProvider {
    url: String,
    provider: OnceCell<RootProvider<BoxTransport>>,
}

impl WebSocketProvider {
    /// Record a WebSocket endpoint without connecting.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            url,
            provider: OnceCell::new(),
        }
    }

    /// Returns the connected Alloy provider, connecting first if needed.
    ///
    /// # Errors
    ///
    /// Returns a WebSocket connection error if the handshake fails. A failed
    /// attempt is not cached; the next call tries again.
    pub async fn provider(&self) -> SessionResult<&RootProvider<BoxTransport>> {
        let provider = self
            .provider
            .get_or_try_init(|| connect(&self.url))
            .await?;
        Ok(provider)
    }

    /// Whether the handshake has completed.
    pub fn is_connected(&self) -> bool {
        self.provider.initialized()
    }

    /// Returns the WebSocket URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for WebSocketProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketProvider")
            .field("url", &redact_endpoint(&self.url))
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[instrument(skip(ws_url), fields(ws_host = tracing::field::Empty, duration_ms = tracing::field::Empty))]
async fn connect(ws_url: &str) -> Result<RootProvider<BoxTransport>> {
    let host = redact_endpoint(ws_url);
    tracing::Span::current().record("ws_host", host.as_str());

    info!(ws_host = %host, "Connecting to WebSocket");

    let start = std::time::Instant::now();

    let provider = ProviderBuilder::new()
        .on_builtin(ws_url)
        .await
        .map_err(|e| {
            error!(error = %e, ws_host = %host, "WebSocket connection failed");
            eyre::eyre!("WebSocket connection to {} failed: {}", host, e)
        })?;

    let duration = start.elapsed();
    tracing::Span::current().record("duration_ms", duration.as_millis() as u64);

    info!(
        ws_host = %host,
        duration_ms = duration.as_millis(),
        "WebSocket connected successfully"
    );

    Ok(provider)
}
