//! HTTP transport for the read-only chain-data provider.
//!
//! Uses Alloy's `ProviderBuilder` over a plain request/response HTTP
//! transport. Building the provider performs no network I/O; the first
//! request opens the connection.

use crate::error::{SessionError, SessionResult};
use alloy::providers::{ProviderBuilder, RootProvider};
use alloy::transports::http::reqwest::Url;
use alloy::transports::http::{Client, Http};
use tracing::{debug, instrument};

/// Type alias for the HTTP provider.
pub type HttpProvider = RootProvider<Http<Client>>;

/// Create an Ethereum RPC provider over HTTP.
///
/// # Arguments
///
/// * `rpc_url` - The HTTP(S) endpoint URL of the node
///
/// # Errors
///
/// Returns an RPC error if the URL does not parse.
///
/// # Example
///
/// ```
/// use eth_wallet_connector::rpc::http::create_http_provider;
///
/// let provider = create_http_provider("https://data-seed-prebsc-1-s1.binance.org:8545");
/// assert!(provider.is_ok());
/// ```
#[instrument(skip(rpc_url), fields(rpc_host = tracing::field::Empty))]
pub fn create_http_provider(rpc_url: &str) -> SessionResult<HttpProvider> {
    let url: Url = rpc_url.parse().map_err(|e| {
        SessionError::rpc(
            format!("Failed to parse RPC URL: '{}'", redact_endpoint(rpc_url)),
            Some(Box::new(e)),
        )
    })?;

    let host = url.host_str().unwrap_or("unknown").to_string();
    tracing::Span::current().record("rpc_host", host.as_str());
    debug!(rpc_host = %host, "Creating HTTP provider");

    Ok(ProviderBuilder::new().on_http(url))
}

/// Strip the path (which often carries an API key) from an endpoint for logging.
#[must_use]
pub fn redact_endpoint(endpoint: &str) -> String {
    match endpoint.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{scheme}://{host}")
        }
        None => "unknown".to_string(),
    }
}
