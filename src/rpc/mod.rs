//! Read-only chain-data providers.
//!
//! This module turns a network's RPC endpoint into a provider for reading
//! chain state. It is independent of any wallet: nothing here can sign.
//!
//! # Provider Types
//!
//! - **HTTP Provider** ([`http`]): request/response, for `http(s)://` endpoints
//! - **WebSocket Provider** ([`websocket`]): persistent socket, for `ws(s)://` endpoints
//! - **Cache** ([`cache`]): the per-network singleton, dropped on network change
//!
//! # Architecture
//!
//! ```text
//!        create_provider(endpoint, timeout)
//!                     │
//!           scheme ───┼─── http(s) ──► HttpProvider
//!                     └─── ws(s)  ──► WebSocketProvider (connects on first read)
//!                     │
//!            ChainDataProvider (every read bounded by timeout)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use eth_wallet_connector::rpc::create_provider;
//!
//! # async fn example() -> eth_wallet_connector::error::SessionResult<()> {
//! let provider = create_provider("https://data-seed-prebsc-1-s1.binance.org:8545", Duration::from_secs(10))?;
//! let block = provider.block_number().await?;
//! println!("Latest block: {block}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod http;
pub mod provider;
pub mod websocket;

// Re-export commonly used types
pub use cache::ProviderCache;
pub use http::HttpProvider;
pub use provider::{create_provider, ChainDataProvider, Transport};
pub use websocket::WebSocketProvider;
