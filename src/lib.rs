//! # Ethereum Wallet Connector
//!
//! Connection manager for browser-wallet style logins, built on
//! [Alloy](https://github.com/alloy-rs/alloy) and Tokio.
//!
//! An application picks one of several configured networks and logs in
//! through one of three wallet backends:
//!
//! - **injected**: an EIP-1193 provider such as MetaMask
//! - **remote-signing**: a QR-code pairing session with a mobile wallet
//! - **chain-specific**: a chain vendor's own extension
//!
//! Every backend is driven through the same login/logout surface and every
//! failure is reduced to a small set of error kinds with a user-facing
//! notice. A wallet sitting on the wrong chain is asked to switch, and the
//! login is retried once.
//!
//! ## Architecture
//!
//! 1. **Network layer** ([`network`]) - the registry of supported networks
//! 2. **RPC layer** ([`rpc`]) - timeout-bounded read-only providers
//! 3. **Bridge layer** ([`bridge`]) - traits for the wallet SDKs
//! 4. **Connector layer** ([`connector`]) - one adapter per backend, per network
//! 5. **Switch layer** ([`switch`]) - `wallet_switchEthereumChain` requests
//! 6. **Session layer** ([`session`]) - the login state machine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use eth_wallet_connector::bridge::{WalletBridge, WalletEnvironment};
//! use eth_wallet_connector::config::Config;
//! use eth_wallet_connector::session::WalletSession;
//!
//! # async fn example(metamask: Arc<dyn WalletBridge>) -> eth_wallet_connector::error::SessionResult<()> {
//! let config = Config::from_env()?;
//! let registry = config.load_registry()?;
//! let environment = WalletEnvironment::empty().with_injected(metamask);
//!
//! let session = WalletSession::new(registry, config, environment)?;
//! let activation = session.login_injected().await?;
//! println!("logged in on chain {}", activation.chain_id);
//!
//! let block = session.read_provider()?.block_number().await?;
//! println!("latest block {block}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`error::SessionResult<T>`](error::SessionResult).
//! [`SessionError::user_notice`](error::SessionError::user_notice) gives the
//! text to show the user, if the error has one.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod cli;
pub mod config;
pub mod connector;
pub mod error;
pub mod network;
pub mod observability;
pub mod rpc;
pub mod session;
pub mod switch;
