//! Configuration management for the wallet session connector.
//!
//! This module handles loading and validating configuration from environment variables
//! using the `dotenvy` crate. All operations return [`SessionResult`] for comprehensive
//! error handling.
//!
//! ## Environment Variables
//!
//! Optional (with defaults):
//! - `DEFAULT_NETWORK`: Registry index selected at startup (default: 0)
//! - `NODE_TIMEOUT_MS`: Read-only provider request timeout (default: 10000)
//! - `REMOTE_SIGNING_QRCODE`: Show the QR code modal for remote signing (default: true)
//! - `REMOTE_SIGNING_POLLING_INTERVAL_MS`: Remote signing polling interval (default: 12000)
//! - `NETWORKS_FILE`: JSON file replacing the builtin network list
//! - `RUST_LOG`: Logging level (default: "info")
//!
//! ## Example
//!
//! ```no_run
//! use eth_wallet_connector::config::Config;
//! use eth_wallet_connector::error::SessionResult;
//!
//! # fn main() -> SessionResult<()> {
//! let config = Config::from_env()?;
//! let registry = config.load_registry()?;
//! println!("{} networks, default #{}", registry.len(), config.default_network());
//! # Ok(())
//! # }
//! ```

use crate::error::{SessionError, SessionResult};
use crate::network::NetworkRegistry;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_NODE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_POLLING_INTERVAL_MS: u64 = 12_000;

/// Runtime configuration for the session controller and provider factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Registry index selected at startup
    default_network: usize,

    /// Read-only provider request timeout
    node_timeout: Duration,

    /// Show the QR code modal when opening a remote signing session
    remote_qrcode: bool,

    /// Remote signing bridge polling interval
    remote_polling_interval: Duration,

    /// Optional JSON network list
    networks_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_network: 0,
            node_timeout: Duration::from_millis(DEFAULT_NODE_TIMEOUT_MS),
            remote_qrcode: true,
            remote_polling_interval: Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS),
            networks_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This function:
    /// 1. Loads `.env` file using `dotenvy` (if present)
    /// 2. Reads and validates all environment variables
    /// 3. Applies defaults for unset variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse,
    /// or if `NODE_TIMEOUT_MS` is zero.
    pub fn from_env() -> SessionResult<Self> {
        // Load .env file if present (ignore error if file doesn't exist)
        dotenvy::dotenv().ok();

        let default_network = env::var("DEFAULT_NETWORK")
            .unwrap_or_else(|_| "0".to_string())
            .parse::<usize>()
            .map_err(|e| {
                SessionError::config(
                    "DEFAULT_NETWORK must be a registry index",
                    Some(Box::new(e)),
                )
            })?;

        let node_timeout_ms = env::var("NODE_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_NODE_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                SessionError::config("NODE_TIMEOUT_MS must be a valid number", Some(Box::new(e)))
            })?;

        if node_timeout_ms == 0 {
            return Err(SessionError::config(
                "NODE_TIMEOUT_MS must be greater than zero",
                None,
            ));
        }

        let remote_qrcode = env::var("REMOTE_SIGNING_QRCODE")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|e| {
                SessionError::config(
                    "REMOTE_SIGNING_QRCODE must be 'true' or 'false'",
                    Some(Box::new(e)),
                )
            })?;

        let polling_ms = env::var("REMOTE_SIGNING_POLLING_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLLING_INTERVAL_MS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                SessionError::config(
                    "REMOTE_SIGNING_POLLING_INTERVAL_MS must be a valid number",
                    Some(Box::new(e)),
                )
            })?;

        let networks_file = env::var("NETWORKS_FILE").ok().map(PathBuf::from);

        Ok(Self {
            default_network,
            node_timeout: Duration::from_millis(node_timeout_ms),
            remote_qrcode,
            remote_polling_interval: Duration::from_millis(polling_ms),
            networks_file,
        })
    }

    /// Override the startup network index.
    #[must_use]
    pub const fn with_default_network(mut self, index: usize) -> Self {
        self.default_network = index;
        self
    }

    /// Override the read-only provider timeout.
    #[must_use]
    pub const fn with_node_timeout(mut self, timeout: Duration) -> Self {
        self.node_timeout = timeout;
        self
    }

    /// Override the network list file.
    #[must_use]
    pub fn with_networks_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.networks_file = Some(path.into());
        self
    }

    /// Build the network registry: the JSON file if configured, else the builtin table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn load_registry(&self) -> SessionResult<NetworkRegistry> {
        match &self.networks_file {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    SessionError::config(
                        format!("failed to read NETWORKS_FILE {}", path.display()),
                        Some(Box::new(e)),
                    )
                })?;
                NetworkRegistry::from_json(&json)
            }
            None => Ok(NetworkRegistry::builtin()),
        }
    }

    /// Get the startup network index.
    #[must_use]
    pub const fn default_network(&self) -> usize {
        self.default_network
    }

    /// Get the read-only provider timeout.
    #[must_use]
    pub const fn node_timeout(&self) -> Duration {
        self.node_timeout
    }

    /// Check if the remote signing QR modal is enabled.
    #[must_use]
    pub const fn remote_qrcode(&self) -> bool {
        self.remote_qrcode
    }

    /// Get the remote signing polling interval.
    #[must_use]
    pub const fn remote_polling_interval(&self) -> Duration {
        self.remote_polling_interval
    }

    /// Get the network list file, if any.
    #[must_use]
    pub const fn networks_file(&self) -> Option<&PathBuf> {
        self.networks_file.as_ref()
    }
}
