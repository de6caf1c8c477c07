//! Registry of supported networks.
//!
//! The registry is a fixed table of [`NetworkDescriptor`]s indexed by
//! position. It is built once at startup, either from the builtin table or
//! from a JSON file, and never mutated afterwards.
//!
//! ## Example
//!
//! ```
//! use eth_wallet_connector::network::NetworkRegistry;
//!
//! let registry = NetworkRegistry::builtin();
//! let ropsten = registry.describe(0).unwrap();
//! assert_eq!(ropsten.chain_id, 3);
//! assert_eq!(ropsten.chain_id_hex(), "0x3");
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Native currency of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Ticker symbol, e.g. `ETH`
    pub symbol: String,
    /// Number of decimals of the smallest unit
    pub decimals: u8,
}

/// Connection parameters and display metadata for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    /// EIP-155 chain id
    pub chain_id: u64,
    /// JSON-RPC endpoint (`http(s)://` or `ws(s)://`)
    pub rpc_url: String,
    /// Human-readable network name
    pub name: String,
    /// Short network name
    pub short_name: String,
    /// Native currency
    pub currency: NativeCurrency,
    /// Block explorer base URL
    pub explorer_url: String,
}

impl NetworkDescriptor {
    /// Chain id in the form wallets expect for `wallet_switchEthereumChain`.
    ///
    /// Lowercase hex with a `0x` prefix and no leading zeros.
    #[must_use]
    pub fn chain_id_hex(&self) -> String {
        chain_id_hex(self.chain_id)
    }

    /// Explorer link for a transaction hash.
    #[must_use]
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url.trim_end_matches('/'))
    }
}

/// Format a chain id as `0x`-prefixed lowercase hex.
#[must_use]
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

/// Immutable table of supported networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: Vec<NetworkDescriptor>,
}

impl NetworkRegistry {
    /// Build a registry from a list of networks.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the list is empty or two entries
    /// share a chain id.
    pub fn new(networks: Vec<NetworkDescriptor>) -> SessionResult<Self> {
        if networks.is_empty() {
            return Err(SessionError::config(
                "network registry must contain at least one network",
                None,
            ));
        }

        let mut seen = HashSet::with_capacity(networks.len());
        for network in &networks {
            if !seen.insert(network.chain_id) {
                return Err(SessionError::config(
                    format!("duplicate chain id {} in network registry", network.chain_id),
                    None,
                ));
            }
        }

        Ok(Self { networks })
    }

    /// Parse a JSON array of networks.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on malformed JSON or an invalid list.
    pub fn from_json(json: &str) -> SessionResult<Self> {
        let networks: Vec<NetworkDescriptor> = serde_json::from_str(json).map_err(|e| {
            SessionError::config("failed to parse network registry JSON", Some(Box::new(e)))
        })?;
        Self::new(networks)
    }

    /// The networks this application ships with.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            networks: vec![
                NetworkDescriptor {
                    chain_id: 3,
                    rpc_url: "https://ropsten.infura.io/v3/9aa3d95b3bc440fa88ea12eaa4456161"
                        .to_string(),
                    name: "Ropsten Test Network".to_string(),
                    short_name: "RPS".to_string(),
                    currency: NativeCurrency {
                        symbol: "ETH".to_string(),
                        decimals: 18,
                    },
                    explorer_url: "https://ropsten.etherscan.io/".to_string(),
                },
                NetworkDescriptor {
                    chain_id: 97,
                    rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545".to_string(),
                    name: "Bnb Chain Test net".to_string(),
                    short_name: "RPS".to_string(),
                    currency: NativeCurrency {
                        symbol: "BNB".to_string(),
                        decimals: 18,
                    },
                    explorer_url: "https://testnet.bscscan.com/".to_string(),
                },
            ],
        }
    }

    /// Look up a network by registry index.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutOfRange`] if `index` is not a registry entry.
    pub fn describe(&self, index: usize) -> SessionResult<&NetworkDescriptor> {
        self.networks.get(index).ok_or(SessionError::OutOfRange {
            index,
            len: self.networks.len(),
        })
    }

    /// Registry index of the network with `chain_id`, if any.
    #[must_use]
    pub fn position_of(&self, chain_id: u64) -> Option<usize> {
        self.networks.iter().position(|n| n.chain_id == chain_id)
    }

    /// Number of networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Always false; a registry has at least one network.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Iterate networks in index order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkDescriptor> {
        self.networks.iter()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
