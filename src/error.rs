//! Error types for the wallet session connector.
//!
//! This module provides a unified error type [`SessionError`] covering every
//! failure that can cross the session controller boundary, and the closed
//! [`ErrorClass`] taxonomy that connector adapters map backend failures into.
//!
//! # Design
//!
//! The error hierarchy is organized by layer:
//! - [`SessionError::ConfigError`] / [`SessionError::OutOfRange`]: setup and registry misuse
//! - [`SessionError::RpcError`] / [`SessionError::ProviderTimeout`]: read-only provider failures
//! - [`SessionError::UnsupportedChain`], [`SessionError::ProviderUnavailable`],
//!   [`SessionError::UserRejected`], [`SessionError::Unknown`]: classified activation failures
//! - [`SessionError::NetworkSwitchFailed`], [`SessionError::LoginInProgress`],
//!   [`SessionError::Superseded`]: controller outcomes
//!
//! Backend-specific failures never reach callers directly. Each connector
//! adapter turns them into an [`ErrorClass`] first, and the controller turns
//! that into a [`SessionError`].
//!
//! # Example
//!
//! ```
//! use eth_wallet_connector::error::{SessionError, SessionResult};
//!
//! fn validate_timeout(timeout_ms: u64) -> SessionResult<()> {
//!     if timeout_ms == 0 {
//!         return Err(SessionError::config(
//!             "timeout must be positive",
//!             None
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use crate::connector::BackendKind;

/// Result type alias using [`SessionError`].
pub type SessionResult<T> = Result<T, SessionError>;

/// Classification of a failed connector activation.
///
/// Produced by each connector adapter from its backend's own failure type;
/// the session controller only ever looks at this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// The wallet is on a chain the connector was not configured for.
    UnsupportedChain {
        /// Chain id the wallet reported
        wallet_chain_id: u64,
    },
    /// No compatible wallet environment is reachable for this backend.
    ProviderUnavailable,
    /// The user declined the authorization prompt.
    UserRejected,
    /// Anything else, kept verbatim for diagnosis.
    Unknown {
        /// Failure name as reported by the backend
        name: String,
        /// Failure message as reported by the backend
        message: String,
    },
}

impl ErrorClass {
    /// Build an [`ErrorClass::Unknown`].
    #[must_use]
    pub fn unknown(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unknown {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedChain { wallet_chain_id } => {
                write!(f, "unsupported chain id {wallet_chain_id}")
            }
            Self::ProviderUnavailable => write!(f, "provider unavailable"),
            Self::UserRejected => write!(f, "user rejected the request"),
            Self::Unknown { name, message } => write!(f, "{name}: {message}"),
        }
    }
}

/// Unified error type for the wallet session connector.
#[derive(Debug)]
pub enum SessionError {
    /// Configuration or environment variable errors.
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A registry index that does not name a network.
    ///
    /// Programmer error; should never happen in production.
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of registry entries
        len: usize,
    },

    /// Read-only RPC provider errors.
    RpcError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// WebSocket connection errors for the read-only provider.
    WebSocketConnectionError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A read-only provider request exceeded its timeout.
    ///
    /// Transient; never retried automatically.
    ProviderTimeout {
        /// RPC method or step that timed out
        operation: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// Login was requested with an absent or unconfigured connector.
    MisconfiguredConnector,

    /// The injected wallet bridge is not present in the host environment.
    NoProviderAvailable,

    /// The wallet stayed on a chain other than the selected network's.
    UnsupportedChain {
        /// Backend that reported it
        backend: BackendKind,
        /// Chain id the wallet reported
        wallet_chain_id: u64,
        /// Chain id of the selected network
        expected_chain_id: u64,
    },

    /// No compatible wallet environment is reachable for the backend.
    ProviderUnavailable {
        /// Backend that reported it
        backend: BackendKind,
    },

    /// The user declined the authorization prompt.
    UserRejected {
        /// Backend that reported it
        backend: BackendKind,
    },

    /// Unclassified backend failure, kept verbatim.
    Unknown {
        /// Backend that reported it
        backend: BackendKind,
        /// Failure name as reported by the backend
        name: String,
        /// Failure message as reported by the backend
        message: String,
    },

    /// The wallet environment refused or could not switch chains.
    NetworkSwitchFailed {
        /// Target chain id
        chain_id: u64,
        /// Why the switch failed
        reason: String,
    },

    /// Another login is still waiting on its backend.
    LoginInProgress {
        /// Backend of the pending login
        backend: BackendKind,
    },

    /// A logout ran while this login was pending; its result was discarded.
    Superseded {
        /// Backend of the discarded login
        backend: BackendKind,
    },
}

impl SessionError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use eth_wallet_connector::error::SessionError;
    ///
    /// let err = SessionError::config("NODE_TIMEOUT_MS must be a number", None);
    /// assert!(matches!(err, SessionError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new RPC error.
    ///
    /// # Example
    ///
    /// ```
    /// use eth_wallet_connector::error::SessionError;
    ///
    /// let err = SessionError::rpc("eth_chainId failed", None);
    /// assert!(matches!(err, SessionError::RpcError { .. }));
    /// ```
    #[must_use]
    pub fn rpc(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::RpcError {
            message: message.into(),
            source,
        }
    }

    /// Create a new WebSocket connection error.
    #[must_use]
    pub fn websocket_connection(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::WebSocketConnectionError {
            message: message.into(),
            source,
        }
    }

    /// Create a provider timeout error.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use eth_wallet_connector::error::SessionError;
    ///
    /// let err = SessionError::provider_timeout("eth_blockNumber", Duration::from_millis(250));
    /// assert_eq!(err.to_string(), "Provider timeout: eth_blockNumber did not complete within 250ms");
    /// ```
    #[must_use]
    pub fn provider_timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::ProviderTimeout {
            operation: operation.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a network switch failure.
    #[must_use]
    pub fn network_switch(chain_id: u64, reason: impl Into<String>) -> Self {
        Self::NetworkSwitchFailed {
            chain_id,
            reason: reason.into(),
        }
    }

    /// Turn a connector's [`ErrorClass`] into the error surfaced to callers.
    ///
    /// # Example
    ///
    /// ```
    /// use eth_wallet_connector::connector::BackendKind;
    /// use eth_wallet_connector::error::{ErrorClass, SessionError};
    ///
    /// let err = SessionError::classified(BackendKind::RemoteSigning, ErrorClass::UserRejected, 3);
    /// assert!(matches!(err, SessionError::UserRejected { .. }));
    /// ```
    #[must_use]
    pub fn classified(backend: BackendKind, class: ErrorClass, expected_chain_id: u64) -> Self {
        match class {
            ErrorClass::UnsupportedChain { wallet_chain_id } => Self::UnsupportedChain {
                backend,
                wallet_chain_id,
                expected_chain_id,
            },
            ErrorClass::ProviderUnavailable => Self::ProviderUnavailable { backend },
            ErrorClass::UserRejected => Self::UserRejected { backend },
            ErrorClass::Unknown { name, message } => Self::Unknown {
                backend,
                name,
                message,
            },
        }
    }

    /// Message to show the user in a blocking notice, if this failure warrants one.
    ///
    /// Presentation is up to the caller. Failures that are either silent by
    /// policy (a refused network switch) or programmatic (a concurrent login)
    /// return `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use eth_wallet_connector::error::SessionError;
    ///
    /// assert_eq!(
    ///     SessionError::MisconfiguredConnector.user_notice().as_deref(),
    ///     Some("Unable to find connector: The connector config is wrong")
    /// );
    /// ```
    #[must_use]
    pub fn user_notice(&self) -> Option<String> {
        match self {
            Self::NoProviderAvailable => {
                Some("Please install a browser wallet such as MetaMask!".to_string())
            }
            Self::MisconfiguredConnector => {
                Some("Unable to find connector: The connector config is wrong".to_string())
            }
            Self::ProviderUnavailable { .. } => Some("Network Provider Error".to_string()),
            Self::UserRejected { .. } => {
                Some("Authorization Error: Please authorize to access your account".to_string())
            }
            Self::Unknown { name, message, .. } => Some(format!("{name}: {message}")),
            _ => None,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::OutOfRange { index, len } => {
                write!(f, "Network index {index} out of range (registry has {len} entries)")
            }
            Self::RpcError { message, .. } => write!(f, "RPC error: {message}"),
            Self::WebSocketConnectionError { message, .. } => {
                write!(f, "WebSocket connection error: {message}")
            }
            Self::ProviderTimeout {
                operation,
                timeout_ms,
            } => write!(
                f,
                "Provider timeout: {operation} did not complete within {timeout_ms}ms"
            ),
            Self::MisconfiguredConnector => write!(f, "Connector is missing or misconfigured"),
            Self::NoProviderAvailable => write!(f, "No injected wallet provider available"),
            Self::UnsupportedChain {
                backend,
                wallet_chain_id,
                expected_chain_id,
            } => write!(
                f,
                "{backend} wallet is on chain {wallet_chain_id}, expected chain {expected_chain_id}"
            ),
            Self::ProviderUnavailable { backend } => {
                write!(f, "{backend} wallet provider is unavailable")
            }
            Self::UserRejected { backend } => write!(f, "{backend} authorization rejected by user"),
            Self::Unknown {
                backend,
                name,
                message,
            } => write!(f, "{backend} login failed: {name}: {message}"),
            Self::NetworkSwitchFailed { chain_id, reason } => {
                write!(f, "Network switch to chain {chain_id} failed: {reason}")
            }
            Self::LoginInProgress { backend } => {
                write!(f, "A {backend} login is already in progress")
            }
            Self::Superseded { backend } => {
                write!(f, "{backend} login was superseded by a logout")
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::RpcError { source, .. }
            | Self::WebSocketConnectionError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            _ => None,
        }
    }
}

/// Convert from `eyre::Report` to `SessionError`.
///
/// Used by the WebSocket layer, which reports connection failures through
/// `eyre`. Categorized as a WebSocket connection error.
impl From<eyre::Report> for SessionError {
    fn from(err: eyre::Report) -> Self {
        Self::WebSocketConnectionError {
            message: err.to_string(),
            source: None,
        }
    }
}
