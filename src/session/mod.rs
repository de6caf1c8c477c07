//! Wallet session controller.
//!
//! [`WalletSession`] is the one object the application talks to: it holds
//! the selected network, the connectors bound to it, the cached read-only
//! provider, and the login state machine.
//!
//! ## States
//!
//! ```text
//!                 login(b)                 activation ok
//! Disconnected ─────────────► Connecting(b) ─────────────► Connected(b)
//!      ▲                           │                            │
//!      │      failure / logout     │          logout            │
//!      └───────────────────────────┴────────────────────────────┘
//! ```
//!
//! A wallet on the wrong chain gets one network switch request and, if the
//! wallet accepts, one more activation attempt.

mod controller;
mod state;

pub use controller::WalletSession;
pub use state::{ConnectionStatus, SessionState, WalletProvider};
