//! Integration tests for the wallet session controller.
//!
//! Covers the login/logout state machine end to end: the switch-then-retry
//! recovery for wallets on the wrong chain, failure classification and user
//! notices, network changes, and overlapping login/logout calls.
//!
//! Wallet SDKs are replaced by the scripted doubles in `common`.

mod common;

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Notify;

use common::{
    activation, session_with, CountingSwitcher, MockRemoteBridge, MockWalletBridge,
    ScriptedConnector, ALICE,
};
use eth_wallet_connector::bridge::WalletEnvironment;
use eth_wallet_connector::connector::{Activation, BackendKind, Connector};
use eth_wallet_connector::error::{ErrorClass, SessionError};
use eth_wallet_connector::session::ConnectionStatus;

fn injected_environment(wallet: &Arc<MockWalletBridge>) -> WalletEnvironment {
    WalletEnvironment::empty().with_injected(wallet.clone())
}

/// A wallet on the wrong chain is asked to switch once and activation is
/// retried once.
#[tokio::test]
async fn test_wrong_chain_switches_then_retries_once() {
    let wallet = Arc::new(MockWalletBridge::on_chain(97));
    let session = session_with(injected_environment(&wallet));

    let result = session.login_injected().await.unwrap();

    assert_eq!(result.chain_id, 3);
    assert_eq!(result.accounts, vec![ALICE]);
    assert_eq!(wallet.current_chain(), 3);
    assert_eq!(
        wallet.methods(),
        vec![
            "eth_requestAccounts",
            "eth_chainId",
            "wallet_switchEthereumChain",
            "eth_requestAccounts",
            "eth_chainId",
        ]
    );

    let state = session.state();
    assert_eq!(state.status, ConnectionStatus::Connected(BackendKind::Injected));
    assert!(state.wallet_provider.is_some());
}

/// The switch request carries the selected chain as unpadded lowercase hex.
#[tokio::test]
async fn test_switch_payload_uses_selected_chain() {
    let wallet = Arc::new(MockWalletBridge::on_chain(97));
    let session = session_with(injected_environment(&wallet));

    session.login_injected().await.unwrap();

    let switch = wallet
        .requests()
        .into_iter()
        .find(|r| r.method == "wallet_switchEthereumChain")
        .unwrap();
    assert_eq!(switch.params, json!([{ "chainId": "0x3" }]));
}

/// A wallet that accepts the switch but stays put fails after exactly one
/// retry; the second failure is what the caller sees.
#[tokio::test]
async fn test_retry_result_is_final() {
    let wallet = Arc::new(MockWalletBridge::on_chain(97).ignoring_switch());
    let session = session_with(injected_environment(&wallet));

    let err = session.login_injected().await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::UnsupportedChain {
            backend: BackendKind::Injected,
            wallet_chain_id: 97,
            expected_chain_id: 3,
        }
    ));
    let switches = wallet
        .methods()
        .into_iter()
        .filter(|m| m == "wallet_switchEthereumChain")
        .count();
    assert_eq!(switches, 1);
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

/// A refused switch ends the login without a retry.
#[tokio::test]
async fn test_refused_switch_disconnects_without_retry() {
    let wallet = Arc::new(MockWalletBridge::on_chain(97).refusing_switch());
    let session = session_with(injected_environment(&wallet));

    let err = session.login_injected().await.unwrap_err();

    assert!(matches!(err, SessionError::NetworkSwitchFailed { chain_id: 3, .. }));
    assert!(err.user_notice().is_none());
    assert_eq!(
        wallet.methods(),
        vec!["eth_requestAccounts", "eth_chainId", "wallet_switchEthereumChain"]
    );
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_switch_failure_with_scripted_connector() {
    let switcher = Arc::new(CountingSwitcher::failing());
    let session = session_with(WalletEnvironment::empty()).with_switcher(switcher.clone());
    let connector = Arc::new(ScriptedConnector::new(
        BackendKind::ChainSpecific,
        [Err(ErrorClass::UnsupportedChain { wallet_chain_id: 56 })],
    ));

    let err = session.connect(Some(connector.clone())).await.unwrap_err();

    assert!(matches!(err, SessionError::NetworkSwitchFailed { .. }));
    assert_eq!(connector.activation_count(), 1);
    assert_eq!(switcher.requests(), vec![3]);
}

/// Whatever the retry reports is surfaced as-is, with its own notice.
#[tokio::test]
async fn test_retry_failure_is_reclassified() {
    let switcher = Arc::new(CountingSwitcher::succeeding());
    let session = session_with(WalletEnvironment::empty()).with_switcher(switcher.clone());
    let connector = Arc::new(ScriptedConnector::new(
        BackendKind::RemoteSigning,
        [
            Err(ErrorClass::UnsupportedChain { wallet_chain_id: 1 }),
            Err(ErrorClass::UserRejected),
        ],
    ));

    let err = session.connect(Some(connector.clone())).await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::UserRejected {
            backend: BackendKind::RemoteSigning
        }
    ));
    assert_eq!(
        err.user_notice().as_deref(),
        Some("Authorization Error: Please authorize to access your account")
    );
    assert_eq!(connector.activation_count(), 2);
    assert_eq!(switcher.requests(), vec![3]);
}

#[tokio::test]
async fn test_absent_connector_is_misconfigured() {
    let switcher = Arc::new(CountingSwitcher::succeeding());
    let session = session_with(WalletEnvironment::empty()).with_switcher(switcher.clone());

    let err = session.connect(None).await.unwrap_err();

    assert!(matches!(err, SessionError::MisconfiguredConnector));
    assert_eq!(
        err.user_notice().as_deref(),
        Some("Unable to find connector: The connector config is wrong")
    );
    assert!(switcher.requests().is_empty());
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_injected_login_without_wallet() {
    let switcher = Arc::new(CountingSwitcher::succeeding());
    let session = session_with(WalletEnvironment::empty()).with_switcher(switcher.clone());

    let err = session.login_injected().await.unwrap_err();

    assert!(matches!(err, SessionError::NoProviderAvailable));
    assert!(err.user_notice().is_some());
    assert!(switcher.requests().is_empty());
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_user_rejection_notice() {
    let wallet = Arc::new(MockWalletBridge::on_chain(3).rejecting_accounts());
    let session = session_with(injected_environment(&wallet));

    let err = session.login_injected().await.unwrap_err();

    assert!(matches!(err, SessionError::UserRejected { .. }));
    assert_eq!(wallet.methods(), vec!["eth_requestAccounts"]);
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_unknown_failure_notice_is_verbatim() {
    let session = session_with(WalletEnvironment::empty());
    let connector = Arc::new(ScriptedConnector::new(
        BackendKind::ChainSpecific,
        [Err(ErrorClass::unknown("TypeError", "window.BinanceChain is undefined"))],
    ));

    let err = session.connect(Some(connector)).await.unwrap_err();

    assert_eq!(
        err.user_notice().as_deref(),
        Some("TypeError: window.BinanceChain is undefined")
    );
}

#[tokio::test]
async fn test_provider_unavailable_notice() {
    let session = session_with(WalletEnvironment::empty());
    let connector = Arc::new(ScriptedConnector::new(
        BackendKind::Injected,
        [Err(ErrorClass::ProviderUnavailable)],
    ));

    let err = session.connect(Some(connector)).await.unwrap_err();

    assert_eq!(err.user_notice().as_deref(), Some("Network Provider Error"));
}

/// Remote signing routes the selected chain to its RPC endpoint, and a
/// failing disconnect does not stop logout.
#[tokio::test]
async fn test_remote_login_and_failing_logout() {
    let remote = Arc::new(MockRemoteBridge::on_chain(3));
    let session = session_with(WalletEnvironment::empty().with_remote_signing(remote.clone()));

    let result = session.login_remote().await.unwrap();
    assert_eq!(result.backend, BackendKind::RemoteSigning);

    let requests = remote.connect_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].rpc,
        BTreeMap::from([(
            3,
            "https://ropsten.infura.io/v3/9aa3d95b3bc440fa88ea12eaa4456161".to_string()
        )])
    );
    assert!(requests[0].qrcode);
    assert_eq!(requests[0].polling_interval, Duration::from_millis(12_000));

    let state = session.state();
    assert_eq!(state.status, ConnectionStatus::Connected(BackendKind::RemoteSigning));
    assert!(state.wallet_provider.is_none());

    session.logout_remote().await;

    assert_eq!(remote.disconnects.load(Ordering::SeqCst), 1);
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_logout_with_failing_deactivate_still_disconnects() {
    let session = session_with(WalletEnvironment::empty());
    let connector = Arc::new(
        ScriptedConnector::new(
            BackendKind::ChainSpecific,
            [Ok(activation(BackendKind::ChainSpecific, 3))],
        )
        .failing_deactivate(ErrorClass::unknown("Error", "already closed")),
    );

    session.connect(Some(connector)).await.unwrap();
    assert!(session.state().is_connected());

    session.logout(BackendKind::ChainSpecific).await;
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
    assert!(session.state().activation.is_none());
}

#[tokio::test]
async fn test_logout_when_disconnected_is_harmless() {
    let session = session_with(WalletEnvironment::empty());

    session.logout_injected().await;
    session.logout_remote().await;
    session.logout_chain_specific().await;

    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

/// After a network change the connectors accept only the new chain, and a
/// wallet already on it logs in without a switch.
#[tokio::test]
async fn test_network_change_rebinds_connectors() {
    let wallet = Arc::new(MockWalletBridge::on_chain(97));
    let session = session_with(injected_environment(&wallet));

    session.select_network(1).unwrap();

    for backend in [BackendKind::Injected, BackendKind::ChainSpecific] {
        let connector = session.connector(backend).unwrap();
        assert_eq!(connector.supported_chain_ids(), vec![97]);
    }
    assert!(session.connector(BackendKind::RemoteSigning).is_none());

    let result = session.login_injected().await.unwrap();
    assert_eq!(result.chain_id, 97);
    assert_eq!(wallet.methods(), vec!["eth_requestAccounts", "eth_chainId"]);
}

/// Changing network does not end an established session.
#[tokio::test]
async fn test_network_change_keeps_session() {
    let wallet = Arc::new(MockWalletBridge::on_chain(3));
    let session = session_with(injected_environment(&wallet));

    session.login_injected().await.unwrap();
    session.select_network(1).unwrap();

    assert_eq!(
        session.state().status,
        ConnectionStatus::Connected(BackendKind::Injected)
    );
    assert_eq!(session.current_network().unwrap().chain_id, 97);
}

#[tokio::test]
async fn test_second_login_while_connecting_is_rejected() {
    let session = Arc::new(session_with(WalletEnvironment::empty()));
    let gate = Arc::new(Notify::new());
    let connector = Arc::new(
        ScriptedConnector::new(
            BackendKind::ChainSpecific,
            [Ok(activation(BackendKind::ChainSpecific, 3))],
        )
        .gated(gate.clone()),
    );

    let pending = tokio::spawn({
        let session = session.clone();
        let connector: Arc<dyn Connector> = connector.clone();
        async move { session.connect(Some(connector)).await }
    });
    connector.started.notified().await;

    assert_eq!(
        session.state().status,
        ConnectionStatus::Connecting(BackendKind::ChainSpecific)
    );
    let other = Arc::new(ScriptedConnector::new(
        BackendKind::RemoteSigning,
        Vec::<Result<Activation, ErrorClass>>::new(),
    ));
    let err = session.connect(Some(other.clone())).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::LoginInProgress {
            backend: BackendKind::ChainSpecific
        }
    ));
    assert_eq!(other.activation_count(), 0);

    gate.notify_one();
    let result = pending.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(
        session.state().status,
        ConnectionStatus::Connected(BackendKind::ChainSpecific)
    );
}

#[tokio::test]
async fn test_logout_during_login_supersedes_it() {
    let session = Arc::new(session_with(WalletEnvironment::empty()));
    let gate = Arc::new(Notify::new());
    let connector = Arc::new(
        ScriptedConnector::new(
            BackendKind::ChainSpecific,
            [Ok(activation(BackendKind::ChainSpecific, 3))],
        )
        .gated(gate.clone()),
    );

    let pending = tokio::spawn({
        let session = session.clone();
        let connector: Arc<dyn Connector> = connector.clone();
        async move { session.connect(Some(connector)).await }
    });
    connector.started.notified().await;

    session.logout_chain_specific().await;
    gate.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Superseded {
            backend: BackendKind::ChainSpecific
        }
    ));
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}

/// Remote signing on the wrong chain: the switch goes through the injected
/// wallet and the retried session lands on the selected chain.
#[tokio::test]
async fn test_remote_wrong_chain_switches_then_connects() {
    let wallet = Arc::new(MockWalletBridge::on_chain(97));
    let remote = Arc::new(MockRemoteBridge::paired_with(wallet.clone()));
    let session = session_with(
        injected_environment(&wallet).with_remote_signing(remote.clone()),
    );

    let result = session.login_remote().await.unwrap();

    assert_eq!(result.backend, BackendKind::RemoteSigning);
    assert_eq!(result.chain_id, 3);
    assert_eq!(remote.connect_requests.lock().unwrap().len(), 2);

    let switches: Vec<_> = wallet
        .requests()
        .into_iter()
        .filter(|r| r.method == "wallet_switchEthereumChain")
        .collect();
    assert_eq!(switches.len(), 1);
    assert_eq!(switches[0].params, json!([{ "chainId": "0x3" }]));

    let state = session.state();
    assert_eq!(
        state.status,
        ConnectionStatus::Connected(BackendKind::RemoteSigning)
    );
    assert!(state.wallet_provider.is_none());
}

/// A network change while a login is pending ends that login; it never
/// commits a session on the previous chain.
#[tokio::test]
async fn test_network_change_during_login_supersedes_it() {
    let session = Arc::new(session_with(WalletEnvironment::empty()));
    let gate = Arc::new(Notify::new());
    let connector = Arc::new(
        ScriptedConnector::new(
            BackendKind::ChainSpecific,
            [Ok(activation(BackendKind::ChainSpecific, 3))],
        )
        .gated(gate.clone()),
    );

    let pending = tokio::spawn({
        let session = session.clone();
        let connector: Arc<dyn Connector> = connector.clone();
        async move { session.connect(Some(connector)).await }
    });
    connector.started.notified().await;

    session.select_network(1).unwrap();
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
    gate.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Superseded {
            backend: BackendKind::ChainSpecific
        }
    ));
    let state = session.state();
    assert_eq!(state.status, ConnectionStatus::Disconnected);
    assert!(state.activation.is_none());
    assert_eq!(session.current_network().unwrap().chain_id, 97);
}

/// After a logout the pending login neither asks the wallet to switch nor
/// activates again.
#[tokio::test]
async fn test_logout_during_login_stops_switch_and_retry() {
    let switcher = Arc::new(CountingSwitcher::succeeding());
    let session = Arc::new(
        session_with(WalletEnvironment::empty()).with_switcher(switcher.clone()),
    );
    let gate = Arc::new(Notify::new());
    let connector = Arc::new(
        ScriptedConnector::new(
            BackendKind::ChainSpecific,
            [
                Err(ErrorClass::UnsupportedChain { wallet_chain_id: 97 }),
                Ok(activation(BackendKind::ChainSpecific, 3)),
            ],
        )
        .gated(gate.clone()),
    );

    let pending = tokio::spawn({
        let session = session.clone();
        let connector: Arc<dyn Connector> = connector.clone();
        async move { session.connect(Some(connector)).await }
    });
    connector.started.notified().await;

    session.logout_chain_specific().await;
    gate.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, SessionError::Superseded { .. }));
    assert!(switcher.requests().is_empty());
    assert_eq!(connector.activation_count(), 1);
    assert_eq!(session.state().status, ConnectionStatus::Disconnected);
}
