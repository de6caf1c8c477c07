//! CLI entry point for the wallet connector tools.
//!
//! `main.rs` only sets up the runtime and logging; everything else lives in
//! the [`cli`](eth_wallet_connector::cli) module.

use eth_wallet_connector::{cli, observability};
use tracing::error;

#[tokio::main]
async fn main() {
    // RUST_LOG, LOG_JSON and LOG_FILE control logging, e.g.
    //   RUST_LOG=eth_wallet_connector=debug eth-wallet-connector probe
    //   LOG_JSON=true LOG_FILE=./logs/wallet.log eth-wallet-connector probe
    let log_level = std::env::var("RUST_LOG").ok();
    let log_file = std::env::var("LOG_FILE").ok().map(std::path::PathBuf::from);
    let json_output = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    let _guard = match observability::init_tracing(log_level, log_file, json_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run().await {
        error!(error = %e, "Command failed");
        match e.user_notice() {
            Some(notice) => eprintln!("Error: {notice}"),
            None => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
