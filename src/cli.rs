//! Command-line interface for inspecting the wallet connector's networks.
//!
//! # Commands
//!
//! - `networks`: list the configured networks
//! - `probe`: read chain id and latest block through the read-only provider
//! - `switch-payload`: print the network switch request sent to the wallet
//!
//! # Example
//!
//! ```bash
//! eth-wallet-connector networks --json
//! eth-wallet-connector probe --network 1 --timeout-ms 3000
//! eth-wallet-connector switch-payload --network 1
//! ```

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{utils::format_units, Address};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{SessionError, SessionResult};
use crate::network::{NetworkDescriptor, NetworkRegistry};
use crate::rpc::create_provider;
use crate::switch::switch_request;

/// Wallet connector network tools
#[derive(Parser, Debug)]
#[command(name = "eth-wallet-connector")]
#[command(about = "Inspect wallet connector networks and providers", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the configured networks
    Networks {
        /// Print the registry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read chain id and latest block from a network's RPC endpoint
    Probe {
        /// Registry index (default: DEFAULT_NETWORK)
        #[arg(short, long)]
        network: Option<usize>,

        /// Request timeout in milliseconds (default: NODE_TIMEOUT_MS)
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Also read this account's native balance
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Print the wallet_switchEthereumChain request for a network
    SwitchPayload {
        /// Registry index (default: DEFAULT_NETWORK)
        #[arg(short, long)]
        network: Option<usize>,
    },
}

/// Parse CLI arguments and execute the command.
///
/// # Errors
///
/// Configuration, registry lookup, or RPC failures.
pub async fn run() -> SessionResult<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let registry = config.load_registry()?;

    match cli.command {
        Commands::Networks { json } => run_networks_command(&registry, json),
        Commands::Probe {
            network,
            timeout_ms,
            address,
        } => {
            let index = network.unwrap_or_else(|| config.default_network());
            let timeout = timeout_ms.map_or_else(|| config.node_timeout(), Duration::from_millis);
            run_probe_command(registry.describe(index)?, timeout, address.as_deref()).await
        }
        Commands::SwitchPayload { network } => {
            let index = network.unwrap_or_else(|| config.default_network());
            run_switch_payload_command(registry.describe(index)?)
        }
    }
}

fn run_networks_command(registry: &NetworkRegistry, json: bool) -> SessionResult<()> {
    if json {
        let networks: Vec<&NetworkDescriptor> = registry.iter().collect();
        let rendered = serde_json::to_string_pretty(&networks)
            .map_err(|e| SessionError::config("failed to render networks", Some(Box::new(e))))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", "Configured networks".cyan().bold());
    for (index, network) in registry.iter().enumerate() {
        println!(
            "  {} {} {} {}",
            format!("[{index}]").bright_black(),
            network.name.bold(),
            format!("(chain {}, {})", network.chain_id, network.chain_id_hex()).yellow(),
            network.currency.symbol.green()
        );
        println!("      rpc:      {}", network.rpc_url);
        println!("      explorer: {}", network.explorer_url.bright_black());
    }
    Ok(())
}

async fn run_probe_command(
    network: &NetworkDescriptor,
    timeout: Duration,
    address: Option<&str>,
) -> SessionResult<()> {
    info!(network = %network.name, timeout_ms = timeout.as_millis(), "Probing network");
    let provider = create_provider(&network.rpc_url, timeout)?;

    let chain_id = provider.chain_id().await?;
    let block = provider.block_number().await?;

    println!("{} {}", "Network:".bold(), network.name.cyan());
    println!("{} {:?}", "Transport:".bold(), provider.transport());
    println!("{} {}", "Latest block:".bold(), block.to_string().green());

    if chain_id == network.chain_id {
        println!("{} {}", "Chain id:".bold(), chain_id.to_string().green());
    } else {
        warn!(
            expected = network.chain_id,
            reported = chain_id,
            "Node reports a different chain id"
        );
        println!(
            "{} {} {}",
            "Chain id:".bold(),
            chain_id.to_string().red(),
            format!("(expected {})", network.chain_id).yellow()
        );
    }

    if let Some(address) = address {
        let address = Address::from_str(address).map_err(|e| {
            SessionError::config(format!("invalid address '{address}'"), Some(Box::new(e)))
        })?;
        let balance = provider.balance(address).await?;
        let formatted = format_units(balance, network.currency.decimals)
            .unwrap_or_else(|_| balance.to_string());
        println!(
            "{} {} {}",
            "Balance:".bold(),
            formatted.green(),
            network.currency.symbol
        );
    }

    Ok(())
}

fn run_switch_payload_command(network: &NetworkDescriptor) -> SessionResult<()> {
    let rendered = serde_json::to_string_pretty(&switch_request(network.chain_id))
        .map_err(|e| SessionError::config("failed to render switch request", Some(Box::new(e))))?;
    println!("{rendered}");
    Ok(())
}
