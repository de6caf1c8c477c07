//! Structured logging setup.
//!
//! Every state transition in the session controller, every network switch
//! request and every provider read emits a `tracing` event. This module
//! installs the subscriber that renders them.
//!
//! # Usage
//!
//! ```no_run
//! use eth_wallet_connector::observability;
//!
//! # fn main() -> eyre::Result<()> {
//! // Keep the guard alive for the life of the program or file logs are lost.
//! let _guard = observability::init_tracing(None, None, false)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Configuration
//!
//! ```bash
//! # Verbose session tracing
//! RUST_LOG=eth_wallet_connector=debug eth-wallet-connector probe
//!
//! # JSON console output
//! LOG_JSON=true eth-wallet-connector networks
//!
//! # Also write JSON logs to a daily-rotated file
//! LOG_FILE=./logs/wallet.log eth-wallet-connector probe
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_FILTER: &str = "eth_wallet_connector=info,warn";

/// Build the filter: `RUST_LOG` wins, then `log_level`, then [`DEFAULT_FILTER`].
fn build_filter(log_level: Option<&str>) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(filter) => EnvFilter::new(filter),
        Err(_) => EnvFilter::new(log_level.unwrap_or(DEFAULT_FILTER)),
    }
}

/// Install the global tracing subscriber.
///
/// * `log_level` - filter directive used when `RUST_LOG` is unset
/// * `log_file` - optional path; enables a JSON file layer with daily rotation
/// * `json_output` - JSON console output instead of the pretty format
///
/// Returns the file writer's guard when `log_file` is set. Dropping it
/// flushes and stops file logging.
///
/// # Errors
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> eyre::Result<Option<WorkerGuard>> {
    let env_filter = build_filter(log_level.as_deref());

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let (file_layer, guard) = match log_file.as_deref() {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(directory).wrap_err_with(|| {
                format!("failed to create log directory {}", directory.display())
            })?;

            let appender = tracing_appender::rolling::daily(
                directory,
                path.file_name().unwrap_or_else(|| OsStr::new("wallet.log")),
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized"
    );

    Ok(guard)
}
