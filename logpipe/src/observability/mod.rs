//! Log output setup.
//!
//! The engine itself only emits `tracing` events; installing a subscriber
//! is left to the embedding application. [`init_tracing`] is a convenience
//! for applications and tests that want the usual `fmt` output.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber configured from `config`.
///
/// `RUST_LOG`, when set, takes precedence over the configured filter; an
/// unparsable filter falls back to `info`. Returns false if a global
/// subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    match installed {
        Ok(()) => {
            tracing::debug!(filter = %config.filter, format = ?config.format, "Tracing initialized");
            true
        }
        Err(_) => false,
    }
}
