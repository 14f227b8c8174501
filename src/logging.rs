//! Tracing setup.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to this
//! crate and to `tower_http` request traces, and everything else logs at warn.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::{Error, Result};

/// Parse a configured level name, defaulting to info.
fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(level: &str) -> String {
    let level = parse_level(level).as_str().to_ascii_lowercase();
    format!("warn,floodwatch_auth={level},tower_http={level}")
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Open `path` for appending, creating parent directories as needed.
fn open_log_file(path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber.
///
/// Logs go to stdout, and also to `config.file` (without ANSI colors) when
/// it is set. Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file_layer = if config.file.is_empty() {
        None
    } else {
        let file = Arc::new(open_log_file(&config.file)?);
        Some(fmt::layer().with_writer(file).with_ansi(false))
    };

    tracing_subscriber::registry()
        .with(filter_for(&config.level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging: {e}")))
}

/// Install a stdout-only subscriber. Does nothing if one is already installed.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(level))
        .with(fmt::layer().with_target(true))
        .try_init();
}
