//! Configuration module.
//!
//! The configuration is read once at startup from a TOML file, overridden by
//! environment variables, validated, and then handed by reference to each
//! component's constructor.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::auth::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_DURATION_SECS};
use crate::{Error, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Treat `X-Forwarded-Proto: https` as a confidential connection.
    ///
    /// Enable only behind a TLS-terminating proxy that sets the header.
    #[serde(default)]
    pub trust_forwarded_proto: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_forwarded_proto: false,
        }
    }
}

impl ServerConfig {
    /// Socket address to listen on.
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid listen address: {e}")))
    }
}

/// Person database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL.
    #[serde(default = "default_db_url")]
    pub url: String,
}

fn default_db_url() -> String {
    "sqlite://data/floodwatch.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

/// Session lifetime and capacity.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// TTL applied to every new session, in seconds.
    #[serde(default = "default_session_duration")]
    pub duration_secs: u64,
    /// Maximum concurrent sessions per user; the oldest is evicted beyond it.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

/// Longest accepted session duration (100 years).
pub const MAX_SESSION_DURATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn default_session_duration() -> u64 {
    DEFAULT_SESSION_DURATION_SECS
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_session_duration(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl SessionConfig {
    /// Session duration.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path. Empty logs to the console only.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `BACKEND_URL`: database URL
    /// - `LISTEN_ADDR`: `host:port` to bind
    /// - `SESSION_DURATION_SECS`: session duration
    /// - `SESSION_MAX_SESSIONS`: per-user session cap
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(url) = lookup("BACKEND_URL") {
            self.database.url = url;
        }

        if let Some(addr) = lookup("LISTEN_ADDR") {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| Error::Config(format!("LISTEN_ADDR: {e}")))?;
            self.server.host = addr.ip().to_string();
            self.server.port = addr.port();
        }

        if let Some(secs) = lookup("SESSION_DURATION_SECS") {
            self.session.duration_secs = secs
                .parse()
                .map_err(|e| Error::Config(format!("SESSION_DURATION_SECS: {e}")))?;
        }

        if let Some(max) = lookup("SESSION_MAX_SESSIONS") {
            self.session.max_sessions = max
                .parse()
                .map_err(|e| Error::Config(format!("SESSION_MAX_SESSIONS: {e}")))?;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(Error::Config("database.url must be set".to_string()));
        }
        if self.session.duration_secs == 0 {
            return Err(Error::Config(
                "session.duration_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.duration_secs > MAX_SESSION_DURATION_SECS {
            return Err(Error::Config(format!(
                "session.duration_secs must not exceed {MAX_SESSION_DURATION_SECS}"
            )));
        }
        if self.session.max_sessions == 0 {
            return Err(Error::Config(
                "session.max_sessions must be greater than zero".to_string(),
            ));
        }
        self.server.addr()?;
        Ok(())
    }
}
