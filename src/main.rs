use std::sync::Arc;

use tracing::{error, info};

use floodwatch_auth::{Config, MemorySessionStore, SqliteBackend, WebServer};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = config.apply_env_overrides() {
        eprintln!("Invalid environment override: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = floodwatch_auth::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        floodwatch_auth::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    info!("floodwatch-auth starting");
    if let Err(e) = run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> floodwatch_auth::Result<()> {
    let backend = SqliteBackend::open(&config.database.url).await?;
    info!(url = %config.database.url, "Person database ready");

    let store = Arc::new(MemorySessionStore::new(config.session.max_sessions));
    info!(
        duration_secs = config.session.duration_secs,
        max_sessions = config.session.max_sessions,
        "Session store ready"
    );

    WebServer::new(&config, Arc::new(backend), store.clone())?
        .with_purge_task(store)
        .run()
        .await?;

    Ok(())
}
