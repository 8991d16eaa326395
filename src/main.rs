use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use imgstation::auth::ensure_super_admin;
use imgstation::web::WebServer;
use imgstation::{Config, Database, RetentionPolicy, RetentionSweeper, UploadStore, UserRepository};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = imgstation::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        imgstation::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> imgstation::Result<()> {
    info!("imgstation starting");

    let db = Database::open(&config.database.path).await?;
    info!(path = %config.database.path, "Database opened");

    let repo = UserRepository::new(db.pool());
    ensure_super_admin(&repo, &config.auth.admin_username, &config.auth.admin_password).await?;

    let store = UploadStore::new(&config.storage.root)?;
    info!(root = %config.storage.root, "Upload storage ready");

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let sweeper = if config.retention.enabled {
        let policy = RetentionPolicy::from(&config.retention);
        let handle = RetentionSweeper::new(&config.storage.root, policy)
            .with_activity(store.activity())
            .spawn(cancel_rx);
        Some(handle)
    } else {
        warn!("Retention sweeper disabled; uploads are kept forever");
        None
    };

    let server = WebServer::new(&config, Arc::new(db), Arc::new(store))?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let result = server.run(shutdown_signal()).await;

    let _ = cancel_tx.send(true);
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            error!("Retention sweeper task failed: {}", e);
        }
    }

    result?;
    info!("imgstation stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
