//! Leeds Student Directory Backend Binary
//!
//! Main entry point for the read-only shop directory API.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shop_directory_lib::{
    api::create_app,
    config::{Config, LogFormat, StoreBackend},
    data::store::{AnyShopStore, ShopOps},
    log::initialize_logging,
    services::Services,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "shop-directory-backend")]
#[command(about = "Leeds Student Directory API", long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Override server host
    #[arg(long, env = "API_HOST")]
    host: Option<String>,

    /// Override server port
    #[arg(short, long, env = "API_PORT")]
    port: Option<u16>,

    /// Log output format (auto, json, text)
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Allowed cross-origin hosts, comma separated
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Option<Vec<String>>,

    /// Record store backend (file, postgres)
    #[arg(long, env = "STORE_BACKEND")]
    store: Option<StoreBackend>,

    /// Override the flat-file location
    #[arg(long, env = "SHOPS_FILE")]
    data_file: Option<String>,

    /// Override database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Override the collection (table) name
    #[arg(long, env = "SHOPS_COLLECTION")]
    collection: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    initialize_logging(config.log_format);

    info!("Starting Leeds Student Directory backend");
    info!("Server will run on {}:{}", config.host, config.port);

    let store = AnyShopStore::connect(&config.store)
        .await
        .with_context(|| format!("Failed to open the {:?} record store", config.store.backend))?;
    info!(backend = store.backend_name(), "Record store ready");

    let store: Arc<dyn ShopOps> = Arc::new(store);
    let services = Services::new(store.clone());

    // Start server
    let app = create_app(services, &config.cors_origins);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .context("Failed to bind TCP listener")?;

    info!("Server listening on http://{}:{}", config.host, config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    drop(store);
    info!("Server stopped, record store closed");

    Ok(())
}

fn load_config() -> Result<Config> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to read config file: {}", path))?,
        None => {
            debug!("No config file specified, using defaults");
            Config::default()
        }
    };

    // Apply CLI and environment overrides
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_format) = args.log_format {
        config.log_format = log_format;
    }
    if let Some(cors_origins) = args.cors_origins {
        config.cors_origins = cors_origins
            .into_iter()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
    }
    if let Some(backend) = args.store {
        config.store.backend = backend;
    }
    if let Some(data_file) = args.data_file {
        config.store.data_file = data_file.into();
    }
    if let Some(database_url) = args.database_url {
        config.store.database_url = database_url;
    }
    if let Some(collection) = args.collection {
        config.store.collection = collection;
    }

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        // if the handler cannot be installed, only SIGTERM stops the server
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
