//! Payslip Engine HTTP server.
//!
//! Reads configuration from the directory named by `PAYSLIP_CONFIG_DIR`
//! (default `./config`) and serves the API on the configured address.

use std::sync::Arc;

use payslip_engine::api::{AppState, create_router};
use payslip_engine::config::{ConfigLoader, LoggingConfig};
use payslip_engine::repository::InMemoryRepository;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_DIR_ENV: &str = "PAYSLIP_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = "./config";

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer.compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir =
        std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;

    init_logging(config.logging());
    info!(config_dir = %config_dir, "Configuration loaded");

    let bind_address = config.server().bind_address.clone();
    let store = Arc::new(InMemoryRepository::new());
    let (state, _worker) = AppState::spawn(store, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Payslip server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
