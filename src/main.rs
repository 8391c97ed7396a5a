mod domain;
mod clients;

mod app_system;
mod cart_actor;
mod catalog;
mod console;
mod conversation;
mod order_submitter;
mod storage;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

mod actor_framework;

use crate::app_system::{setup_tracing, Config, ShopSystem, SystemError};
use crate::console::ConsoleSink;
use crate::storage::SqlStorage;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    let config = Config::parse();
    // Setup tracing once for the entire application
    setup_tracing(config.log_format);

    info!(database_url = %config.database_url, "Starting brewery bot");

    let storage = SqlStorage::connect(&config.database_url).await?;
    if config.seed_demo {
        let inserted = storage.seed_demo_catalog().await?;
        info!(inserted, "Demo catalog seeded");
    }
    let storage = Arc::new(storage);

    let system = ShopSystem::start(
        storage.clone(),
        storage,
        Arc::new(ConsoleSink::stdout()),
        config.settings(),
    )
    .await;
    info!(products = system.catalog().current().products.len(), "Catalog ready");

    let console_result = console::run(system.dispatcher()).await;
    if let Err(e) = &console_result {
        error!(error = %e, "Console transport stopped unexpectedly");
    }

    // Shutdown system gracefully
    system.shutdown().await?;
    console_result?;

    info!("Application completed successfully");
    Ok(())
}
