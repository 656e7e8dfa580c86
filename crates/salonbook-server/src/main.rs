//! Salonbook Server — schema provisioning entry point.
//!
//! Clients talk to the shared database directly; there is no API
//! surface here. This binary connects, brings the schema up to date,
//! and exits.

use salonbook_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("salonbook=info".parse()?),
        )
        .json()
        .init();

    tracing::info!("Starting salonbook provisioning...");

    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config).await?;
    salonbook_db::run_migrations(manager.client()).await?;

    tracing::info!("Schema is up to date.");

    Ok(())
}
