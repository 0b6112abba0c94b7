pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod cli;

use agent::Assistant;
use cli::Args;
use config::catalog::Catalog;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("HTTP Address: {}", args.http_addr);
    info!("WebSocket Address: {}", args.ws_addr.as_deref().unwrap_or("disabled"));
    info!("Catalog Path: {}", args.catalog_path);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let catalog = Arc::new(Catalog::load(&args.catalog_path)?);
    let assistant = Assistant::new(catalog);

    let server = Server::new(assistant, args);
    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use config::catalog::CatalogError;

    #[tokio::test]
    async fn missing_catalog_stops_startup() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("products.json");
        let args = Args::try_parse_from([
            "storefront-assistant",
            "--http-addr",
            "127.0.0.1:0",
            "--catalog-path",
            missing.to_str().unwrap(),
        ]).unwrap();

        let err = run(args).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<CatalogError>(), Some(CatalogError::Io { .. })));
    }
}
