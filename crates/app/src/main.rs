mod actions;
mod auth;
mod cache;
mod customers;
mod invoices;
mod listing;
mod overview;
mod problem;
mod router;
mod telemetry;
mod views;

use std::net::SocketAddr;

use dashboard_identity::IdentityClient;
use dashboard_storage::Database;
use dashboard_util::{load_env_file, AppConfig};
use tracing::info;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let storage = Database::connect(&config.database_url).await?;
    storage.run_migrations().await?;
    info!(stage = "storage", url = %config.database_url, "database ready");

    let identity = IdentityClient::new(
        Url::parse(&config.identity_provider_url)?,
        reqwest::Client::builder().build()?,
    );

    let state = router::AppState::new(metrics, storage, identity);

    let addr: SocketAddr = config.bind_addr;
    info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .await
        .map_err(|err| err.into())
}
