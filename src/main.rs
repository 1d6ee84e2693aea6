//! Server binary: reads settings from the environment (and `.env`), optionally creates the
//! managed tables, and serves the API.

use catalog_admin::client::require_service_secrets;
use catalog_admin::{app, ensure_tables, AppState, PgClientFactory, S3Storage, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("catalog_admin=info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    let clients = Arc::new(PgClientFactory::new(settings.store_max_connections));

    match require_service_secrets(&settings) {
        Ok(secrets) if settings.store_bootstrap => {
            let pool = clients.pool(&secrets)?;
            ensure_tables(&pool).await?;
        }
        Ok(_) => {}
        Err(_) => tracing::warn!("store secrets missing; API requests will fail until they are set"),
    }

    let storage = S3Storage::from_settings(&settings).await;
    let bind_addr = settings.bind_addr;
    let state = AppState {
        settings: Arc::new(settings),
        clients,
        storage: Arc::new(storage),
    };

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
