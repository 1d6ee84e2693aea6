//! Config guard and store client construction.

use crate::error::AppError;
use crate::settings::Settings;
use crate::store::{PgStore, Store, StoreError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Connection secrets for one client: store URL plus the credential sent with it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreSecrets {
    pub url: String,
    pub key: String,
}

/// Privileged secrets, or the uniform configuration error when either is missing.
pub fn require_service_secrets(settings: &Settings) -> Result<StoreSecrets, AppError> {
    match (&settings.store_url, &settings.store_service_key) {
        (Some(url), Some(key)) => Ok(StoreSecrets {
            url: url.clone(),
            key: key.clone(),
        }),
        (url, key) => Err(AppError::MissingConfig {
            has_url: url.is_some(),
            has_service_key: key.is_some(),
        }),
    }
}

/// Public anonymous secrets used by the client-side adapter.
pub fn anon_secrets(settings: &Settings) -> Option<StoreSecrets> {
    Some(StoreSecrets {
        url: settings.store_url.clone()?,
        key: settings.store_anon_key.clone()?,
    })
}

/// Builds store clients. Clients hold no session and never refresh tokens.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, secrets: &StoreSecrets) -> Result<Arc<dyn Store>, StoreError>;
}

/// Lazily connecting Postgres pools, one per credential pair.
pub struct PgClientFactory {
    max_connections: u32,
    pools: Mutex<HashMap<StoreSecrets, PgStore>>,
}

impl PgClientFactory {
    pub fn new(max_connections: u32) -> Self {
        PgClientFactory {
            max_connections,
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Pool without caching; used at startup for bootstrapping.
    pub fn pool(&self, secrets: &StoreSecrets) -> Result<sqlx::PgPool, StoreError> {
        let options = PgConnectOptions::from_str(&secrets.url)
            .map_err(StoreError::from)?
            .password(&secrets.key)
            .application_name("catalog-admin");
        Ok(PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_lazy_with(options))
    }
}

impl ClientFactory for PgClientFactory {
    fn connect(&self, secrets: &StoreSecrets) -> Result<Arc<dyn Store>, StoreError> {
        let mut pools = self.pools.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(store) = pools.get(secrets) {
            return Ok(Arc::new(store.clone()));
        }
        let store = PgStore::new(self.pool(secrets)?);
        pools.insert(secrets.clone(), store.clone());
        tracing::debug!("created store pool");
        Ok(Arc::new(store))
    }
}

/// Hands out the same store for any secrets.
pub struct StaticClientFactory(pub Arc<dyn Store>);

impl ClientFactory for StaticClientFactory {
    fn connect(&self, _secrets: &StoreSecrets) -> Result<Arc<dyn Store>, StoreError> {
        Ok(self.0.clone())
    }
}
