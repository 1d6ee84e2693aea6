//! Shared application state for all routes.

use crate::client::{require_service_secrets, ClientFactory};
use crate::error::AppError;
use crate::settings::Settings;
use crate::storage::ObjectStorage;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub clients: Arc<dyn ClientFactory>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    /// Privileged store client for this request. Runs the config guard first, every time.
    pub fn store(&self) -> Result<Arc<dyn Store>, AppError> {
        let secrets = require_service_secrets(&self.settings)?;
        Ok(self.clients.connect(&secrets)?)
    }
}
