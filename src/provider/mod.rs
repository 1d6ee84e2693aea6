//! Client-side data access for the admin UI.
//!
//! A [`DataProvider`] maps resource names to [`ResourceHandler`]s. The hybrid provider sends the
//! managed resources through the HTTP API (so writes get server-side curation and guards) and
//! reaches every other table directly through a store client built with the public key.

mod http;
mod store;

use crate::client::{anon_secrets, ClientFactory};
use crate::schema::Table;
use crate::settings::Settings;
use crate::store::{Direction, Row, Store, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpResource;
pub use store::StoreResource;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Non-success response; `message` is the server's `error` field.
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("missing public store configuration")]
    MissingConfig,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    /// 1-based.
    pub current: u64,
    pub page_size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sorter {
    pub field: String,
    pub order: Direction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// `None` leaves paging to the resource. Store-backed resources return every row; API
    /// resources return the server's default first page, with `total` counting all matches.
    pub pagination: Option<Page>,
    /// Only the first sorter is honoured.
    pub sorters: Vec<Sorter>,
}

impl ListRequest {
    pub fn page(current: u64, page_size: u64) -> Self {
        ListRequest {
            pagination: Some(Page { current, page_size }),
            sorters: Vec::new(),
        }
    }

    pub fn sort(mut self, field: &str, order: Direction) -> Self {
        self.sorters.push(Sorter {
            field: field.to_string(),
            order,
        });
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListResponse {
    pub data: Vec<Row>,
    pub total: u64,
}

#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn list(&self, req: &ListRequest) -> Result<ListResponse, ProviderError>;
    async fn get_one(&self, id: i64) -> Result<Row, ProviderError>;
    async fn create(&self, body: Row) -> Result<Row, ProviderError>;
    async fn update(&self, id: i64, body: Row) -> Result<Row, ProviderError>;
    async fn delete(&self, id: i64) -> Result<Row, ProviderError>;
}

/// Resource names served by the HTTP API and their paths under the base URL.
pub const API_RESOURCES: [(&str, &str); 3] = [
    ("tb_product", "/api/products"),
    ("tb_product_type", "/api/product-types"),
    ("user_leave", "/api/user-leave"),
];

/// Strategy map from resource name to handler, with a store-backed fallback resolved per call.
pub struct DataProvider {
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
    fallback: Arc<dyn Store>,
    http: reqwest::Client,
    base_url: String,
}

impl DataProvider {
    pub fn new(base_url: &str, fallback: Arc<dyn Store>) -> Self {
        DataProvider {
            handlers: HashMap::new(),
            fallback,
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// HTTP handlers for the managed resources; everything else goes to `fallback`.
    pub fn hybrid(base_url: &str, fallback: Arc<dyn Store>) -> Self {
        let mut provider = DataProvider::new(base_url, fallback);
        for (resource, path) in API_RESOURCES {
            let handler = HttpResource::new(provider.http.clone(), format!("{}{}", provider.base_url, path));
            provider = provider.with_handler(resource, Arc::new(handler));
        }
        provider
    }

    /// Hybrid provider whose fallback client uses the public anonymous key.
    pub fn hybrid_from_settings(
        base_url: &str,
        settings: &Settings,
        clients: &dyn ClientFactory,
    ) -> Result<Self, ProviderError> {
        let secrets = anon_secrets(settings).ok_or(ProviderError::MissingConfig)?;
        Ok(DataProvider::hybrid(base_url, clients.connect(&secrets)?))
    }

    pub fn with_handler(mut self, resource: &str, handler: Arc<dyn ResourceHandler>) -> Self {
        self.handlers.insert(resource.to_string(), handler);
        self
    }

    pub fn resolve(&self, resource: &str) -> Result<Arc<dyn ResourceHandler>, ProviderError> {
        if let Some(handler) = self.handlers.get(resource) {
            return Ok(handler.clone());
        }
        let table = Table::from_name(resource).ok_or_else(|| ProviderError::UnknownResource(resource.to_string()))?;
        Ok(Arc::new(StoreResource::new(self.fallback.clone(), table)))
    }

    pub async fn list(&self, resource: &str, req: &ListRequest) -> Result<ListResponse, ProviderError> {
        self.resolve(resource)?.list(req).await
    }

    pub async fn get_one(&self, resource: &str, id: i64) -> Result<Row, ProviderError> {
        self.resolve(resource)?.get_one(id).await
    }

    pub async fn create(&self, resource: &str, body: Row) -> Result<Row, ProviderError> {
        self.resolve(resource)?.create(body).await
    }

    pub async fn update(&self, resource: &str, id: i64, body: Row) -> Result<Row, ProviderError> {
        self.resolve(resource)?.update(id, body).await
    }

    pub async fn delete(&self, resource: &str, id: i64) -> Result<Row, ProviderError> {
        self.resolve(resource)?.delete(id).await
    }

    /// Download the e-club CSV export.
    pub async fn export_eclub(&self) -> Result<String, ProviderError> {
        let res = self
            .http
            .post(format!("{}/api/eclub", self.base_url))
            .query(&[("action", "export")])
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;
        let res = http::error_for_status(res).await?;
        // Raw bytes so the leading BOM survives.
        let bytes = res.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}
