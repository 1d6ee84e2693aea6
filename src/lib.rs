//! Catalog admin: back-office REST API for products, product types, leave messages, e-club
//! subscriptions and image uploads, plus a hybrid data provider for the admin UI.

pub mod client;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod keywords;
pub mod models;
pub mod provider;
pub mod query;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod storage;
pub mod store;

pub use client::{ClientFactory, PgClientFactory, StaticClientFactory, StoreSecrets};
pub use error::AppError;
pub use provider::{DataProvider, ListRequest, ListResponse, ProviderError, ResourceHandler};
pub use routes::{api_routes, app, common_routes};
pub use schema::Table;
pub use settings::{Settings, SettingsError};
pub use state::AppState;
pub use storage::{MemoryObjectStorage, ObjectStorage, S3Storage, StorageError};
pub use store::{ensure_tables, MemoryStore, PgStore, Store, StoreError};
