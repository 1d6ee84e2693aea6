//! Object storage for product images.

mod memory;
mod s3;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

pub use memory::MemoryObjectStorage;
pub use s3::S3Storage;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("the resource already exists: {0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Backend(String),
}

/// Object metadata stamped on every upload.
pub const CACHE_CONTROL: &str = "max-age=3600";

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store bytes at `path`. Fails with [`StorageError::AlreadyExists`] rather than overwrite.
    async fn put_new(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;

    fn public_url(&self, path: &str) -> String;
}
