use super::{ObjectStorage, StorageError, CACHE_CONTROL};
use crate::settings::Settings;
use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use axum::body::Bytes;

/// S3-compatible bucket reached with path-style addressing.
#[derive(Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, public_base: impl Into<String>) -> Self {
        S3Storage {
            client,
            bucket: bucket.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Credentials come from the usual AWS provider chain.
    pub async fn from_settings(settings: &Settings) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.storage_region.clone()))
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared).force_path_style(true);
        if let Some(endpoint) = &settings.storage_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        let public_base = match (&settings.storage_public_url, &settings.storage_endpoint) {
            (Some(base), _) => base.clone(),
            (None, Some(endpoint)) => format!("{}/{}", endpoint.trim_end_matches('/'), settings.storage_bucket),
            (None, None) => format!(
                "https://{}.s3.{}.amazonaws.com",
                settings.storage_bucket, settings.storage_region
            ),
        };
        S3Storage::new(
            aws_sdk_s3::Client::from_conf(builder.build()),
            settings.storage_bucket.clone(),
            public_base,
        )
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_new(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control(CACHE_CONTROL)
            .if_none_match("*")
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                if status == Some(412) {
                    return Err(StorageError::AlreadyExists(path.to_string()));
                }
                let message = err.message().map(String::from).unwrap_or_else(|| err.to_string());
                Err(StorageError::Backend(message))
            }
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path)
    }
}
