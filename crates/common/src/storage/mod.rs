//! Object storage for podcast audio
//!
//! Uploads go through `PutObject`; lookups use `HeadObject` so existence is
//! checked without downloading the episode. Public URLs are formatted from
//! bucket, region and key, not verified.

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use crate::metrics::{ExternalCall, Service};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;

/// Trait for object stores
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a complete object
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;

    /// Whether an object exists under `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Public URL of `key`
    fn public_url(&self, key: &str) -> Result<String>;
}

/// Virtual-hosted-style S3 URL
pub fn s3_public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

/// Whether a failed `HeadObject` means the key does not exist.
///
/// S3 answers 403 instead of 404 for a missing key when the caller lacks
/// `s3:ListBucket` on the bucket.
fn is_missing_object(status: Option<u16>, not_found: bool) -> bool {
    not_found || matches!(status, Some(403) | Some(404))
}

/// S3 client wrapper
pub struct S3Store {
    client: S3Client,
    bucket: Option<String>,
    region: Option<String>,
}

impl S3Store {
    /// Create a store from the AWS default provider chain.
    ///
    /// Credentials are resolved by the SDK on first request; a missing
    /// bucket or region is reported when the store is first used.
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let aws_config = loader.load().await;

        let region = config
            .region
            .clone()
            .or_else(|| aws_config.region().map(|r| r.to_string()));

        Self {
            client: S3Client::new(&aws_config),
            bucket: config.bucket.clone(),
            region,
        }
    }

    fn bucket(&self) -> Result<&str> {
        self.bucket
            .as_deref()
            .ok_or(AppError::MissingCredential { name: "S3_BUCKET_NAME" })
    }

    fn region(&self) -> Result<&str> {
        self.region
            .as_deref()
            .ok_or(AppError::MissingCredential { name: "AWS_REGION" })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let bucket = self.bucket()?;
        let size = body.len();

        let call = ExternalCall::start(Service::Storage);
        let result = self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await;
        let latency_ms = call.finish(result.is_ok());

        result.map_err(|e| {
            let message = aws_sdk_s3::error::DisplayErrorContext(&e).to_string();
            tracing::error!(bucket, key, error = %message, "Error uploading to S3");
            AppError::Storage {
                message: format!("Failed to upload {}: {}", key, message),
            }
        })?;

        tracing::info!(bucket, key, size, latency_ms, "Uploaded object");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let bucket = self.bucket()?;

        let call = ExternalCall::start(Service::Storage);
        let result = self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => {
                call.finish(true);
                Ok(true)
            }
            Err(e) => {
                let status = e.raw_response().map(|response| response.status().as_u16());
                let service_error = e.into_service_error();
                if is_missing_object(status, service_error.is_not_found()) {
                    call.finish(true);
                    tracing::debug!(bucket, key, "Object not found");
                    Ok(false)
                } else {
                    call.finish(false);
                    Err(AppError::Storage {
                        message: format!("Failed to check {}: {}", key, service_error),
                    })
                }
            }
        }
    }

    fn public_url(&self, key: &str) -> Result<String> {
        Ok(s3_public_url(self.bucket()?, self.region()?, key))
    }
}
