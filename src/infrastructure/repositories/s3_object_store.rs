use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;
use std::time::Duration;

use super::object_store::ObjectStore;

/// S3 implementation of the object store, issuing presigned GET links.
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(s3_client: Arc<S3Client>, bucket: String) -> Self {
        Self { s3_client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), String> {
        let size = bytes.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, path = %path, "S3 put_object failed");
                format!("S3 put_object failed: {}", e)
            })?;

        tracing::debug!(path = %path, size_bytes = size, "Audio object stored");

        Ok(())
    }

    async fn signed_read_url(&self, path: &str, ttl: Duration) -> Result<String, String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| format!("Invalid presigning TTL: {}", e))?;

        let presigned = self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, path = %path, "S3 presign failed");
                format!("S3 presign failed: {}", e)
            })?;

        Ok(presigned.uri().to_string())
    }
}
