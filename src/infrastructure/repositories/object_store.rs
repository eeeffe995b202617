use async_trait::async_trait;
use std::time::Duration;

/// Blob storage with expiring read links.
///
/// Paths are opaque to callers of the links; only this service writes them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob at the given path, overwriting any previous content.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), String>;

    /// Mint a time-limited read URL for a stored blob.
    async fn signed_read_url(&self, path: &str, ttl: Duration) -> Result<String, String>;
}
