//! The object store seam the gateway is written against.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageResult;

/// An object store addressed by region, bucket, and key.
///
/// Implementations map their own failures onto
/// [`StorageError`](crate::StorageError). Parameters arrive already
/// validated as non-empty.
#[async_trait]
pub trait ObjectBackend: Send + Sync + std::fmt::Debug {
    /// Store `content`, replacing any existing object, and return its URL.
    async fn put_object(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        content: Bytes,
    ) -> StorageResult<String>;

    /// Fetch the full content of an object.
    async fn get_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Remove an object. Removing a missing object succeeds.
    async fn delete_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<()>;
}

#[async_trait]
impl<B: ObjectBackend + ?Sized> ObjectBackend for Arc<B> {
    async fn put_object(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        content: Bytes,
    ) -> StorageResult<String> {
        (**self).put_object(region, bucket, key, content).await
    }

    async fn get_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<Bytes> {
        (**self).get_object(region, bucket, key).await
    }

    async fn delete_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<()> {
        (**self).delete_object(region, bucket, key).await
    }
}
