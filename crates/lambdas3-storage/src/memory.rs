//! In-memory object backend.
//!
//! A process-local store used by tests and local runs. Objects are keyed by
//! `(region, bucket, key)`, so the same bucket name in two regions holds two
//! independent objects.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use crate::backend::ObjectBackend;
use crate::error::{StorageError, StorageResult};
use crate::location::UrlStyle;

type ObjectKey = (String, String, String);

/// Thread-safe in-memory object store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    objects: DashMap<ObjectKey, Bytes>,
    url_style: UrlStyle,
}

impl InMemoryBackend {
    /// Create an empty store that reports AWS-style URLs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report URLs in the given style instead.
    #[must_use]
    pub fn with_url_style(mut self, url_style: UrlStyle) -> Self {
        self.url_style = url_style;
        self
    }

    /// Number of stored objects across all regions and buckets.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether the object exists.
    #[must_use]
    pub fn contains(&self, region: &str, bucket: &str, key: &str) -> bool {
        self.objects.contains_key(&object_key(region, bucket, key))
    }
}

fn object_key(region: &str, bucket: &str, key: &str) -> ObjectKey {
    (region.to_owned(), bucket.to_owned(), key.to_owned())
}

#[async_trait]
impl ObjectBackend for InMemoryBackend {
    async fn put_object(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        content: Bytes,
    ) -> StorageResult<String> {
        debug!(region, bucket, key, size = content.len(), "storing object in memory");
        self.objects.insert(object_key(region, bucket, key), content);
        Ok(self.url_style.object_url(region, bucket, key))
    }

    async fn get_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.objects
            .get(&object_key(region, bucket, key))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                StorageError::download(bucket, key, "NoSuchKey: the object does not exist")
            })
    }

    async fn delete_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<()> {
        let removed = self.objects.remove(&object_key(region, bucket, key)).is_some();
        debug!(region, bucket, key, removed, "deleted object from memory");
        Ok(())
    }
}
