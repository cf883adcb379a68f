//! Storage gateway: validated put/get/delete over an [`ObjectBackend`].

use bytes::Bytes;
use lambdas3_core::{EmptyObjectPolicy, LambdaS3Config};
use serde::Serialize;
use tracing::{info, warn};

use crate::backend::ObjectBackend;
use crate::error::{StorageError, StorageResult};
use crate::s3::S3Backend;

/// Where a stored object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// `<bucket>/<key>`.
    pub path: String,
    /// URL reported by the backend.
    pub url: String,
}

/// Validated object operations over a backend.
#[derive(Debug, Clone)]
pub struct StorageGateway<B> {
    backend: B,
    empty_object_policy: EmptyObjectPolicy,
}

impl StorageGateway<S3Backend> {
    /// A gateway over S3, configured from `config`.
    #[must_use]
    pub fn s3(config: &LambdaS3Config) -> Self {
        Self::from_config(S3Backend::from_config(config), config)
    }
}

impl<B: ObjectBackend> StorageGateway<B> {
    /// A gateway that rejects empty downloads.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            empty_object_policy: EmptyObjectPolicy::default(),
        }
    }

    /// A gateway whose policies follow `config`.
    pub fn from_config(backend: B, config: &LambdaS3Config) -> Self {
        Self::new(backend).with_empty_object_policy(config.empty_object_policy())
    }

    /// Set how zero-byte downloads are treated.
    #[must_use]
    pub fn with_empty_object_policy(mut self, policy: EmptyObjectPolicy) -> Self {
        self.empty_object_policy = policy;
        self
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store `content` at `bucket`/`key` in `region`, replacing any existing
    /// object.
    pub async fn put(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        content: impl Into<Bytes>,
    ) -> StorageResult<StoredObject> {
        validate(region, bucket, key)?;
        let content = content.into();
        let size = content.len();

        let url = self
            .backend
            .put_object(region, bucket, key, content)
            .await
            .inspect_err(|e| warn!(region, bucket, key, error = %e, "upload failed"))?;

        info!(region, bucket, key, size, url = %url, "uploaded object");
        Ok(StoredObject {
            path: format!("{bucket}/{key}"),
            url,
        })
    }

    /// Fetch the content stored at `bucket`/`key` in `region`.
    pub async fn get(&self, region: &str, bucket: &str, key: &str) -> StorageResult<Bytes> {
        validate(region, bucket, key)?;

        let content = self
            .backend
            .get_object(region, bucket, key)
            .await
            .inspect_err(|e| warn!(region, bucket, key, error = %e, "download failed"))?;

        if content.is_empty() && self.empty_object_policy == EmptyObjectPolicy::Reject {
            warn!(region, bucket, key, "downloaded object is empty");
            return Err(StorageError::EmptyObject {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            });
        }

        info!(region, bucket, key, size = content.len(), "downloaded object");
        Ok(content)
    }

    /// Remove the object at `bucket`/`key` in `region`.
    pub async fn delete(&self, region: &str, bucket: &str, key: &str) -> StorageResult<()> {
        validate(region, bucket, key)?;

        self.backend
            .delete_object(region, bucket, key)
            .await
            .inspect_err(|e| warn!(region, bucket, key, error = %e, "delete failed"))?;

        info!(region, bucket, key, "deleted object");
        Ok(())
    }
}

/// Checked in order: region, bucket, key.
fn validate(region: &str, bucket: &str, key: &str) -> StorageResult<()> {
    for (parameter, value) in [("region", region), ("bucket", bucket), ("key", key)] {
        if value.is_empty() {
            return Err(StorageError::InvalidParameters { parameter });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::memory::InMemoryBackend;

    /// Counts calls and fails every one of them.
    #[derive(Debug, Default)]
    struct FailingBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ObjectBackend for FailingBackend {
        async fn put_object(
            &self,
            _region: &str,
            bucket: &str,
            key: &str,
            _content: Bytes,
        ) -> StorageResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::upload(bucket, key, "AccessDenied"))
        }

        async fn get_object(&self, _region: &str, bucket: &str, key: &str) -> StorageResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::download(bucket, key, "AccessDenied"))
        }

        async fn delete_object(&self, _region: &str, bucket: &str, key: &str) -> StorageResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::delete(bucket, key, "AccessDenied"))
        }
    }

    fn gateway() -> StorageGateway<InMemoryBackend> {
        StorageGateway::new(InMemoryBackend::new())
    }

    #[tokio::test]
    async fn test_should_report_path_and_url_on_put() {
        let stored = gateway().put("r", "b", "k", "data").await.expect("put");
        assert_eq!(
            stored,
            StoredObject {
                path: "b/k".to_owned(),
                url: "https://b.s3.r.amazonaws.com/k".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn test_should_round_trip_content() {
        let gateway = gateway();
        let content = Bytes::from_static(b"id,name\n1,widget\n");
        gateway
            .put("us-east-1", "uploads", "2024/data.csv", content.clone())
            .await
            .expect("put");

        let fetched = gateway
            .get("us-east-1", "uploads", "2024/data.csv")
            .await
            .expect("get");
        assert_eq!(fetched, content);
    }

    #[tokio::test]
    async fn test_should_fail_download_after_delete() {
        let gateway = gateway();
        gateway.put("r", "b", "k", "data").await.expect("put");
        gateway.delete("r", "b", "k").await.expect("delete");

        let err = gateway.get("r", "b", "k").await.expect_err("should be gone");
        assert!(matches!(err, StorageError::DownloadFailed { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_should_validate_parameters_in_order_without_backend_call() {
        let backend = Arc::new(FailingBackend::default());
        let gateway = StorageGateway::new(Arc::clone(&backend));

        let cases = [
            ("", "", "", "region"),
            ("r", "", "", "bucket"),
            ("r", "b", "", "key"),
        ];
        for (region, bucket, key, expected) in cases {
            for err in [
                gateway.put(region, bucket, key, "x").await.expect_err("put"),
                gateway.get(region, bucket, key).await.expect_err("get"),
                gateway.delete(region, bucket, key).await.expect_err("delete"),
            ] {
                match err {
                    StorageError::InvalidParameters { parameter } => {
                        assert_eq!(parameter, expected);
                    }
                    other => panic!("expected InvalidParameters, got {other:?}"),
                }
            }
        }

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_propagate_backend_failures() {
        let backend = Arc::new(FailingBackend::default());
        let gateway = StorageGateway::new(Arc::clone(&backend));

        let err = gateway.put("r", "b", "k", "x").await.expect_err("put");
        assert!(matches!(err, StorageError::UploadFailed { .. }));
        let err = gateway.get("r", "b", "k").await.expect_err("get");
        assert!(matches!(err, StorageError::DownloadFailed { .. }));
        let err = gateway.delete("r", "b", "k").await.expect_err("delete");
        assert!(matches!(err, StorageError::DeleteFailed { .. }));

        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_should_reject_empty_download_by_default() {
        let gateway = gateway();
        gateway.put("r", "b", "empty", Bytes::new()).await.expect("put");

        let err = gateway.get("r", "b", "empty").await.expect_err("should reject");
        assert!(matches!(err, StorageError::EmptyObject { .. }));
    }

    #[tokio::test]
    async fn test_should_allow_empty_download_when_configured() {
        let config = LambdaS3Config::builder().allow_empty_objects(true).build();
        let gateway = StorageGateway::from_config(InMemoryBackend::new(), &config);
        gateway.put("r", "b", "empty", Bytes::new()).await.expect("put");

        let content = gateway.get("r", "b", "empty").await.expect("get");
        assert!(content.is_empty());
    }

    #[test]
    fn test_should_serialize_stored_object() {
        let stored = StoredObject {
            path: "b/k".to_owned(),
            url: "https://b.s3.r.amazonaws.com/k".to_owned(),
        };
        let json = serde_json::to_value(&stored).expect("serialize");
        assert_eq!(json["path"], "b/k");
        assert_eq!(json["url"], "https://b.s3.r.amazonaws.com/k");
    }

    #[test]
    fn test_should_build_s3_gateway_from_config() {
        let gateway = StorageGateway::s3(&LambdaS3Config::default());
        assert_eq!(gateway.empty_object_policy, EmptyObjectPolicy::Reject);
        tokio_test::block_on(async {
            let err = gateway.get("", "b", "k").await.expect_err("should fail");
            assert!(matches!(
                err,
                StorageError::InvalidParameters { parameter: "region" }
            ));
        });
    }
}
