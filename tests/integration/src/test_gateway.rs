//! Storage gateway against a live endpoint.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use lambdas3_storage::StorageError;

    use crate::{REGION, Scratch, admin_client, endpoint_config, gateway, unique_bucket};

    #[tokio::test]
    #[ignore = "requires S3 endpoint"]
    async fn test_should_put_get_and_delete_object() {
        let scratch = Scratch::new("crud").await;
        let (gateway, bucket) = (&scratch.gateway, scratch.bucket.as_str());

        let stored = gateway
            .put(REGION, bucket, "reports/2024.csv", "id,total\n1,42\n")
            .await
            .expect("put");
        assert_eq!(stored.path, format!("{bucket}/reports/2024.csv"));
        assert!(
            stored.url.ends_with(&format!("/{bucket}/reports/2024.csv")),
            "{}",
            stored.url
        );

        let content = gateway
            .get(REGION, bucket, "reports/2024.csv")
            .await
            .expect("get");
        assert_eq!(content.as_ref(), b"id,total\n1,42\n");

        gateway
            .delete(REGION, bucket, "reports/2024.csv")
            .await
            .expect("delete");
        let err = gateway
            .get(REGION, bucket, "reports/2024.csv")
            .await
            .expect_err("should be gone");
        assert!(matches!(err, StorageError::DownloadFailed { .. }), "{err:?}");

        scratch.remove_bucket().await;
    }

    #[tokio::test]
    #[ignore = "requires S3 endpoint"]
    async fn test_should_reject_empty_object_on_download() {
        let scratch = Scratch::new("empty").await;

        scratch
            .gateway
            .put(REGION, &scratch.bucket, "empty.txt", Bytes::new())
            .await
            .expect("put");
        let err = scratch
            .gateway
            .get(REGION, &scratch.bucket, "empty.txt")
            .await
            .expect_err("should reject");
        assert!(matches!(err, StorageError::EmptyObject { .. }), "{err:?}");

        scratch.remove_bucket().await;
    }

    #[tokio::test]
    #[ignore = "requires S3 endpoint"]
    async fn test_should_fail_upload_to_missing_bucket() {
        let config = endpoint_config();
        let gateway = gateway(&config, &admin_client(&config));

        let err = gateway
            .put(REGION, &unique_bucket("missing"), "k", "x")
            .await
            .expect_err("should fail");
        assert!(matches!(err, StorageError::UploadFailed { .. }), "{err:?}");
    }
}
