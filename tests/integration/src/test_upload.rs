//! End-to-end tests: decode an API Gateway upload event and store its files.

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use lambdas3_http::ProxyRequest;

    use crate::{REGION, Scratch};

    const BODY: &str = "--form-boundary\r\n\
        Content-Disposition: form-data; name=\"note\"\r\n\
        \r\n\
        nightly export\r\n\
        --form-boundary\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"C:\\\\exports\\\\orders.csv\"\r\n\
        Content-Type: text/csv\r\n\
        \r\n\
        order,amount\r\n1,9.99\r\n\
        \r\n--form-boundary--\r\n";

    fn event(base64: bool) -> ProxyRequest {
        let body = if base64 {
            STANDARD.encode(BODY)
        } else {
            BODY.to_owned()
        };
        let json = serde_json::json!({
            "httpMethod": "POST",
            "path": "/upload",
            "headers": { "Content-Type": "multipart/form-data; boundary=form-boundary" },
            "body": body,
            "isBase64Encoded": base64
        });
        ProxyRequest::from_json(&json.to_string()).expect("event")
    }

    #[tokio::test]
    #[ignore = "requires S3 endpoint"]
    async fn test_should_store_uploaded_file() {
        let scratch = Scratch::new("upload").await;
        let (gateway, bucket) = (&scratch.gateway, scratch.bucket.as_str());

        for base64 in [false, true] {
            let decoded = event(base64).decode_files(None).expect("decode");
            assert_eq!(decoded.len(), 1);

            let part = decoded.into_iter().next().expect("file part");
            assert_eq!(part.file_name(), "orders.csv");
            let key = format!("incoming/{}", part.file_name());

            gateway
                .put(REGION, bucket, &key, part.into_content())
                .await
                .expect("put");
            let stored = gateway.get(REGION, bucket, &key).await.expect("get");
            assert_eq!(stored.as_ref(), b"order,amount\r\n1,9.99\r\n");
        }

        scratch.remove_bucket().await;
    }
}
