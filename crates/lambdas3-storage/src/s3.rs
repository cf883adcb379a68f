//! Amazon S3 object backend.
//!
//! Clients are created lazily, one per region, from the default AWS
//! credential chain (or a caller-supplied base [`SdkConfig`]) and cached for
//! the life of the backend. Credentials are resolved when a client is first
//! created so a missing or broken chain surfaces as
//! [`StorageError::SessionError`]. A custom endpoint redirects every region to
//! an S3-compatible service.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use dashmap::DashMap;
use lambdas3_core::LambdaS3Config;
use tracing::{debug, warn};

use crate::backend::ObjectBackend;
use crate::error::{BoxError, StorageError, StorageResult};
use crate::location::UrlStyle;

/// S3 backend with a per-region client cache.
#[derive(Debug, Default)]
pub struct S3Backend {
    clients: DashMap<String, Client>,
    base_config: Option<SdkConfig>,
    endpoint_url: Option<String>,
    force_path_style: bool,
    url_style: UrlStyle,
}

impl S3Backend {
    /// A backend talking to AWS S3.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend honoring the endpoint settings of `config`.
    #[must_use]
    pub fn from_config(config: &LambdaS3Config) -> Self {
        let endpoint_url = config.s3_endpoint_url.clone();
        let url_style = UrlStyle::for_endpoint(endpoint_url.as_deref(), config.s3_force_path_style);
        Self {
            clients: DashMap::new(),
            base_config: None,
            endpoint_url,
            force_path_style: config.s3_force_path_style,
            url_style,
        }
    }

    /// Use a prebuilt client for `region` instead of the default chain.
    #[must_use]
    pub fn with_client(self, region: impl Into<String>, client: Client) -> Self {
        self.clients.insert(region.into(), client);
        self
    }

    /// Build clients from `config` instead of loading the default chain.
    ///
    /// The region of each client still comes from the call.
    #[must_use]
    pub fn with_sdk_config(mut self, config: SdkConfig) -> Self {
        self.base_config = Some(config);
        self
    }

    async fn session_config(&self, region: &str) -> SdkConfig {
        let region = Region::new(region.to_owned());
        match &self.base_config {
            Some(base) => base.clone().into_builder().region(region).build(),
            None => {
                aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await
            }
        }
    }

    async fn client(&self, region: &str) -> StorageResult<Client> {
        let cached = self.clients.get(region).map(|c| c.value().clone());
        if let Some(client) = cached {
            return Ok(client);
        }

        let session_error = |source: BoxError| StorageError::SessionError {
            region: region.to_owned(),
            source,
        };

        let sdk_config = self.session_config(region).await;
        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| session_error("no AWS credentials provider is configured".into()))?;
        provider.provide_credentials().await.map_err(|e| {
            warn!(region, error = %DisplayErrorContext(&e), "unable to resolve AWS credentials");
            session_error(e.into())
        })?;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(self.force_path_style);
        if let Some(endpoint) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        let client = Client::from_conf(builder.build());

        debug!(region, endpoint = ?self.endpoint_url, "created S3 client");
        // Concurrent first calls may each build a client; the last insert wins.
        self.clients.insert(region.to_owned(), client.clone());
        Ok(client)
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn put_object(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
        content: Bytes,
    ) -> StorageResult<String> {
        let client = self.client(region).await?;

        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| {
                warn!(bucket, key, error = %DisplayErrorContext(&e), "S3 PutObject failed");
                StorageError::upload(bucket, key, e)
            })?;

        Ok(self.url_style.object_url(region, bucket, key))
    }

    async fn get_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let client = self.client(region).await?;

        let output = client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                warn!(bucket, key, error = %DisplayErrorContext(&e), "S3 GetObject failed");
                StorageError::download(bucket, key, e)
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download(bucket, key, e))?;

        Ok(data.into_bytes())
    }

    async fn delete_object(&self, region: &str, bucket: &str, key: &str) -> StorageResult<()> {
        let client = self.client(region).await?;

        client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                warn!(bucket, key, error = %DisplayErrorContext(&e), "S3 DeleteObject failed");
                StorageError::delete(bucket, key, e)
            })?;

        Ok(())
    }
}
