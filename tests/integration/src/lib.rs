//! End-to-end tests for lambdas3 against a live S3-compatible endpoint.
//!
//! Every test talks to the endpoint named by `S3_ENDPOINT_URL` (LocalStack's
//! `http://localhost:4566` when unset) with static test credentials, so the
//! tests are `#[ignore]`d by default:
//!
//! ```text
//! cargo test -p lambdas3-integration -- --ignored
//! ```

use std::sync::OnceLock;

use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use lambdas3_core::LambdaS3Config;
use lambdas3_storage::{S3Backend, StorageGateway};
use tracing_subscriber::EnvFilter;

/// Region every test runs in.
pub const REGION: &str = "us-east-1";

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Gateway logs go to the test harness output; `RUST_LOG` overrides `warn`.
fn install_log_capture() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Configuration pointing the gateway at the test endpoint, path-style.
#[must_use]
pub fn endpoint_config() -> LambdaS3Config {
    let endpoint = std::env::var("S3_ENDPOINT_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| LOCALSTACK_ENDPOINT.to_owned());

    LambdaS3Config::builder()
        .s3_endpoint_url(endpoint)
        .s3_force_path_style(true)
        .build()
}

/// Raw S3 client for bucket setup and teardown, sharing the gateway's endpoint.
#[must_use]
pub fn admin_client(config: &LambdaS3Config) -> aws_sdk_s3::Client {
    install_log_capture();

    let mut builder = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(REGION))
        .credentials_provider(Credentials::new(
            "test",
            "test",
            None,
            None,
            "lambdas3-integration",
        ))
        .force_path_style(config.s3_force_path_style);
    if let Some(endpoint) = &config.s3_endpoint_url {
        builder = builder.endpoint_url(endpoint);
    }

    aws_sdk_s3::Client::from_conf(builder.build())
}

/// A gateway that reuses `client` for [`REGION`] so no credential chain is
/// consulted.
#[must_use]
pub fn gateway(config: &LambdaS3Config, client: &aws_sdk_s3::Client) -> StorageGateway<S3Backend> {
    let backend = S3Backend::from_config(config).with_client(REGION, client.clone());
    StorageGateway::from_config(backend, config)
}

/// A fresh bucket for one test; release it with [`Scratch::remove_bucket`].
#[derive(Debug)]
pub struct Scratch {
    /// Setup/teardown client.
    pub client: aws_sdk_s3::Client,
    /// Gateway under test.
    pub gateway: StorageGateway<S3Backend>,
    /// Bucket created for the test.
    pub bucket: String,
}

/// Bucket names are `lambdas3-<label>-<8 hex chars>`.
#[must_use]
pub fn unique_bucket(label: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("lambdas3-{label}-{}", &suffix[..8])
}

impl Scratch {
    /// Create the bucket and the gateway.
    pub async fn new(label: &str) -> Self {
        let config = endpoint_config();
        let client = admin_client(&config);
        let gateway = gateway(&config, &client);
        let bucket = unique_bucket(label);

        if let Err(e) = client.create_bucket().bucket(&bucket).send().await {
            panic!("bucket {bucket} could not be created: {e}");
        }

        Self {
            client,
            gateway,
            bucket,
        }
    }

    /// Empty and delete the bucket; failures are ignored.
    pub async fn remove_bucket(self) {
        let Self { client, bucket, .. } = self;

        if let Ok(listing) = client.list_objects_v2().bucket(&bucket).send().await {
            for key in listing.contents().iter().filter_map(|o| o.key()) {
                let _ = client.delete_object().bucket(&bucket).key(key).send().await;
            }
        }
        let _ = client.delete_bucket().bucket(&bucket).send().await;
    }
}

mod test_gateway;
mod test_upload;
