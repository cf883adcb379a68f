//! Runtime configuration.
//!
//! Provides [`LambdaS3Config`], loaded from the Lambda function's environment
//! variables.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default ceiling (in bytes) on the decoded multipart payload of one request.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50_000_000;

/// What a download of a zero-byte object means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyObjectPolicy {
    /// Zero bytes downloaded is a failure.
    #[default]
    Reject,
    /// Zero bytes downloaded is a valid, empty object.
    Allow,
}

/// lambdas3 configuration.
///
/// # Examples
///
/// ```
/// use lambdas3_core::LambdaS3Config;
///
/// let config = LambdaS3Config::default();
/// assert_eq!(config.max_upload_bytes, 50_000_000);
/// assert!(config.s3_endpoint_url.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct LambdaS3Config {
    /// Ceiling on the decoded multipart payload of one request.
    #[builder(default = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Whether a zero-byte download is returned instead of rejected.
    #[builder(default = false)]
    pub allow_empty_objects: bool,

    /// Custom S3-compatible endpoint (LocalStack, MinIO, ...).
    #[builder(default, setter(strip_option))]
    pub s3_endpoint_url: Option<String>,

    /// Use path-style addressing against the endpoint.
    #[builder(default = false)]
    pub s3_force_path_style: bool,
}

impl Default for LambdaS3Config {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: String::from("info"),
            allow_empty_objects: false,
            s3_endpoint_url: None,
            s3_force_path_style: false,
        }
    }
}

impl LambdaS3Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MAX_UPLOAD_BYTES` | `50000000` |
    /// | `LOG_LEVEL` | `info` |
    /// | `ALLOW_EMPTY_OBJECTS` | `false` |
    /// | `S3_ENDPOINT_URL` | *(unset)* |
    /// | `S3_FORCE_PATH_STYLE` | `false` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("MAX_UPLOAD_BYTES") {
            if let Ok(n) = v.trim().parse::<u64>() {
                if n > 0 {
                    config.max_upload_bytes = n;
                }
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("ALLOW_EMPTY_OBJECTS") {
            config.allow_empty_objects = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("S3_ENDPOINT_URL") {
            if !v.is_empty() {
                config.s3_endpoint_url = Some(v);
            }
        }
        if let Ok(v) = std::env::var("S3_FORCE_PATH_STYLE") {
            config.s3_force_path_style = parse_bool(&v);
        }

        config
    }

    /// The empty-download policy selected by this configuration.
    #[must_use]
    pub fn empty_object_policy(&self) -> EmptyObjectPolicy {
        if self.allow_empty_objects {
            EmptyObjectPolicy::Allow
        } else {
            EmptyObjectPolicy::Reject
        }
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
