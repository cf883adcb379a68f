//! Object URL construction.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in the key segment of an object URL.
///
/// Unreserved characters and `/` pass through so that key prefixes stay
/// readable as path segments.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Where an object is reachable once stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UrlStyle {
    /// `https://<bucket>.s3.<region>.amazonaws.com/<key>`.
    #[default]
    AwsVirtualHosted,
    /// `<endpoint>/<bucket>/<key>`.
    PathStyle {
        /// Base endpoint, e.g. `http://localhost:4566`.
        endpoint: String,
    },
    /// `<scheme>://<bucket>.<endpoint-host>/<key>`.
    VirtualHosted {
        /// Base endpoint, e.g. `https://storage.example.com`.
        endpoint: String,
    },
}

impl UrlStyle {
    /// Pick the style for an optional custom endpoint.
    #[must_use]
    pub fn for_endpoint(endpoint: Option<&str>, force_path_style: bool) -> Self {
        match endpoint {
            None => Self::AwsVirtualHosted,
            Some(endpoint) => {
                let endpoint = endpoint.trim_end_matches('/').to_owned();
                if force_path_style {
                    Self::PathStyle { endpoint }
                } else {
                    Self::VirtualHosted { endpoint }
                }
            }
        }
    }

    /// The URL of `bucket`/`key` in `region`.
    #[must_use]
    pub fn object_url(&self, region: &str, bucket: &str, key: &str) -> String {
        let key = encode_key(key);
        match self {
            Self::AwsVirtualHosted => {
                format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
            }
            Self::PathStyle { endpoint } => format!("{endpoint}/{bucket}/{key}"),
            Self::VirtualHosted { endpoint } => match endpoint.split_once("://") {
                Some((scheme, host)) => format!("{scheme}://{bucket}.{host}/{key}"),
                None => format!("{bucket}.{endpoint}/{key}"),
            },
        }
    }
}

/// The public AWS URL of `bucket`/`key` in `region`.
///
/// # Examples
///
/// ```
/// use lambdas3_storage::object_url;
///
/// assert_eq!(object_url("r", "b", "k"), "https://b.s3.r.amazonaws.com/k");
/// ```
#[must_use]
pub fn object_url(region: &str, bucket: &str, key: &str) -> String {
    UrlStyle::AwsVirtualHosted.object_url(region, bucket, key)
}

fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}
