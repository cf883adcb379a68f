//! API Gateway proxy event and response shapes.
//!
//! Only the fields this crate needs are modelled. Both REST API (payload 1.0)
//! and HTTP API (payload 2.0) events deserialize, since each carries `headers`,
//! `body` and `isBase64Encoded`; unknown fields are ignored and `null`
//! collections become empty.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::StatusCode;
use lambdas3_core::{ClassifyError, LambdaS3Config};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DecodeResult;
use crate::header::HeaderSet;
use crate::part::DecodedRequest;
use crate::request::decode_request;

/// Inbound request event, as delivered by API Gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// HTTP method (payload 1.0 only).
    #[serde(default)]
    pub http_method: Option<String>,
    /// Request path (payload 1.0 only).
    #[serde(default)]
    pub path: Option<String>,
    /// Single-value headers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    /// Multi-value headers (payload 1.0 only).
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    /// Raw body text, or base64 when `is_base64_encoded` is set.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyRequest {
    /// Parse an event from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// All request headers.
    ///
    /// Single-value headers come first; a multi-value header contributes its
    /// first value only when no single-value header of that name exists.
    #[must_use]
    pub fn header_set(&self) -> HeaderSet {
        let mut headers: HeaderSet = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (name, values) in &self.multi_value_headers {
            if headers.contains(name) {
                continue;
            }
            if let Some(first) = values.first() {
                headers.insert(name.clone(), first.clone());
            }
        }

        headers
    }

    /// Decode the uploaded files carried by this event.
    ///
    /// `None` applies the default ceiling.
    pub fn decode_files(&self, max_bytes: Option<u64>) -> DecodeResult<DecodedRequest> {
        decode_request(
            &self.header_set(),
            self.body.as_deref().unwrap_or_default(),
            self.is_base64_encoded,
            max_bytes.unwrap_or(0),
        )
    }

    /// Decode the uploaded files, capped at `config.max_upload_bytes`.
    pub fn decode_files_with(&self, config: &LambdaS3Config) -> DecodeResult<DecodedRequest> {
        self.decode_files(Some(config.max_upload_bytes))
    }
}

/// Outbound response, as expected by API Gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Body text, or base64 when `is_base64_encoded` is set.
    pub body: String,
    /// Whether `body` is base64.
    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// A JSON response.
    pub fn json<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: status.as_u16(),
            headers: content_type_header("application/json"),
            body: serde_json::to_string(value)?,
            is_base64_encoded: false,
        })
    }

    /// A binary response, base64-encoded for transport.
    #[must_use]
    pub fn binary(status: StatusCode, content_type: &str, content: &[u8]) -> Self {
        Self {
            status_code: status.as_u16(),
            headers: content_type_header(content_type),
            body: STANDARD.encode(content),
            is_base64_encoded: true,
        }
    }

    /// An error response carrying the error's kind and message.
    ///
    /// ```json
    /// { "code": "PayloadTooLarge", "category": "client", "message": "..." }
    /// ```
    #[must_use]
    pub fn from_error<E: ClassifyError + ?Sized>(error: &E) -> Self {
        let body = serde_json::json!({
            "code": error.code(),
            "category": error.category().to_string(),
            "message": error.to_string(),
        });

        Self {
            status_code: error.status_code().as_u16(),
            headers: content_type_header("application/json"),
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }
}

fn content_type_header(value: &str) -> HashMap<String, String> {
    HashMap::from([("Content-Type".to_owned(), value.to_owned())])
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
