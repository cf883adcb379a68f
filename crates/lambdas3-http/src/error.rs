//! Failures of the request decoding pipeline.

use http::StatusCode;
use lambdas3_core::{ClassifyError, ErrorCategory};

/// Request decoding error.
///
/// Every variant except [`DecodeError::Read`] describes malformed caller input.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// No `Content-Type` header, or an empty one.
    #[error("request contained no Content-Type header")]
    ContentTypeHeaderMissing,

    /// The `Content-Type` value could not be tokenized.
    #[error("invalid media type {value:?}: {reason}")]
    InvalidMediaType {
        /// The raw header value.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The media type carries no usable `boundary` parameter.
    #[error("request contained no boundary value in the Content-Type header")]
    BoundaryValueMissing,

    /// The body was flagged as base64 but is not valid base64.
    #[error("request body is not valid base64: {reason}")]
    InvalidBodyEncoding {
        /// Decoder message.
        reason: String,
    },

    /// Decoded part content exceeded the ceiling.
    #[error("multipart payload exceeds the limit of {limit} bytes")]
    PayloadTooLarge {
        /// The ceiling that was exceeded.
        limit: u64,
    },

    /// Boundary markers missing or truncated, or unparseable part headers.
    #[error("malformed multipart body: {reason}")]
    MalformedMultipartBody {
        /// What the decoder tripped on.
        reason: String,
    },

    /// The body reader failed.
    #[error("failed to read request body: {0}")]
    Read(#[from] std::io::Error),
}

impl DecodeError {
    pub(crate) fn media_type(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMediaType {
            value: value.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMultipartBody {
            reason: reason.into(),
        }
    }
}

impl ClassifyError for DecodeError {
    fn code(&self) -> &'static str {
        match self {
            Self::ContentTypeHeaderMissing => "ContentTypeHeaderMissing",
            Self::InvalidMediaType { .. } => "InvalidMediaType",
            Self::BoundaryValueMissing => "BoundaryValueMissing",
            Self::InvalidBodyEncoding { .. } => "InvalidBodyEncoding",
            Self::PayloadTooLarge { .. } => "PayloadTooLarge",
            Self::MalformedMultipartBody { .. } => "MalformedMultipartBody",
            Self::Read(_) => "BodyReadFailed",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Read(_) => ErrorCategory::Server,
            _ => ErrorCategory::Client,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => self.category().status_code(),
        }
    }
}

/// Convenience result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;
