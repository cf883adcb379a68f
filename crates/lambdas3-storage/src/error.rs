//! Storage gateway error types.

use lambdas3_core::{ClassifyError, ErrorCategory};

/// Boxed backend failure kept as the error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Storage gateway error.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required region, bucket, or key was empty.
    #[error("required parameter {parameter} is empty")]
    InvalidParameters {
        /// Which parameter: `"region"`, `"bucket"`, or `"key"`.
        parameter: &'static str,
    },

    /// No backend client could be established for the region.
    #[error("unable to create a storage session for region {region}: {source}")]
    SessionError {
        /// Requested region.
        region: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// The backend rejected or failed the write.
    #[error("unable to upload {bucket}/{key}: {source}")]
    UploadFailed {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// The backend failed the read, or the object does not exist.
    #[error("unable to download {bucket}/{key}: {source}")]
    DownloadFailed {
        /// Source bucket.
        bucket: String,
        /// Source key.
        key: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// The backend failed the delete.
    #[error("unable to delete {bucket}/{key}: {source}")]
    DeleteFailed {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// The download returned zero bytes.
    #[error("the object {bucket}/{key} is empty")]
    EmptyObject {
        /// Source bucket.
        bucket: String,
        /// Source key.
        key: String,
    },
}

impl StorageError {
    pub(crate) fn upload(bucket: &str, key: &str, source: impl Into<BoxError>) -> Self {
        Self::UploadFailed {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn download(bucket: &str, key: &str, source: impl Into<BoxError>) -> Self {
        Self::DownloadFailed {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn delete(bucket: &str, key: &str, source: impl Into<BoxError>) -> Self {
        Self::DeleteFailed {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            source: source.into(),
        }
    }
}

impl ClassifyError for StorageError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameters { .. } => "InvalidParameters",
            Self::SessionError { .. } => "SessionError",
            Self::UploadFailed { .. } => "UploadFailed",
            Self::DownloadFailed { .. } => "DownloadFailed",
            Self::DeleteFailed { .. } => "DeleteFailed",
            Self::EmptyObject { .. } => "EmptyObject",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidParameters { .. } => ErrorCategory::Client,
            _ => ErrorCategory::Server,
        }
    }
}

/// Convenience result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
