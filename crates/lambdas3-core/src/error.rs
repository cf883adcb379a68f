//! Error classification shared by the decoding and storage crates.
//!
//! Each crate keeps its own typed error enum. [`ClassifyError`] lets callers
//! treat them uniformly: decide whether the caller or the backend is at fault
//! and pick an HTTP status without matching on every variant.

use std::fmt;

use http::StatusCode;

/// Which side of the call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The caller supplied malformed input.
    Client,
    /// The storage backend or the surrounding infrastructure failed.
    Server,
}

impl ErrorCategory {
    /// Default HTTP status for the category.
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::Client => StatusCode::BAD_REQUEST,
            Self::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure is the caller's fault.
    #[must_use]
    pub fn is_client(self) -> bool {
        self == Self::Client
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::Server => f.write_str("server"),
        }
    }
}

/// A typed error that knows its kind and category.
pub trait ClassifyError: std::error::Error {
    /// Stable, machine-readable kind name (e.g. `"PayloadTooLarge"`).
    fn code(&self) -> &'static str;

    /// Client or server fault.
    fn category(&self) -> ErrorCategory;

    /// HTTP status to answer with. Defaults to the category's status.
    fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }
}
