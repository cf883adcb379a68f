//! Core building blocks shared by the lambdas3 crates.
//!
//! This crate holds the pieces every other crate leans on: the environment
//! driven [`LambdaS3Config`], the client/server [`ErrorCategory`] used to map
//! typed failures onto HTTP status codes, and tracing initialisation for the
//! Lambda bootstrap.

mod config;
mod error;
pub mod telemetry;

pub use config::{DEFAULT_MAX_UPLOAD_BYTES, EmptyObjectPolicy, LambdaS3Config};
pub use error::{ClassifyError, ErrorCategory};
