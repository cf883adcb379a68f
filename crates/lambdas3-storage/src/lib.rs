//! Object storage gateway for lambdas3.
//!
//! [`StorageGateway`] validates region, bucket, and key, then delegates to an
//! [`ObjectBackend`]: [`S3Backend`] in production, [`InMemoryBackend`] in
//! tests and local runs.
//!
//! ```no_run
//! use lambdas3_core::LambdaS3Config;
//! use lambdas3_storage::StorageGateway;
//!
//! # async fn run() -> Result<(), lambdas3_storage::StorageError> {
//! let gateway = StorageGateway::s3(&LambdaS3Config::from_env());
//! let stored = gateway.put("us-east-1", "uploads", "a.csv", "id\n1\n").await?;
//! println!("stored at {}", stored.url);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod gateway;
pub mod location;
pub mod memory;
pub mod s3;

pub use backend::ObjectBackend;
pub use error::{StorageError, StorageResult};
pub use gateway::{StorageGateway, StoredObject};
pub use location::{UrlStyle, object_url};
pub use memory::InMemoryBackend;
pub use s3::S3Backend;
