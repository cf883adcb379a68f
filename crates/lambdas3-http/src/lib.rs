//! Multipart upload decoding for API Gateway proxy requests.
//!
//! This crate turns the request a Lambda function receives from API Gateway
//! into the files that were uploaded with it:
//!
//! - **Headers** ([`header`]): [`HeaderSet`], a case-insensitive view over the
//!   forwarded headers.
//! - **Media types** ([`media_type`]): [`parse_content_type`] tokenizes a
//!   `Content-Type` value into its base type and parameters.
//! - **Multipart** ([`multipart`]): [`MultipartDecoder`], a streaming decoder
//!   that enforces a byte ceiling as it reads.
//! - **Pipeline** ([`request`]): [`decode_request`] composes the three.
//! - **Proxy** ([`proxy`]): serde shapes of the proxy event and response.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lambdas3_http::ProxyRequest;
//!
//! # fn handle(event_json: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let request = ProxyRequest::from_json(event_json)?;
//! for part in request.decode_files(None)? {
//!     println!("{} ({} bytes)", part.file_name(), part.size_bytes());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod header;
pub mod media_type;
pub mod multipart;
pub mod part;
pub mod proxy;
pub mod request;

pub use error::{DecodeError, DecodeResult};
pub use header::HeaderSet;
pub use media_type::{ContentTypeInfo, parse_content_type};
pub use multipart::MultipartDecoder;
pub use part::{DecodedRequest, FilePart};
pub use proxy::{ProxyRequest, ProxyResponse};
pub use request::decode_request;
