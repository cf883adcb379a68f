//! End-to-end decoding of an upload request.
//!
//! ```text
//! HeaderSet ──find("Content-Type")──> raw media type
//!           ──parse_content_type────> ContentTypeInfo
//!           ──boundary()────────────> boundary token
//! body ─────[base64 DecoderReader]──> MultipartDecoder ──> DecodedRequest
//! ```
//!
//! Each arrow is a failure point; the first failure is returned and nothing
//! decoded so far is handed back.

use base64::engine::general_purpose::STANDARD;
use base64::read::DecoderReader;
use lambdas3_core::DEFAULT_MAX_UPLOAD_BYTES;
use tracing::debug;

use crate::error::{DecodeError, DecodeResult};
use crate::header::HeaderSet;
use crate::media_type::parse_content_type;
use crate::multipart::MultipartDecoder;
use crate::part::DecodedRequest;

/// Decode the file parts of a multipart upload.
///
/// `max_bytes` caps the decoded part content; `0` selects
/// [`DEFAULT_MAX_UPLOAD_BYTES`]. When `body_is_base64` is set the body is
/// base64-decoded on the fly as the multipart decoder consumes it.
///
/// # Examples
///
/// ```
/// use lambdas3_http::{HeaderSet, decode_request};
///
/// let headers: HeaderSet = [("content-type", "multipart/form-data; boundary=b")]
///     .into_iter()
///     .collect();
/// let body = "--b\r\n\
///     Content-Disposition: form-data; name=\"f\"; filename=\"x.txt\"\r\n\
///     \r\n\
///     data\r\n\
///     --b--";
/// let decoded = decode_request(&headers, body, false, 0).unwrap();
/// assert_eq!(decoded.len(), 1);
/// ```
pub fn decode_request(
    headers: &HeaderSet,
    body: &str,
    body_is_base64: bool,
    max_bytes: u64,
) -> DecodeResult<DecodedRequest> {
    let max_bytes = if max_bytes == 0 {
        DEFAULT_MAX_UPLOAD_BYTES
    } else {
        max_bytes
    };

    let raw = headers
        .find("Content-Type")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(DecodeError::ContentTypeHeaderMissing)?;

    let media_type = parse_content_type(raw)?;
    if !media_type.is_multipart() {
        debug!(
            media_type = %media_type.base_type,
            "decoding non-multipart media type as multipart"
        );
    }

    let boundary = media_type
        .boundary()
        .ok_or(DecodeError::BoundaryValueMissing)?;

    debug!(
        boundary,
        body_len = body.len(),
        body_is_base64,
        max_bytes,
        "decoding multipart request"
    );

    if body_is_base64 {
        let reader = DecoderReader::new(body.as_bytes(), &STANDARD);
        // The only fallible reader underneath is the base64 decoder.
        MultipartDecoder::new(reader, boundary, max_bytes)
            .decode()
            .map_err(|e| match e {
                DecodeError::Read(io) => DecodeError::InvalidBodyEncoding {
                    reason: io.to_string(),
                },
                other => other,
            })
    } else {
        MultipartDecoder::new(body.as_bytes(), boundary, max_bytes).decode()
    }
}
