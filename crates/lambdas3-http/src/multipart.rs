//! Streaming `multipart/form-data` decoder.
//!
//! The decoder pulls the body from any [`Read`] in fixed-size chunks and keeps
//! only what it has not yet classified: a tail shorter than the delimiter while
//! scanning content, or a part's header block (capped at
//! [`MAX_PART_HEADER_BYTES`]). The preamble and all part content are counted
//! against the byte ceiling before they are buffered, so a body that exceeds
//! the ceiling fails without ever holding more than the ceiling in memory.
//!
//! After the closing delimiter the reader is drained to the end without
//! buffering, so a failure in the underlying source (e.g. invalid base64 in
//! the epilogue) is still reported.
//!
//! Only file parts (those whose `Content-Disposition` carries a non-empty file
//! name) are retained. When several files share a field name the first one
//! wins and the rest are read past.

use std::collections::HashSet;
use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use percent_encoding::percent_decode_str;
use tracing::{debug, trace};

use crate::error::{DecodeError, DecodeResult};
use crate::header::HeaderSet;
use crate::media_type::parse_disposition;
use crate::part::{DecodedRequest, FilePart};

/// Bytes requested from the reader per call.
const READ_CHUNK: usize = 8 * 1024;

/// Upper bound on one part's header block.
pub const MAX_PART_HEADER_BYTES: usize = 16 * 1024;

/// Upper bound on the whitespace allowed between a boundary and its line break.
/// A longer run means the match was not a delimiter.
pub const MAX_BOUNDARY_PADDING: usize = 256;

/// Decodes a multipart body into its file parts.
///
/// # Examples
///
/// ```
/// use lambdas3_http::MultipartDecoder;
///
/// let body = "--XyZ\r\n\
///     Content-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
///     \r\n\
///     hello\r\n\
///     --XyZ--\r\n";
/// let decoded = MultipartDecoder::new(body.as_bytes(), "XyZ", 1024).decode().unwrap();
/// assert_eq!(decoded.get("doc").unwrap().content().as_ref(), b"hello");
/// ```
#[derive(Debug)]
pub struct MultipartDecoder<R> {
    source: Source<R>,
    max_bytes: u64,
}

impl<R: Read> MultipartDecoder<R> {
    /// Create a decoder for `boundary` with a ceiling of `max_bytes` content bytes.
    pub fn new(reader: R, boundary: &str, max_bytes: u64) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + 4);
        delimiter.extend_from_slice(b"\r\n--");
        delimiter.extend_from_slice(boundary.as_bytes());

        // A delimiter must start a line; seeding a CRLF lets one at offset 0 match.
        let mut buf = BytesMut::with_capacity(READ_CHUNK + delimiter.len());
        buf.extend_from_slice(b"\r\n");

        Self {
            source: Source {
                reader,
                buf,
                eof: false,
                delimiter,
            },
            max_bytes,
        }
    }

    /// Decode the whole body.
    pub fn decode(self) -> DecodeResult<DecodedRequest> {
        let Self {
            mut source,
            max_bytes,
        } = self;

        let mut consumed: u64 = 0;
        let mut seen: HashSet<String> = HashSet::new();
        let mut parts = Vec::new();

        let mut count = |len: usize| -> DecodeResult<()> {
            consumed += len as u64;
            if consumed > max_bytes {
                return Err(DecodeError::PayloadTooLarge { limit: max_bytes });
            }
            Ok(())
        };

        // The seeded CRLF is not part of the preamble.
        let mut seed = 2;
        let mut next = source.scan_to_delimiter("no boundary marker found in body", |chunk| {
            let skip = chunk.len().min(seed);
            seed -= skip;
            count(chunk.len() - skip)
        })?;

        while next == Delimiter::Open {
            let headers = source.read_part_headers()?;
            let disposition = PartDisposition::from_headers(&headers)?;

            let keep = match &disposition {
                PartDisposition::File { field_name, .. } => !seen.contains(field_name),
                PartDisposition::Field { .. } | PartDisposition::Unnamed => false,
            };
            let mut content = keep.then(BytesMut::new);

            next = source.scan_to_delimiter("body ended before the closing boundary", |chunk| {
                count(chunk.len())?;
                if let Some(content) = content.as_mut() {
                    content.extend_from_slice(chunk);
                }
                Ok(())
            })?;

            match (disposition, content) {
                (
                    PartDisposition::File {
                        field_name,
                        file_name,
                    },
                    Some(content),
                ) => {
                    let content_type = headers
                        .find("Content-Type")
                        .and_then(|v| v.trim().parse::<mime::Mime>().ok());
                    trace!(
                        field = %field_name,
                        file = %file_name,
                        size = content.len(),
                        "decoded file part"
                    );
                    seen.insert(field_name.clone());
                    parts.push(FilePart::new(
                        field_name,
                        file_name,
                        content_type,
                        content.freeze(),
                    ));
                }
                (PartDisposition::File { field_name, .. }, None) => {
                    debug!(field = %field_name, "dropping duplicate file field");
                }
                (PartDisposition::Field { field_name }, _) => {
                    trace!(field = %field_name, "skipping non-file form field");
                }
                (PartDisposition::Unnamed, _) => {
                    trace!("skipping part without a form-data name");
                }
            }
        }

        source.drain()?;

        debug!(
            files = parts.len(),
            body_bytes = consumed,
            "decoded multipart body"
        );
        Ok(DecodedRequest::new(parts))
    }
}

/// What follows a delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    /// Another part starts.
    Open,
    /// `--`: the body is complete.
    Close,
}

/// Classification of the bytes right after a delimiter match.
enum Lookahead {
    /// A part starts; consume this many bytes (padding + CRLF).
    Open(usize),
    /// The closing `--`.
    Close,
    /// The match is content that merely starts like a delimiter.
    NotDelimiter,
    /// Not enough input to decide.
    NeedMore,
}

fn classify(rest: &[u8], eof: bool) -> Lookahead {
    if rest.starts_with(b"--") {
        return Lookahead::Close;
    }

    let padding = rest
        .iter()
        .take(MAX_BOUNDARY_PADDING + 1)
        .take_while(|b| matches!(b, b' ' | b'\t'))
        .count();
    if padding > MAX_BOUNDARY_PADDING {
        return Lookahead::NotDelimiter;
    }
    if rest[padding..].starts_with(b"\r\n") {
        return Lookahead::Open(padding + 2);
    }

    let tail = &rest[padding..];
    let incomplete = tail.is_empty() || tail == b"\r" || (padding == 0 && tail == b"-");
    if incomplete && !eof {
        Lookahead::NeedMore
    } else {
        Lookahead::NotDelimiter
    }
}

/// Buffered body input.
#[derive(Debug)]
struct Source<R> {
    reader: R,
    buf: BytesMut,
    eof: bool,
    delimiter: Vec<u8>,
}

impl<R: Read> Source<R> {
    /// Read one more chunk. Returns `false` once the reader is exhausted.
    fn fill(&mut self) -> DecodeResult<bool> {
        if self.eof {
            return Ok(false);
        }

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Hand every byte before the next delimiter to `sink`, then consume the
    /// delimiter and report what follows it.
    fn scan_to_delimiter<F>(&mut self, eof_reason: &str, mut sink: F) -> DecodeResult<Delimiter>
    where
        F: FnMut(&[u8]) -> DecodeResult<()>,
    {
        let delimiter_len = self.delimiter.len();
        let mut search_from = 0;

        loop {
            if let Some(pos) =
                find_bytes(&self.buf[search_from..], &self.delimiter).map(|p| p + search_from)
            {
                match classify(&self.buf[pos + delimiter_len..], self.eof) {
                    Lookahead::Open(extra) => {
                        sink(&self.buf[..pos])?;
                        self.buf.advance(pos + delimiter_len + extra);
                        return Ok(Delimiter::Open);
                    }
                    Lookahead::Close => {
                        sink(&self.buf[..pos])?;
                        self.buf.advance(pos + delimiter_len + 2);
                        return Ok(Delimiter::Close);
                    }
                    Lookahead::NotDelimiter => {
                        search_from = pos + 1;
                        continue;
                    }
                    Lookahead::NeedMore => {
                        sink(&self.buf[..pos])?;
                        self.buf.advance(pos);
                        search_from = 0;
                        self.fill()?;
                        continue;
                    }
                }
            }

            // Nothing before the last `delimiter_len - 1` bytes can start a delimiter.
            let keep = (delimiter_len - 1).min(self.buf.len());
            let flush = self.buf.len() - keep;
            sink(&self.buf[..flush])?;
            self.buf.advance(flush);
            search_from = 0;

            // What is left is shorter than a delimiter and can never complete one.
            if !self.fill()? {
                return Err(DecodeError::malformed(eof_reason));
            }
        }
    }

    /// Read and discard the rest of the body.
    fn drain(&mut self) -> DecodeResult<()> {
        loop {
            self.buf.clear();
            if !self.fill()? {
                return Ok(());
            }
        }
    }

    /// Read a part's header block, up to and including the blank line.
    fn read_part_headers(&mut self) -> DecodeResult<HeaderSet> {
        loop {
            if self.buf.starts_with(b"\r\n") {
                self.buf.advance(2);
                return Ok(HeaderSet::new());
            }

            if let Some(pos) = find_bytes(&self.buf, b"\r\n\r\n") {
                if pos > MAX_PART_HEADER_BYTES {
                    break;
                }
                let block = self.buf.split_to(pos + 4);
                return parse_header_block(&block[..pos]);
            }

            if self.buf.len() > MAX_PART_HEADER_BYTES {
                break;
            }
            if !self.fill()? {
                return Err(DecodeError::malformed("body ended inside part headers"));
            }
        }

        Err(DecodeError::malformed(format!(
            "part headers exceed {MAX_PART_HEADER_BYTES} bytes"
        )))
    }
}

fn parse_header_block(block: &[u8]) -> DecodeResult<HeaderSet> {
    let text = String::from_utf8_lossy(block);
    let mut entries: Vec<(String, String)> = Vec::new();

    for line in text.split("\r\n") {
        if line.starts_with([' ', '\t']) {
            // Obsolete line folding continues the previous value.
            let Some((_, value)) = entries.last_mut() else {
                return Err(DecodeError::malformed(
                    "part header block starts with a continuation line",
                ));
            };
            value.push(' ');
            value.push_str(line.trim());
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(DecodeError::malformed(format!(
                "part header line without ':': {line:?}"
            )));
        };
        let name = name.trim();
        if name.is_empty() || name.contains([' ', '\t']) {
            return Err(DecodeError::malformed(format!(
                "invalid part header name: {name:?}"
            )));
        }
        entries.push((name.to_owned(), value.trim().to_owned()));
    }

    Ok(entries.into_iter().collect())
}

/// How a part identifies itself in its `Content-Disposition` header.
#[derive(Debug)]
enum PartDisposition {
    /// An uploaded file.
    File {
        field_name: String,
        file_name: String,
    },
    /// A plain form value.
    Field { field_name: String },
    /// No `form-data` disposition or no `name`.
    Unnamed,
}

impl PartDisposition {
    fn from_headers(headers: &HeaderSet) -> DecodeResult<Self> {
        let Some(raw) = headers.find("Content-Disposition") else {
            return Ok(Self::Unnamed);
        };

        let (kind, params) = parse_disposition(raw).map_err(|reason| {
            DecodeError::malformed(format!("invalid Content-Disposition {raw:?}: {reason}"))
        })?;

        if kind != "form-data" {
            return Ok(Self::Unnamed);
        }
        let Some(field_name) = params.get("name").filter(|n| !n.is_empty()).cloned() else {
            return Ok(Self::Unnamed);
        };

        let file_name = params
            .get("filename*")
            .and_then(|v| decode_extended_value(v))
            .or_else(|| params.get("filename").cloned())
            .map(|name| base_name(&name).to_owned())
            .filter(|name| !name.is_empty());

        Ok(match file_name {
            Some(file_name) => Self::File {
                field_name,
                file_name,
            },
            None => Self::Field { field_name },
        })
    }
}

/// Decode an RFC 5987 `charset'language'value` parameter.
fn decode_extended_value(raw: &str) -> Option<String> {
    let mut pieces = raw.splitn(3, '\'');
    let charset = pieces.next()?;
    let _language = pieces.next()?;
    let value = pieces.next()?;

    if !(charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("us-ascii")) {
        return None;
    }
    percent_decode_str(value)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Strip any client-side directory components from a file name.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Find the position of a needle in a haystack.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
