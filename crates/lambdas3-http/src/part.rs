//! Decoded upload parts.

use bytes::{Buf, Bytes};

/// One uploaded file extracted from a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    field_name: String,
    file_name: String,
    content_type: Option<mime::Mime>,
    content: Bytes,
}

impl FilePart {
    pub(crate) fn new(
        field_name: String,
        file_name: String,
        content_type: Option<mime::Mime>,
        content: Bytes,
    ) -> Self {
        Self {
            field_name,
            file_name,
            content_type,
            content,
        }
    }

    /// Form field the file was submitted under.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Client-side file name, without directory components.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    /// The part's own `Content-Type`, when present and well-formed.
    #[must_use]
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.content_type.as_ref()
    }

    /// The file content.
    #[must_use]
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// A reader over the content.
    #[must_use]
    pub fn reader(&self) -> impl std::io::Read + use<> {
        self.content.clone().reader()
    }

    /// Take ownership of the content, e.g. to hand it to a storage call.
    #[must_use]
    pub fn into_content(self) -> Bytes {
        self.content
    }
}

/// The file parts of one request, in body order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRequest {
    parts: Vec<FilePart>,
}

impl DecodedRequest {
    pub(crate) fn new(parts: Vec<FilePart>) -> Self {
        Self { parts }
    }

    /// Number of file parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no file was uploaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The file submitted under `field_name`, if any.
    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<&FilePart> {
        self.parts.iter().find(|p| p.field_name == field_name)
    }

    /// Iterate over the parts.
    pub fn iter(&self) -> std::slice::Iter<'_, FilePart> {
        self.parts.iter()
    }

    /// Total content bytes across all parts.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.parts.iter().map(FilePart::size_bytes).sum()
    }

    /// Consume into the underlying parts.
    #[must_use]
    pub fn into_parts(self) -> Vec<FilePart> {
        self.parts
    }
}

impl IntoIterator for DecodedRequest {
    type Item = FilePart;
    type IntoIter = std::vec::IntoIter<FilePart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<'a> IntoIterator for &'a DecodedRequest {
    type Item = &'a FilePart;
    type IntoIter = std::slice::Iter<'a, FilePart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
