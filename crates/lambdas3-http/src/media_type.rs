//! `Content-Type` and `Content-Disposition` value parsing.
//!
//! Both headers share the RFC 2045 grammar:
//!
//! ```text
//! value     := type [ "/" subtype ] *( ";" parameter ) [ ";" ]
//! parameter := token "=" ( token / quoted-string )
//! ```
//!
//! Type and parameter names are case-insensitive and are lower-cased; values
//! keep their case (multipart boundaries are case-sensitive).

use std::collections::HashMap;

use crate::error::{DecodeError, DecodeResult};

/// A parsed media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeInfo {
    /// Lower-cased `type/subtype`, e.g. `multipart/form-data`, or a bare
    /// `type` when no subtype was given.
    pub base_type: String,
    /// Parameters keyed by lower-cased name, values unquoted.
    pub parameters: HashMap<String, String>,
}

impl ContentTypeInfo {
    /// Look up a parameter by name (case-insensitive).
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The non-empty `boundary` parameter, if any.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary").filter(|b| !b.is_empty())
    }

    /// Whether the base type is `multipart/*`.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.base_type.starts_with("multipart/")
    }
}

/// Parse a `Content-Type` header value.
///
/// # Examples
///
/// ```
/// use lambdas3_http::parse_content_type;
///
/// let info = parse_content_type("multipart/form-data; boundary=\"---X\"").unwrap();
/// assert_eq!(info.base_type, "multipart/form-data");
/// assert_eq!(info.boundary(), Some("---X"));
/// ```
pub fn parse_content_type(raw: &str) -> DecodeResult<ContentTypeInfo> {
    let mut cursor = Cursor::new(raw.trim());

    let top = cursor.take_token();
    if top.is_empty() {
        return Err(DecodeError::media_type(raw, "missing top-level type"));
    }
    let base_type = if cursor.eat(b'/') {
        let sub = cursor.take_token();
        if sub.is_empty() {
            return Err(DecodeError::media_type(raw, "missing subtype"));
        }
        format!("{top}/{sub}")
    } else {
        top.to_owned()
    };

    let parameters =
        parse_parameters(&mut cursor).map_err(|reason| DecodeError::media_type(raw, reason))?;

    Ok(ContentTypeInfo {
        base_type: base_type.to_ascii_lowercase(),
        parameters,
    })
}

/// Parse a disposition-style value (`form-data; name="f"; filename="a.csv"`).
///
/// Returns the lower-cased disposition type and its parameters.
pub(crate) fn parse_disposition(
    raw: &str,
) -> Result<(String, HashMap<String, String>), &'static str> {
    let mut cursor = Cursor::new(raw.trim());
    let kind = cursor.take_token();
    if kind.is_empty() {
        return Err("missing disposition type");
    }
    let parameters = parse_parameters(&mut cursor)?;
    Ok((kind.to_ascii_lowercase(), parameters))
}

fn parse_parameters(cursor: &mut Cursor<'_>) -> Result<HashMap<String, String>, &'static str> {
    let mut parameters = HashMap::new();

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Ok(parameters),
            Some(b';') => cursor.bump(),
            Some(_) => return Err("expected ';' before parameter"),
        }

        cursor.skip_whitespace();
        if cursor.peek().is_none() {
            // Trailing separator.
            return Ok(parameters);
        }

        let name = cursor.take_token();
        if name.is_empty() {
            return Err("expected parameter name");
        }
        cursor.skip_whitespace();
        if !cursor.eat(b'=') {
            return Err("expected '=' after parameter name");
        }
        cursor.skip_whitespace();

        let value = if cursor.peek() == Some(b'"') {
            cursor.take_quoted()?
        } else {
            let token = cursor.take_token();
            if token.is_empty() {
                return Err("expected parameter value");
            }
            token.to_owned()
        };

        if parameters
            .insert(name.to_ascii_lowercase(), value)
            .is_some()
        {
            return Err("duplicate parameter name");
        }
    }
}

/// RFC 2045 `token` character: visible ASCII minus `tspecials`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b)
}

/// Byte cursor over a header value.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.bump();
        }
    }

    fn take_token(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_token_byte) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    /// Consume a quoted-string, returning its unescaped content.
    fn take_quoted(&mut self) -> Result<String, &'static str> {
        // Opening quote.
        self.bump();
        let mut value = String::new();
        let mut chars = self.input[self.pos..].char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += offset + 1;
                    return Ok(value);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                '\r' | '\n' => return Err("line break inside quoted-string"),
                _ => value.push(c),
            }
        }

        Err("unterminated quoted-string")
    }
}
