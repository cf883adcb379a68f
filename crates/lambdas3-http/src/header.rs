//! Case-insensitive header lookup.
//!
//! API Gateway forwards header names with whatever casing the client or an
//! intermediate proxy chose (`content-type`, `Content-Type`, `CONTENT-TYPE`).
//! [`HeaderSet`] keeps the names as received and resolves lookups the way
//! HTTP does: without regard to ASCII case.

use std::collections::HashMap;
use std::hash::BuildHasher;

/// An immutable snapshot of request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// Create an empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a header value by name.
    ///
    /// An exact-case match wins; otherwise the first case-insensitive match is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use lambdas3_http::HeaderSet;
    ///
    /// let headers: HeaderSet = [("CONTENT-TYPE", "text/plain")].into_iter().collect();
    /// assert_eq!(headers.find("content-type"), Some("text/plain"));
    /// ```
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, v)| v.as_str())
    }

    /// Whether a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Append a header. Existing entries with the same name are kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<S: BuildHasher> From<HashMap<String, String, S>> for HeaderSet {
    fn from(map: HashMap<String, String, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<S: BuildHasher> From<&HashMap<String, String, S>> for HeaderSet {
    fn from(map: &HashMap<String, String, S>) -> Self {
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl From<&http::HeaderMap> for HeaderSet {
    fn from(map: &http::HeaderMap) -> Self {
        map.iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect()
    }
}
