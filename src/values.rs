//! # Ordered Multi-Valued Maps
//!
//! Headers, query parameters and form fields all allow repeated keys and
//! must keep the order in which they were added.

use url::form_urlencoded;

/// Ordered multi-map of key to values.
///
/// Keys keep the position of their first insertion; values keep the order
/// in which they were added under that key. Form fields use byte values so
/// file contents need not be UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values<V = String> {
    entries: Vec<(String, Vec<V>)>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V> Values<V> {
    /// Append a value under `key`, keeping any values already present
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<V>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Replace every value under `key` with a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<V>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[V]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate keys with all their values, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Iterate flattened `(key, value)` pairs, in insertion order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value)))
    }
}

impl<V: AsRef<[u8]>> Values<V> {
    /// Encode as `application/x-www-form-urlencoded`; values are escaped byte by byte
    pub fn encode(&self) -> String {
        self.pairs()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    form_urlencoded::byte_serialize(key.as_bytes()).collect::<String>(),
                    form_urlencoded::byte_serialize(value.as_ref()).collect::<String>()
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Canonical MIME form of a header name: the first letter and any letter
/// following a hyphen are upper-cased, the rest lower-cased.
///
/// Names containing a space or other non-token byte are returned unchanged.
pub fn canonical_header_name(name: &str) -> String {
    let is_token = |c: char| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c);
    if !name.chars().all(is_token) {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}
