//! # Request Item Parser
//!
//! Splits one command-line request item into key, separator and value.
//!
//! Items look like `key<sep>value`. A backslash in the key copies the next
//! character literally, which is how a separator character ends up inside a
//! key (`field-name-with\:colon=value`). The value is taken verbatim.

use std::fmt;
use thiserror::Error;

/// Separator tag of a request item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// `:` HTTP header
    Header,
    /// `==` URL query parameter
    Query,
    /// `=` data field (form value, or JSON string in JSON mode)
    DataString,
    /// `=@` data field read from a file
    DataFile,
    /// `:=` raw JSON field
    JsonValue,
    /// `:=@` raw JSON field read from a file
    JsonFile,
    /// `@` multipart form file field
    FormFile,
}

/// Candidate separators in scan order.
///
/// Shorter separators are prefixes of longer ones, so the longest and most
/// specific must be tried first.
const SEPARATORS: [(&str, Separator); 7] = [
    (":=@", Separator::JsonFile),
    (":=", Separator::JsonValue),
    (":", Separator::Header),
    ("==", Separator::Query),
    ("=@", Separator::DataFile),
    ("=", Separator::DataString),
    ("@", Separator::FormFile),
];

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Header => ":",
            Separator::Query => "==",
            Separator::DataString => "=",
            Separator::DataFile => "=@",
            Separator::JsonValue => ":=",
            Separator::JsonFile => ":=@",
            Separator::FormFile => "@",
        }
    }

    /// Whether an item with this separator contributes to the request body
    pub fn is_data(&self) -> bool {
        !matches!(self, Separator::Header | Separator::Query)
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while parsing a request item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty key")]
    EmptyKey,
    #[error("no key-pair separator found")]
    NoSeparator,
}

/// One parsed request item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestItem {
    key: String,
    separator: Separator,
    value: String,
}

impl RequestItem {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Parse a single request item
pub fn parse_item(item: &str) -> Result<RequestItem, ParseError> {
    let mut key = String::with_capacity(item.len());
    let mut escaped = false;

    for (i, c) in item.char_indices() {
        if escaped {
            key.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }

        let rest = &item[i..];
        if let Some((token, separator)) = SEPARATORS.iter().find(|(s, _)| rest.starts_with(s)) {
            if key.is_empty() {
                return Err(ParseError::EmptyKey);
            }
            return Ok(RequestItem {
                key,
                separator: *separator,
                value: rest[token.len()..].to_string(),
            });
        }

        key.push(c);
    }

    Err(ParseError::NoSeparator)
}
