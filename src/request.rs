//! # Request Assembler
//!
//! Accumulates parsed request items into headers, query parameters and a
//! form or JSON body, then produces the single outbound request.
//!
//! Whether `=` items become form values or JSON strings is fixed by
//! [`RequestOptions::json`] when the state is created, so the form map and
//! the JSON map can never both be populated.

use crate::items::{RequestItem, Separator};
use crate::options::RequestOptions;
use crate::values::{canonical_header_name, Values};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::io::{self, Read};
use thiserror::Error;
use url::Url;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A field of the JSON request body.
///
/// Both cases serialize as the field value; `StringValue` is always quoted
/// while `RawJson` is emitted exactly as the user wrote it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonField {
    StringValue(String),
    RawJson(Box<RawValue>),
}

impl PartialEq for JsonField {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsonField::StringValue(a), JsonField::StringValue(b)) => a == b,
            (JsonField::RawJson(a), JsonField::RawJson(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

/// Errors raised while applying request items or finalizing the request
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("cannot read file {path:?} for key {key}: {source}")]
    FileRead {
        key: String,
        path: String,
        source: io::Error,
    },
    #[error("invalid JSON in key {key}: {source}")]
    InvalidJson {
        key: String,
        source: serde_json::Error,
    },
    #[error("cannot specify non-string key {key} unless --json is specified")]
    JsonModeRequired { key: String },
    #[error("key value type separator \"{separator}\" not yet supported (key {key})")]
    UnsupportedItem { key: String, separator: Separator },
    #[error("cannot read body from stdin when form or JSON body is specified")]
    StdinConflict,
    #[error("error reading stdin: {0}")]
    ReadStdin(#[source] io::Error),
    #[error("cannot marshal JSON: {0}")]
    EncodeJson(#[source] serde_json::Error),
}

/// Mutable accumulator for one request-building pass
#[derive(Debug)]
pub struct RequestState {
    options: RequestOptions,
    url: Url,
    method: Option<String>,
    headers: Values,
    query: Values,
    form: Values<Vec<u8>>,
    json: BTreeMap<String, JsonField>,
    has_data: bool,
}

impl RequestState {
    /// Start a request for `url`; `method` is upper-cased when given
    pub fn new(url: Url, method: Option<String>, options: RequestOptions) -> Self {
        Self {
            options,
            url,
            method: method.map(|m| m.to_uppercase()),
            headers: Values::new(),
            query: Values::new(),
            form: Values::default(),
            json: BTreeMap::new(),
            has_data: false,
        }
    }

    /// Apply one request item, in command-line order
    pub fn apply(&mut self, item: &RequestItem) -> Result<(), AssemblyError> {
        let key = item.key();
        let value = item.value();

        match item.separator() {
            Separator::Header => self.add_header(key, value),
            Separator::Query => self.query.add(key, value),
            Separator::DataString => self.add_data(key, value.as_bytes().to_vec()),
            Separator::DataFile => {
                let contents = read_item_file(key, value)?;
                self.add_data(key, contents);
            }
            Separator::JsonValue => self.add_json_value(key, value.as_bytes())?,
            Separator::JsonFile => {
                self.require_json_mode(key)?;
                let contents = read_item_file(key, value)?;
                self.add_json_value(key, &contents)?;
            }
            Separator::FormFile => {
                return Err(AssemblyError::UnsupportedItem {
                    key: key.to_string(),
                    separator: item.separator(),
                })
            }
        }

        self.has_data |= item.separator().is_data();
        Ok(())
    }

    /// Append a header value; the name is stored in canonical form
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.add(canonical_header_name(name), value);
    }

    /// The explicit method, or POST when any data item was applied, else GET
    pub fn method(&self) -> String {
        match &self.method {
            Some(method) => method.clone(),
            None if self.has_data => "POST".to_string(),
            None => "GET".to_string(),
        }
    }

    pub fn headers(&self) -> &Values {
        &self.headers
    }

    pub fn query(&self) -> &Values {
        &self.query
    }

    pub fn form(&self) -> &Values<Vec<u8>> {
        &self.form
    }

    pub fn json(&self) -> &BTreeMap<String, JsonField> {
        &self.json
    }

    /// Materialize the outbound request.
    ///
    /// `stdin` is only consulted when no form or JSON fields were given and
    /// the method is neither GET nor HEAD.
    pub fn finalize(self, stdin: Option<&mut dyn Read>) -> Result<OutboundRequest, AssemblyError> {
        if self.options.use_stdin && (!self.form.is_empty() || !self.json.is_empty()) {
            return Err(AssemblyError::StdinConflict);
        }

        let method = self.method();
        let mut url = self.url;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.pairs());
        }

        let mut headers = self.headers;
        let body = if !self.form.is_empty() {
            set_default_content_type(&mut headers, FORM_CONTENT_TYPE);
            self.form.encode().into_bytes()
        } else if !self.json.is_empty() {
            set_default_content_type(&mut headers, JSON_CONTENT_TYPE);
            serde_json::to_vec(&self.json).map_err(AssemblyError::EncodeJson)?
        } else {
            match stdin {
                Some(reader) if method != "GET" && method != "HEAD" => {
                    let mut data = Vec::new();
                    reader
                        .read_to_end(&mut data)
                        .map_err(AssemblyError::ReadStdin)?;
                    if self.options.json {
                        set_default_content_type(&mut headers, JSON_CONTENT_TYPE);
                    }
                    data
                }
                _ => Vec::new(),
            }
        };

        if let Some(credentials) = &self.options.basic_auth {
            headers.set(
                AUTHORIZATION,
                format!("Basic {}", STANDARD.encode(credentials)),
            );
        }

        tracing::debug!(
            "Assembled {} {} with {} header(s) and {} body byte(s)",
            method,
            url,
            headers.len(),
            body.len()
        );

        Ok(OutboundRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Form values keep their bytes; JSON strings replace invalid UTF-8
    fn add_data(&mut self, key: &str, value: Vec<u8>) {
        if self.options.json {
            let value = String::from_utf8(value)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
            self.json
                .insert(key.to_string(), JsonField::StringValue(value));
        } else {
            self.form.add(key, value);
        }
    }

    fn add_json_value(&mut self, key: &str, value: &[u8]) -> Result<(), AssemblyError> {
        self.require_json_mode(key)?;
        let raw: Box<RawValue> =
            serde_json::from_slice(value).map_err(|source| AssemblyError::InvalidJson {
                key: key.to_string(),
                source,
            })?;
        self.json.insert(key.to_string(), JsonField::RawJson(raw));
        Ok(())
    }

    fn require_json_mode(&self, key: &str) -> Result<(), AssemblyError> {
        if self.options.json {
            Ok(())
        } else {
            Err(AssemblyError::JsonModeRequired {
                key: key.to_string(),
            })
        }
    }
}

fn read_item_file(key: &str, path: &str) -> Result<Vec<u8>, AssemblyError> {
    tracing::debug!("Reading value of {} from {}", key, path);
    std::fs::read(path).map_err(|source| AssemblyError::FileRead {
        key: key.to_string(),
        path: path.to_string(),
        source,
    })
}

fn set_default_content_type(headers: &mut Values, content_type: &str) {
    if !headers.contains_key(CONTENT_TYPE) {
        headers.set(CONTENT_TYPE, content_type);
    }
}

/// The finalized request handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    method: String,
    url: Url,
    headers: Values,
    body: Vec<u8>,
}

impl OutboundRequest {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &Values {
        &self.headers
    }

    /// First value of a header, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_name(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
