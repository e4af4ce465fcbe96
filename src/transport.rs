//! # HTTP Transport
//!
//! The network round trip sits behind [`HttpTransport`] so that request
//! assembly and response rendering never touch a concrete client. The
//! production implementation is a blocking reqwest client.

use crate::options::TransportOptions;
use crate::request::OutboundRequest;
use crate::values::{canonical_header_name, Values};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::fmt;
use std::io::Read;
use thiserror::Error;

/// Errors from building or executing the request
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot make HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("cannot do HTTP request: {0}")]
    Request(#[source] reqwest::Error),
}

/// Executes one outbound request
pub trait HttpTransport {
    fn execute(&self, request: &OutboundRequest) -> Result<HttpResponse, TransportError>;
}

/// Response head plus an unread body stream
pub struct HttpResponse {
    version: String,
    status: u16,
    reason: String,
    headers: Values,
    body: Box<dyn Read + Send>,
}

impl HttpResponse {
    /// Create an HTTP/1.1 response with no headers
    pub fn new(status: u16, reason: impl Into<String>, body: impl Read + Send + 'static) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status,
            reason: reason.into(),
            headers: Values::new(),
            body: Box::new(body),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a header; the name is stored in canonical form
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.add(canonical_header_name(name), value);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status code and reason, e.g. `404 Not Found`
    pub fn status_text(&self) -> String {
        format!("{} {}", self.status, self.reason).trim_end().to_string()
    }

    /// Full status line, e.g. `HTTP/1.1 200 OK`
    pub fn status_line(&self) -> String {
        format!("{} {}", self.version, self.status_text())
    }

    /// Check if the status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &Values {
        &self.headers
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_name(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn body_mut(&mut self) -> &mut (dyn Read + Send) {
        self.body.as_mut()
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("version", &self.version)
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Blocking reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        tracing::debug!(
            "Creating HTTP client (insecure: {}, timeout: {:?})",
            options.insecure,
            options.timeout
        );
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(options.insecure)
            .timeout(options.timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &OutboundRequest) -> Result<HttpResponse, TransportError> {
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method().to_string()))?;
        let headers = to_header_map(request.headers())?;

        log_request(request);

        let mut builder = self
            .client
            .request(method, request.url().clone())
            .headers(headers);
        if !request.body().is_empty() {
            builder = builder.body(request.body().to_vec());
        }
        let response = builder.send().map_err(TransportError::Request)?;

        let status = response.status();
        let mut converted = HttpResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            std::io::empty(),
        )
        .with_version(format!("{:?}", response.version()));
        for (name, value) in response.headers() {
            converted = converted.with_header(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        log_response(&converted);

        converted.body = Box::new(response);
        Ok(converted)
    }
}

fn to_header_map(headers: &Values) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers.pairs() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

fn log_request(request: &OutboundRequest) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    tracing::debug!("> {} {}", request.method(), request.url());
    for (name, value) in sorted_pairs(request.headers()) {
        tracing::debug!("> {}: {}", name, value);
    }
    if !request.body().is_empty() {
        tracing::debug!("> body {:?}", String::from_utf8_lossy(request.body()));
    }
}

fn log_response(response: &HttpResponse) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    tracing::debug!("< {}", response.status_text());
    for (name, value) in sorted_pairs(response.headers()) {
        tracing::debug!("< {}: {}", name, value);
    }
}

/// Header pairs sorted by name; values keep their per-name order
pub fn sorted_pairs(headers: &Values) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = headers
        .pairs()
        .map(|(name, value)| (name, value.as_str()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
}
