//! # Response Renderer
//!
//! Writes the response to the output stream. JSON bodies are re-indented
//! with tabs unless raw output was requested; everything else is copied
//! through unchanged.

use crate::options::RenderOptions;
use crate::request::CONTENT_TYPE;
use crate::transport::{sorted_pairs, HttpResponse};
use serde::de::IgnoredAny;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Errors raised while writing the response
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read response body: {0}")]
    ReadBody(#[source] io::Error),
    #[error("failed to copy response body: {0}")]
    CopyBody(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}

/// Render the response head and body according to `options`
pub fn render<W: Write>(
    response: &mut HttpResponse,
    options: &RenderOptions,
    out: &mut W,
) -> Result<(), RenderError> {
    if options.print_headers {
        write_head(response, out).map_err(RenderError::Write)?;
    }
    if !options.print_body {
        return Ok(());
    }

    if options.raw || !is_json_response(response) {
        io::copy(response.body_mut(), out).map_err(RenderError::CopyBody)?;
        return Ok(());
    }

    let mut data = Vec::new();
    response
        .body_mut()
        .read_to_end(&mut data)
        .map_err(RenderError::ReadBody)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let output = match indent_json(&data) {
        Ok(indented) => indented,
        Err(e) => {
            tracing::warn!("cannot pretty print JSON response: {}", e);
            data
        }
    };
    out.write_all(&output).map_err(RenderError::Write)
}

/// Status line, headers sorted by name, then one blank line
fn write_head<W: Write>(response: &HttpResponse, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", response.status_line())?;
    for (name, value) in sorted_pairs(response.headers()) {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)
}

/// Whether the response declares `application/json`, ignoring parameters
fn is_json_response(response: &HttpResponse) -> bool {
    let Some(content_type) = response.header(CONTENT_TYPE).filter(|value| !value.is_empty()) else {
        return false;
    };
    match content_type.parse::<mime::Mime>() {
        Ok(media_type) => media_type.essence_str() == mime::APPLICATION_JSON.essence_str(),
        Err(e) => {
            tracing::warn!("invalid content type {:?} in response: {}", content_type, e);
            false
        }
    }
}

/// Re-indent a JSON document with tabs, ending in exactly one newline.
///
/// The document is validated first. Only whitespace between tokens changes:
/// keys, string escapes and number text are copied as received.
pub fn indent_json(data: &[u8]) -> serde_json::Result<Vec<u8>> {
    serde_json::from_slice::<IgnoredAny>(data)?;

    let mut output = Vec::with_capacity(data.len() + data.len() / 4);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut opened = false;

    for &byte in data {
        if in_string {
            output.push(byte);
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        if byte.is_ascii_whitespace() {
            continue;
        }

        let after_open = std::mem::take(&mut opened);
        match byte {
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                // `{}` and `[]` stay on one line
                if !after_open {
                    newline(&mut output, depth);
                }
                output.push(byte);
            }
            _ => {
                if after_open {
                    newline(&mut output, depth);
                }
                match byte {
                    b'{' | b'[' => {
                        output.push(byte);
                        depth += 1;
                        opened = true;
                    }
                    b',' => {
                        output.push(byte);
                        newline(&mut output, depth);
                    }
                    b':' => output.extend_from_slice(b": "),
                    b'"' => {
                        output.push(byte);
                        in_string = true;
                    }
                    _ => output.push(byte),
                }
            }
        }
    }

    output.push(b'\n');
    Ok(output)
}

fn newline(output: &mut Vec<u8>, depth: usize) {
    output.push(b'\n');
    output.extend(std::iter::repeat(b'\t').take(depth));
}
