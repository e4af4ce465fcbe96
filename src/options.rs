//! # Invocation Options
//!
//! Settings resolved once from flags and config defaults, then passed
//! explicitly to the assembler, the transport and the renderer.

use std::time::Duration;

/// Options that change how request items are assembled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Serialize data items as a JSON object instead of form values
    pub json: bool,
    /// Read the request body from standard input
    pub use_stdin: bool,
    /// Basic auth credentials as `username:password`
    pub basic_auth: Option<String>,
}

/// Options handed to the HTTP transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Deadline for the whole request; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// Options that change how the response is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Print the body without JSON re-indentation
    pub raw: bool,
    /// Print the status line and headers before the body
    pub print_headers: bool,
    /// Print the response body at all
    pub print_body: bool,
    /// Warn and exit with the status class on non-2xx responses
    pub check_status: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            raw: false,
            print_headers: false,
            print_body: true,
            check_status: false,
        }
    }
}
