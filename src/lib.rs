//! # httpline - HTTP Requests from Typed Command-Line Items
//!
//! Builds exactly one HTTP request from a method, a URL and a list of
//! request items, sends it, and prints the response.
//!
//! ## Flow
//!
//! ```text
//! argv ──► cmd_args ──► items::parse_item ──► request::RequestState
//!                        (one per item)        (apply, then finalize)
//!                                                      │
//!                                                      ▼
//!  stdout ◄── render::render ◄── transport::HttpTransport::execute
//! ```
//!
//! Request items use a typed separator between key and value:
//!
//! | Item           | Meaning                                   |
//! |----------------|-------------------------------------------|
//! | `Name:value`   | request header                            |
//! | `q==value`     | URL query parameter                       |
//! | `field=value`  | form field, or JSON string with `--json`  |
//! | `field:=json`  | raw JSON field (requires `--json`)        |
//! | `field=@path`  | data field read from a file               |
//! | `field:=@path` | raw JSON field read from a file           |

pub mod app;
pub mod cmd_args;
pub mod config;
pub mod error;
pub mod items;
pub mod options;
pub mod render;
pub mod request;
pub mod target;
pub mod transport;
pub mod values;

// Re-export main types for easy access
pub use app::{build_request, execute, run, Outcome};
pub use cmd_args::CommandLineArgs;
pub use config::Defaults;
pub use error::AppError;
pub use items::{parse_item, ParseError, RequestItem, Separator};
pub use options::{RenderOptions, RequestOptions, TransportOptions};
pub use render::{render, RenderError};
pub use request::{AssemblyError, JsonField, OutboundRequest, RequestState};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use values::Values;
