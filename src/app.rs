//! # Application Flow
//!
//! One invocation: parse request items, assemble the request, hand it to
//! the transport, render the response and work out the exit status.

use crate::cmd_args::CommandLineArgs;
use crate::config::Defaults;
use crate::error::{AppError, EXIT_FAILURE};
use crate::items::parse_item;
use crate::options::RenderOptions;
use crate::render::{render, RenderError};
use crate::request::{OutboundRequest, RequestState};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::io::{self, Read, Write};

/// Result of a completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    status: u16,
    check_status: bool,
}

impl Outcome {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// 0, or the first digit of a non-2xx status when status checking is on
    pub fn exit_code(&self) -> i32 {
        let class = i32::from(self.status / 100);
        if self.check_status && class != 2 {
            if class == 0 {
                EXIT_FAILURE
            } else {
                class
            }
        } else {
            0
        }
    }
}

/// Parse every request item and assemble the outbound request.
///
/// Default headers from the config file are applied before the items.
pub fn build_request(
    args: &CommandLineArgs,
    defaults: &Defaults,
    stdin: Option<&mut dyn Read>,
) -> Result<OutboundRequest, AppError> {
    let invocation = args.invocation()?;
    let items = invocation
        .items
        .iter()
        .map(|raw| {
            parse_item(raw).map_err(|source| AppError::Parse {
                item: raw.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut state = RequestState::new(
        invocation.url,
        invocation.method,
        args.request_options(defaults),
    );
    for (name, value) in &defaults.headers {
        state.add_header(name, value);
    }
    for item in &items {
        state.apply(item)?;
    }

    Ok(state.finalize(stdin)?)
}

/// Send the request and render the response to `out`
pub fn execute<T, W>(
    request: &OutboundRequest,
    transport: &T,
    options: &RenderOptions,
    out: &mut W,
) -> Result<Outcome, AppError>
where
    T: HttpTransport + ?Sized,
    W: Write,
{
    let mut response = transport.execute(request)?;
    tracing::debug!("Received {}", response.status_text());

    if options.check_status && !response.is_success() {
        tracing::warn!("HTTP response code {}", response.status_text());
    }
    render(&mut response, options, out)?;
    out.flush().map_err(RenderError::Write)?;

    Ok(Outcome {
        status: response.status(),
        check_status: options.check_status,
    })
}

/// Run one invocation against the real network, writing to stdout
pub fn run(args: &CommandLineArgs, defaults: &Defaults) -> Result<Outcome, AppError> {
    let request = if args.use_stdin() {
        let mut stdin = io::stdin().lock();
        build_request(args, defaults, Some(&mut stdin as &mut dyn Read))?
    } else {
        build_request(args, defaults, None)?
    };

    let transport = ReqwestTransport::new(&args.transport_options(defaults))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&request, &transport, &args.render_options(defaults), &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ParseError;
    use crate::request::AssemblyError;
    use crate::transport::{HttpResponse, TransportError};
    use std::cell::RefCell;
    use std::io::Cursor;

    /// Records the request and replies with a canned response
    struct StubTransport {
        status: u16,
        content_type: &'static str,
        body: &'static str,
        seen: RefCell<Option<OutboundRequest>>,
    }

    impl StubTransport {
        fn new(status: u16, content_type: &'static str, body: &'static str) -> Self {
            Self {
                status,
                content_type,
                body,
                seen: RefCell::new(None),
            }
        }
    }

    impl HttpTransport for StubTransport {
        fn execute(&self, request: &OutboundRequest) -> Result<HttpResponse, TransportError> {
            *self.seen.borrow_mut() = Some(request.clone());
            Ok(
                HttpResponse::new(self.status, "Status", Cursor::new(self.body.as_bytes().to_vec()))
                    .with_header("Content-Type", self.content_type),
            )
        }
    }

    fn build(argv: &[&str]) -> Result<OutboundRequest, AppError> {
        let mut full = vec!["httpline"];
        full.extend_from_slice(argv);
        let args = CommandLineArgs::parse_from(full);
        build_request(&args, &Defaults::default(), None)
    }

    #[test]
    fn build_request_should_assemble_json_items() {
        let request = build(&["--json", "foo.com", "h1:hval1", "u1==uval1", "j1=123"]).unwrap();

        assert_eq!(request.method(), "POST");
        assert_eq!(request.url().as_str(), "http://foo.com/?u1=uval1");
        assert_eq!(request.header("H1"), Some("hval1"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.body(), br#"{"j1":"123"}"#);
    }

    #[test]
    fn build_request_should_report_offending_item() {
        let err = build(&["foo.com", "good=1", ":novalue"]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Parse {
                ref item,
                source: ParseError::EmptyKey
            } if item == ":novalue"
        ));
        assert_eq!(err.exit_code(), 2);

        let err = build(&["foo.com", "noseparator"]).unwrap_err();
        assert!(err.to_string().contains("no key-pair separator found"));
    }

    #[test]
    fn build_request_should_reject_json_items_without_json_mode() {
        let err = build(&["foo.com", "n:=1"]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Assembly(AssemblyError::JsonModeRequired { .. })
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn build_request_should_apply_default_headers_first() {
        let args = CommandLineArgs::parse_from(["httpline", "foo.com", "X-Team:override", "a=b"]);
        let defaults = Defaults {
            headers: vec![
                ("x-team".to_string(), "core".to_string()),
                ("Content-Type".to_string(), "text/plain".to_string()),
            ],
            ..Defaults::default()
        };

        let request = build_request(&args, &defaults, None).unwrap();
        assert_eq!(
            request.headers().get("X-Team"),
            Some(&["core".to_string(), "override".to_string()][..])
        );
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn build_request_should_read_stdin_body() {
        let args = CommandLineArgs::parse_from(["httpline", "--stdin", "put", "foo.com"]);
        let mut stdin = Cursor::new(b"payload".to_vec());

        let request = build_request(&args, &Defaults::default(), Some(&mut stdin as &mut dyn Read)).unwrap();
        assert_eq!(request.method(), "PUT");
        assert_eq!(request.body(), b"payload");
    }

    #[test]
    fn execute_should_render_and_report_status() {
        let request = build(&["foo.com"]).unwrap();
        let transport = StubTransport::new(200, "application/json", r#"{"ok":true}"#);
        let mut out = Vec::new();

        let outcome = execute(&request, &transport, &RenderOptions::default(), &mut out).unwrap();
        assert_eq!(outcome.status(), 200);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "{\n\t\"ok\": true\n}\n");
        assert_eq!(
            transport.seen.borrow().as_ref().map(|r| r.method().to_string()),
            Some("GET".to_string())
        );
    }

    #[test]
    fn execute_should_exit_with_status_class_when_checking() {
        let request = build(&["foo.com"]).unwrap();
        let transport = StubTransport::new(404, "text/plain", "missing");
        let options = RenderOptions {
            check_status: true,
            ..RenderOptions::default()
        };
        let mut out = Vec::new();

        let outcome = execute(&request, &transport, &options, &mut out).unwrap();
        assert_eq!(outcome.exit_code(), 4);
        assert_eq!(out, b"missing");

        let unchecked = execute(&request, &transport, &RenderOptions::default(), &mut Vec::new())
            .unwrap();
        assert_eq!(unchecked.exit_code(), 0);
    }

    #[test]
    fn test_outcome_exit_code() {
        let outcome = |status, check_status| Outcome {
            status,
            check_status,
        };
        assert_eq!(outcome(201, true).exit_code(), 0);
        assert_eq!(outcome(302, true).exit_code(), 3);
        assert_eq!(outcome(503, true).exit_code(), 5);
        assert_eq!(outcome(503, false).exit_code(), 0);
    }
}
