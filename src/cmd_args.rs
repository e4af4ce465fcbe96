use crate::config::{timeout_from_secs, Defaults};
use crate::error::AppError;
use crate::options::{RenderOptions, RequestOptions, TransportOptions};
use crate::target::parse_target_url;
use std::ffi::OsString;
use std::time::Duration;
use url::Url;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Compose one HTTP request from typed request items and print the response",
    long_about = None,
    disable_help_flag = true,
    after_help = ITEMS_HELP
)]
struct ClapArgs {
    /// [METHOD] URL [REQUEST_ITEM...]
    /// METHOD is optional; without it, POST is used when data items are
    /// given and GET otherwise.
    #[clap(value_name = "ARGS", required = true)]
    args: Vec<String>,

    #[clap(
        short = 'j',
        long,
        conflicts_with = "form",
        help = "Serialize data items as a JSON object"
    )]
    json: bool,

    #[clap(short = 'f', long, help = "Serialize data items as form values")]
    form: bool,

    #[clap(short = 'h', long, help = "Print the response status line and headers")]
    headers: bool,

    #[clap(short = 'B', long = "no-body", help = "Do not print the response body")]
    no_body: bool,

    #[clap(long, help = "Print the response body without JSON post-processing")]
    raw: bool,

    #[clap(
        short = 'a',
        long,
        value_name = "USER:PASS",
        help = "HTTP basic auth credentials"
    )]
    auth: Option<String>,

    #[clap(long, help = "Skip HTTPS certificate checking")]
    insecure: bool,

    #[clap(
        long,
        help = "If the HTTP status is not 2xx, warn and exit with its first digit"
    )]
    check_status: bool,

    #[clap(long, help = "Read the request body from standard input")]
    stdin: bool,

    #[clap(
        long,
        value_name = "SECONDS",
        value_parser = parse_timeout,
        help = "Give up on the request after this many seconds"
    )]
    timeout: Option<Duration>,

    #[clap(short = 'v', long, help = "Print debugging messages, including HTTP messages")]
    verbose: bool,

    #[allow(dead_code)] // Consumed by clap, which prints help and exits
    #[clap(long, action = clap::ArgAction::Help, help = "Print help")]
    help: Option<bool>,
}

const ITEMS_HELP: &str = "\
REQUEST_ITEM separators:
  ':'   HTTP header                Referer:http://example.org
  '=='  URL parameter              search==httpline
  '='   data field (form or JSON)  name=value
  ':='  raw JSON field (--json)    amount:=42  colors:='[\"red\"]'
  '=@'  data field from a file     essay=@essay.txt
  ':=@' raw JSON field from a file package:=@package.json

Use a backslash to escape a separator in a key: field-name-with\\:colon=value";

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("{value:?} is not a number of seconds"))?;
    timeout_from_secs(seconds).map_err(|e| e.to_string())
}

/// Method, target URL and raw request items of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub method: Option<String>,
    pub url: Url,
    pub items: &'a [String],
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    args: Vec<String>,
    json: bool,
    form: bool,
    headers: bool,
    no_body: bool,
    raw: bool,
    auth: Option<String>,
    insecure: bool,
    check_status: bool,
    stdin: bool,
    timeout: Option<Duration>,
    verbose: bool,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            args: args.args,
            json: args.json,
            form: args.form,
            headers: args.headers,
            no_body: args.no_body,
            raw: args.raw,
            auth: args.auth,
            insecure: args.insecure,
            check_status: args.check_status,
            stdin: args.stdin,
            timeout: args.timeout,
            verbose: args.verbose,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::try_parse_from(itr).map(Into::into)
    }

    /// Split positionals into method, URL and request items.
    ///
    /// The first positional is a method when it consists only of ASCII
    /// letters.
    pub fn invocation(&self) -> Result<Invocation<'_>, AppError> {
        let (method, rest) = match self.args.split_first() {
            Some((first, rest)) if is_method(first) => (Some(first.to_uppercase()), rest),
            Some(_) => (None, self.args.as_slice()),
            None => return Err(AppError::Usage("missing URL".to_string())),
        };
        let Some((url_arg, items)) = rest.split_first() else {
            return Err(AppError::Usage("missing URL".to_string()));
        };
        let url = parse_target_url(url_arg)
            .map_err(|e| AppError::Usage(format!("invalid URL {url_arg:?}: {e}")))?;

        Ok(Invocation { method, url, items })
    }

    pub fn request_options(&self, defaults: &Defaults) -> RequestOptions {
        RequestOptions {
            json: (self.json || defaults.json) && !self.form,
            use_stdin: self.stdin,
            basic_auth: self.auth.clone(),
        }
    }

    pub fn transport_options(&self, defaults: &Defaults) -> TransportOptions {
        TransportOptions {
            insecure: self.insecure || defaults.insecure,
            timeout: self.timeout.or(defaults.timeout),
        }
    }

    pub fn render_options(&self, defaults: &Defaults) -> RenderOptions {
        RenderOptions {
            raw: self.raw || defaults.raw,
            print_headers: self.headers || defaults.print_headers,
            print_body: !self.no_body,
            check_status: self.check_status || defaults.check_status,
        }
    }

    pub fn use_stdin(&self) -> bool {
        self.stdin
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

fn is_method(arg: &str) -> bool {
    !arg.is_empty() && arg.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_args_url_only() {
        let args = CommandLineArgs::parse_from(["program", "http://foo.com/"]);
        let invocation = args.invocation().unwrap();
        assert_eq!(invocation.method, None);
        assert_eq!(invocation.url.as_str(), "http://foo.com/");
        assert!(invocation.items.is_empty());
        assert!(!args.verbose());
    }

    #[test]
    fn test_parse_args_method_is_uppercased() {
        let args = CommandLineArgs::parse_from(["program", "GeT", "http://foo.com/"]);
        let invocation = args.invocation().unwrap();
        assert_eq!(invocation.method.as_deref(), Some("GET"));

        let args = CommandLineArgs::parse_from(["program", "put", "foo.com", "a=b"]);
        let invocation = args.invocation().unwrap();
        assert_eq!(invocation.method.as_deref(), Some("PUT"));
        assert_eq!(invocation.items, ["a=b".to_string()]);
    }

    #[test]
    fn test_parse_args_method_without_url() {
        let args = CommandLineArgs::parse_from(["program", "get"]);
        let err = args.invocation().unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_parse_args_requires_positionals() {
        let err = CommandLineArgs::try_parse_from(["program"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_parse_args_localhost_shorthand() {
        let args = CommandLineArgs::parse_from(["program", ":8080/foo", "h:v"]);
        let invocation = args.invocation().unwrap();
        assert_eq!(invocation.url.as_str(), "http://localhost:8080/foo");
        assert_eq!(invocation.items, ["h:v".to_string()]);
    }

    #[test]
    fn test_parse_args_short_flags() {
        let args = CommandLineArgs::parse_from([
            "program", "-j", "-h", "-B", "-a", "user:pw", "-v", "foo.com",
        ]);
        let defaults = Defaults::default();

        let request = args.request_options(&defaults);
        assert!(request.json);
        assert_eq!(request.basic_auth.as_deref(), Some("user:pw"));

        let render = args.render_options(&defaults);
        assert!(render.print_headers);
        assert!(!render.print_body);
        assert!(args.verbose());
    }

    #[test]
    fn test_parse_args_flags_after_url() {
        let args = CommandLineArgs::parse_from([
            "program",
            "foo.com",
            "--check-status",
            "--timeout",
            "1.5",
            "x=y",
        ]);
        let defaults = Defaults::default();

        assert!(args.render_options(&defaults).check_status);
        assert_eq!(
            args.transport_options(&defaults).timeout,
            Some(Duration::from_millis(1500))
        );
        assert_eq!(args.invocation().unwrap().items, ["x=y".to_string()]);
    }

    #[test]
    fn test_parse_args_json_conflicts_with_form() {
        assert!(CommandLineArgs::try_parse_from(["program", "-j", "-f", "foo.com"]).is_err());
    }

    #[test]
    fn test_parse_args_rejects_negative_timeout() {
        assert!(CommandLineArgs::try_parse_from(["program", "--timeout", "-3", "foo.com"]).is_err());
    }

    #[test]
    fn test_parse_args_rejects_oversized_timeout() {
        let err = CommandLineArgs::try_parse_from(["program", "--timeout", "1e20", "foo.com"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("timeout must be a non-negative number of seconds"));
    }

    #[test]
    fn test_defaults_apply_under_flags() {
        let defaults = Defaults {
            json: true,
            raw: true,
            insecure: true,
            timeout: Some(Duration::from_secs(9)),
            ..Defaults::default()
        };

        let args = CommandLineArgs::parse_from(["program", "foo.com"]);
        assert!(args.request_options(&defaults).json);
        assert!(args.render_options(&defaults).raw);
        assert!(args.transport_options(&defaults).insecure);
        assert_eq!(
            args.transport_options(&defaults).timeout,
            Some(Duration::from_secs(9))
        );

        let args = CommandLineArgs::parse_from(["program", "--form", "foo.com"]);
        assert!(!args.request_options(&defaults).json);
    }

    #[test]
    fn test_is_method() {
        assert!(is_method("delete"));
        assert!(!is_method("foo.com"));
        assert!(!is_method(":8080"));
        assert!(!is_method(""));
    }
}
