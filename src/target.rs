//! # Target URL
//!
//! Normalizes the URL argument: `:3000/x` and `:/x` are shorthands for
//! localhost, and a missing scheme defaults to `http://`.

use url::Url;

/// Parse the URL argument into an absolute URL
pub fn parse_target_url(arg: &str) -> Result<Url, url::ParseError> {
    let target = match arg.strip_prefix(':') {
        Some(path) if path.starts_with('/') => format!("http://localhost{path}"),
        Some(port) => format!("http://localhost:{port}"),
        None => arg.to_string(),
    };
    let target = if target.starts_with("http:") || target.starts_with("https:") {
        target
    } else {
        format!("http://{target}")
    };

    let url = Url::parse(&target)?;
    tracing::debug!("Target URL {} resolved to {}", arg, url);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_should_keep_absolute_urls() {
        let url = parse_target_url("http://foo.com/").unwrap();
        assert_eq!(url.as_str(), "http://foo.com/");

        let url = parse_target_url("https://foo.com/a?b=c").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.query(), Some("b=c"));
    }

    #[test]
    fn target_should_default_scheme() {
        let url = parse_target_url("foo.com").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("foo.com"));
    }

    #[test]
    fn target_should_expand_localhost_with_port() {
        let url = parse_target_url(":8080/foo").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.path(), "/foo");
    }

    #[test]
    fn target_should_expand_localhost_without_port() {
        let url = parse_target_url(":/foo").unwrap();
        assert_eq!(url.as_str(), "http://localhost/foo");
    }

    #[test]
    fn target_should_reject_invalid_port() {
        assert!(parse_target_url(":notaport").is_err());
    }
}
