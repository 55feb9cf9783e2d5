//! Building a [`Uri`] from CGI-style server parameters.

use tracing::trace;

use crate::error::ParseError;
use crate::protocol::ServerParams;

use super::Uri;

impl Uri {
    /// Builds a URI from server parameters such as `REQUEST_SCHEME`, `HTTPS`,
    /// `HTTP_HOST`, `SERVER_NAME`, `SERVER_PORT`, `REQUEST_URI` and `QUERY_STRING`.
    ///
    /// Missing keys leave the matching component empty. A port carried by
    /// `HTTP_HOST` is used only when `SERVER_PORT` is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPort`] when the port is not a number in `1..=65535`.
    pub fn from_server_params(server: &ServerParams) -> Result<Self, ParseError> {
        let mut uri = Uri::default();

        if let Some(scheme) = server.get("REQUEST_SCHEME") {
            uri = uri.with_scheme(scheme);
        } else if let Some(https) = server.get("HTTPS") {
            uri = uri.with_scheme(if https == "on" { "https" } else { "http" });
        }

        let mut host_port = None;
        if let Some(host) = server.get("HTTP_HOST") {
            let (host, port) = split_host_header(host);
            uri = uri.with_host(host);
            host_port = port;
        } else if let Some(host) = server.get("SERVER_NAME") {
            uri = uri.with_host(host);
        }

        if let Some(port) = server.get("SERVER_PORT").map(String::as_str).or(host_port) {
            let port = port.trim().parse::<u16>().map_err(|_| ParseError::invalid_port(port))?;
            uri = uri.with_port(Some(port))?;
        }

        if let Some(request_uri) = server.get("REQUEST_URI") {
            let path = request_uri.split_once('?').map_or(request_uri.as_str(), |(path, _)| path);
            uri = uri.with_path(path);
        }

        if let Some(query) = server.get("QUERY_STRING") {
            uri = uri.with_query(query);
        }

        trace!(uri = %uri, "built uri from server params");
        Ok(uri)
    }
}

/// Splits a `Host` header value into host and optional port, keeping IPv6 brackets.
fn split_host_header(value: &str) -> (&str, Option<&str>) {
    let value = value.trim();
    let split_at = if value.starts_with('[') {
        value.find("]:").map(|i| i + 1)
    } else {
        value.rfind(':')
    };

    match split_at {
        Some(i) => (&value[..i], Some(&value[i + 1..])),
        None => (value, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ServerParams {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_full_server_params() {
        let server = params(&[
            ("REQUEST_SCHEME", "https"),
            ("HTTP_HOST", "Example.com"),
            ("SERVER_PORT", "8443"),
            ("REQUEST_URI", "/search?q=rust"),
            ("QUERY_STRING", "q=rust"),
        ]);

        let uri = Uri::from_server_params(&server).unwrap();
        assert_eq!(uri.to_string(), "https://example.com:8443/search?q=rust");
    }

    #[test]
    fn test_https_flag_and_server_name() {
        let server = params(&[("HTTPS", "on"), ("SERVER_NAME", "localhost"), ("SERVER_PORT", "443")]);
        let uri = Uri::from_server_params(&server).unwrap();
        assert_eq!(uri.to_string(), "https://localhost");

        let server = params(&[("HTTPS", "off"), ("SERVER_NAME", "localhost")]);
        assert_eq!(Uri::from_server_params(&server).unwrap().scheme(), "http");
    }

    #[test]
    fn test_port_from_host_header() {
        let server = params(&[("REQUEST_SCHEME", "http"), ("HTTP_HOST", "127.0.0.1:8080"), ("REQUEST_URI", "/")]);
        let uri = Uri::from_server_params(&server).unwrap();
        assert_eq!(uri.host(), "127.0.0.1");
        assert_eq!(uri.port(), Some(8080));

        let server = params(&[("HTTP_HOST", "[::1]:9000")]);
        let uri = Uri::from_server_params(&server).unwrap();
        assert_eq!(uri.host(), "[::1]");
        assert_eq!(uri.port(), Some(9000));
    }

    #[test]
    fn test_bad_port() {
        let server = params(&[("SERVER_NAME", "localhost"), ("SERVER_PORT", "http")]);
        assert_eq!(Uri::from_server_params(&server), Err(ParseError::invalid_port("http")));
    }

    #[test]
    fn test_empty_params() {
        assert_eq!(Uri::from_server_params(&ServerParams::new()).unwrap(), Uri::default());
    }
}
