//! Building a [`ServerRequest`] from what a CGI-style server hands over.

use std::collections::BTreeMap;

use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::error::{MessageError, ValidationError};
use crate::upload::normalize_files;
use crate::uri::Uri;

use super::message::DEFAULT_PROTOCOL_VERSION;
use super::request::{Request, RequestMessage};
use super::server_request::{CookieParams, ServerParams, ServerRequest};

/// Everything the server collected for one request.
///
/// Every field is optional when deserializing. `query` falls back to the
/// decoded `QUERY_STRING`, `files` takes the raw upload specification
/// accepted by [`normalize_files`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub server: ServerParams,
    pub headers: BTreeMap<String, String>,
    pub cookies: CookieParams,
    pub query: Option<Map<String, Value>>,
    pub parsed_body: Option<Value>,
    pub files: Value,
}

impl ServerRequest {
    /// Builds a request from server parameters alone.
    ///
    /// The method comes from `REQUEST_METHOD`, the URI from
    /// [`Uri::from_server_params`] (scheme `http` when none is given) and the
    /// protocol version from `SERVER_PROTOCOL`.
    ///
    /// # Errors
    ///
    /// Fails when `REQUEST_METHOD` is missing or invalid, or the URI parts
    /// cannot be parsed.
    pub fn from_server_params(server: ServerParams) -> Result<Self, MessageError> {
        Self::from_environment(Environment { server, ..Environment::default() })
    }

    /// Builds a request from a full [`Environment`].
    ///
    /// ```
    /// use micro_message::protocol::Environment;
    /// use micro_message::{HttpMessage, RequestMessage, ServerRequest};
    ///
    /// let env: Environment = serde_json::from_str(r#"{
    ///     "server": { "REQUEST_METHOD": "GET", "HTTP_HOST": "example.com", "REQUEST_URI": "/a?x=1", "QUERY_STRING": "x=1" },
    ///     "headers": { "Accept": "text/html" }
    /// }"#).unwrap();
    ///
    /// let request = ServerRequest::from_environment(env).unwrap();
    /// assert_eq!(request.uri().to_string(), "http://example.com/a?x=1");
    /// assert_eq!(request.query_params()["x"], "1");
    /// assert_eq!(request.header_line("accept"), "text/html");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails when `REQUEST_METHOD` is missing or invalid, the URI parts
    /// cannot be parsed, a header is malformed or the upload specification
    /// is invalid.
    pub fn from_environment(env: Environment) -> Result<Self, MessageError> {
        let Environment { server, headers, cookies, query, parsed_body, files } = env;

        let method = server
            .get("REQUEST_METHOD")
            .filter(|method| !method.is_empty())
            .ok_or(ValidationError::MissingMethod { key: "REQUEST_METHOD" })?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| ValidationError::invalid_method(method))?;

        let mut uri = Uri::from_server_params(&server)?;
        if uri.scheme().is_empty() {
            uri = uri.with_scheme("http");
        }

        let version = server
            .get("SERVER_PROTOCOL")
            .map_or(DEFAULT_PROTOCOL_VERSION, |protocol| protocol.strip_prefix("HTTP/").unwrap_or(protocol))
            .to_string();

        trace!(%method, %uri, %version, "building server request from environment");

        let request = headers
            .iter()
            .fold(Request::builder(), |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
            .method(method)
            .uri(uri)
            .version(version)
            .build()?;

        let query = query.unwrap_or_else(|| decode_query(request.uri().query()));
        let files = normalize_files(&files)?;

        Ok(ServerRequest::from_request(request, server)
            .with_cookie_params(cookies)
            .with_query_params(query)
            .with_parsed_body(parsed_body)
            .with_uploaded_files(files))
    }
}

/// Decodes `a=1&b=2` into a map; the last of repeated keys wins.
fn decode_query(query: &str) -> Map<String, Value> {
    if query.is_empty() {
        return Map::new();
    }

    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => pairs.into_iter().map(|(key, value)| (key, Value::String(value))).collect(),
        Err(e) => {
            warn!(query, cause = %e, "ignoring undecodable query string");
            Map::new()
        }
    }
}
