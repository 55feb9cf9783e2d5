//! Client side request: a message plus method, URI and request target.

use std::sync::Arc;

use http::Method;

use crate::error::ValidationError;
use crate::stream::SharedStream;
use crate::uri::Uri;

use super::headers::{Headers, IntoHeaderValues};
use super::message::{HttpMessage, MessageCore, DEFAULT_PROTOCOL_VERSION};

/// An immutable HTTP request.
///
/// Cloning is cheap and yields the same instance, see [`Request::ptr_eq`].
///
/// Unless a `Host` header is given explicitly, one is derived from the URI
/// host (and port) and kept as the first header.
///
/// ```
/// use http::Method;
/// use micro_message::{HttpMessage, Request, RequestMessage};
///
/// let request = Request::new(Method::GET, "http://example.com:8080/p?q=1".parse().unwrap());
/// assert_eq!(request.header_line("host"), "example.com:8080");
/// assert_eq!(request.request_target(), "/p?q=1");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    inner: Arc<RequestInner>,
}

#[derive(Debug, Clone)]
struct RequestInner {
    core: MessageCore,
    method: Method,
    uri: Uri,
    target: Option<String>,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self::from_core(MessageCore::default(), method, uri)
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Returns `true` if both values are the same instance.
    pub fn ptr_eq(&self, other: &Request) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn from_core(core: MessageCore, method: Method, uri: Uri) -> Self {
        let mut inner = RequestInner { core, method, uri, target: None };
        if !inner.core.headers().contains("Host") {
            inner.update_host_from_uri();
        }

        Self { inner: Arc::new(inner) }
    }

    /// Copies every field, lets `f` change some, and wraps the copy as a new instance.
    fn derive(&self, f: impl FnOnce(&mut RequestInner)) -> Self {
        let mut inner = RequestInner::clone(&self.inner);
        f(&mut inner);
        Self { inner: Arc::new(inner) }
    }
}

impl RequestInner {
    fn update_host_from_uri(&mut self) {
        let host = self.uri.host();
        if host.is_empty() {
            return;
        }

        let host = match self.uri.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        // Host goes first, see rfc7230 section 5.4
        self.core.headers_mut().set_first("Host", vec![host]);
    }
}

impl HttpMessage for Request {
    fn core(&self) -> &MessageCore {
        &self.inner.core
    }

    fn with_core(&self, core: MessageCore) -> Self {
        self.derive(|inner| inner.core = core)
    }
}

/// Request operations shared by [`Request`] and
/// [`ServerRequest`](super::ServerRequest).
pub trait RequestMessage: HttpMessage {
    fn request(&self) -> &Request;

    /// Derives a message from this one with `request` swapped in.
    #[must_use]
    fn with_request(&self, request: Request) -> Self;

    fn method(&self) -> &Method {
        &self.request().inner.method
    }

    fn uri(&self) -> &Uri {
        &self.request().inner.uri
    }

    /// Returns the request target: the explicit override, or the URI path
    /// (`/` when empty) followed by `?query` when there is a query.
    fn request_target(&self) -> String {
        let inner = &self.request().inner;
        if let Some(target) = &inner.target {
            return target.clone();
        }

        let mut target = match inner.uri.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };

        if !inner.uri.query().is_empty() {
            target.push('?');
            target.push_str(inner.uri.query());
        }

        target
    }

    /// Overrides the request target, e.g. `*` or an absolute form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRequestTarget`] if `target` contains whitespace.
    fn with_request_target(&self, target: &str) -> Result<Self, ValidationError> {
        if target.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidRequestTarget { target: target.to_string() });
        }

        if self.request().inner.target.as_deref() == Some(target) {
            return Ok(self.clone());
        }

        let request = self.request().derive(|inner| inner.target = Some(target.to_string()));
        Ok(self.with_request(request))
    }

    #[must_use]
    fn with_method(&self, method: Method) -> Self {
        if self.request().inner.method == method {
            return self.clone();
        }

        let request = self.request().derive(|inner| inner.method = method);
        self.with_request(request)
    }

    /// Replaces the URI.
    ///
    /// The `Host` header is recomputed from the new URI unless `preserve_host`
    /// is set and a `Host` header already exists.
    #[must_use]
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        if self.request().inner.uri == uri {
            return self.clone();
        }

        let recompute_host = !preserve_host || !self.has_header("Host");
        let request = self.request().derive(|inner| {
            inner.uri = uri;
            if recompute_host {
                inner.update_host_from_uri();
            }
        });

        self.with_request(request)
    }
}

impl RequestMessage for Request {
    fn request(&self) -> &Request {
        self
    }

    fn with_request(&self, request: Request) -> Self {
        request
    }
}

/// Builds a [`Request`] from all of its parts at once.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: Uri,
    headers: Vec<(String, Vec<String>)>,
    body: Option<SharedStream>,
    version: String,
}

impl RequestBuilder {
    fn new() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::default(),
            headers: Vec::new(),
            body: None,
            version: DEFAULT_PROTOCOL_VERSION.to_string(),
        }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Adds values for `name`; repeated names merge case-insensitively.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl IntoHeaderValues) -> Self {
        self.headers.push((name.into(), value.into_header_values()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: SharedStream) -> Self {
        self.body = Some(body);
        self
    }

    /// Uses `data` as the body. An empty payload leaves the body unset.
    #[must_use]
    pub fn body_bytes(mut self, data: impl AsRef<[u8]>) -> Self {
        let data = data.as_ref();
        self.body = if data.is_empty() { None } else { Some(SharedStream::from_bytes(data)) };
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// # Errors
    ///
    /// Fails on a syntactically invalid header.
    pub fn build(self) -> Result<Request, ValidationError> {
        let headers = Headers::from_pairs(self.headers)?;
        let core = MessageCore::new(headers, self.body, self.version);
        Ok(Request::from_core(core, self.method, self.uri))
    }
}
