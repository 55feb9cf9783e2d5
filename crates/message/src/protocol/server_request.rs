//! Server side request: a [`Request`] plus the parameters, body, uploads and
//! attributes the server collected for it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use http::Method;
use serde_json::{Map, Value};
use tracing::debug;

use crate::upload::UploadedFiles;
use crate::uri::Uri;

use super::message::{HttpMessage, MessageCore};
use super::request::{Request, RequestMessage};
use super::route::RouteResolver;

/// CGI-style server parameters, e.g. `REQUEST_METHOD` or `SERVER_PORT`.
pub type ServerParams = BTreeMap<String, String>;

/// Cookies sent by the client, by name.
pub type CookieParams = BTreeMap<String, String>;

type RouterRef = Weak<dyn RouteResolver + Send + Sync>;

/// An immutable request as seen by the server.
///
/// Attributes are request scoped values. When a router is bound with
/// [`with_router`](ServerRequest::with_router), the first call to
/// [`attributes`](ServerRequest::attributes) resolves the route for the
/// current URI and merges its attributes under the ones set explicitly.
/// Requests derived through a `with_*` method resolve again on their own
/// first access.
///
/// ```
/// use http::Method;
/// use micro_message::{RequestMessage, ServerRequest};
///
/// let request = ServerRequest::new(Method::POST, "/users".parse().unwrap())
///     .with_attribute("user", 42)
///     .with_parsed_body(Some(serde_json::json!({ "name": "ann" })));
///
/// assert_eq!(request.attribute("user"), Some(&serde_json::json!(42)));
/// assert_eq!(request.method(), &Method::POST);
/// ```
#[derive(Clone)]
pub struct ServerRequest {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    request: Request,
    server_params: Arc<ServerParams>,
    cookie_params: CookieParams,
    query_params: Map<String, Value>,
    parsed_body: Option<Value>,
    uploaded_files: UploadedFiles,
    attributes: Map<String, Value>,
    // names removed through `without_attribute`, kept out of route attributes
    hidden: BTreeSet<String>,
    router: Option<RouterRef>,
    resolved: OnceLock<Map<String, Value>>,
}

impl Clone for ServerInner {
    /// The resolved attributes are not carried over.
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            server_params: Arc::clone(&self.server_params),
            cookie_params: self.cookie_params.clone(),
            query_params: self.query_params.clone(),
            parsed_body: self.parsed_body.clone(),
            uploaded_files: self.uploaded_files.clone(),
            attributes: self.attributes.clone(),
            hidden: self.hidden.clone(),
            router: self.router.clone(),
            resolved: OnceLock::new(),
        }
    }
}

impl ServerInner {
    fn resolve_attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();

        if let Some(router) = &self.router {
            let uri = self.request.uri();
            match router.upgrade() {
                Some(router) => match router.resolve_route(uri.path(), uri.host(), uri.scheme()) {
                    Some(route) => {
                        debug!(path = uri.path(), host = uri.host(), "route resolved");
                        attributes.extend(route.into_attributes().into_iter().filter(|(name, _)| !self.hidden.contains(name)));
                    }
                    None => debug!(path = uri.path(), host = uri.host(), "no route matched"),
                },
                None => debug!(path = uri.path(), "router dropped before attributes were resolved"),
            }
        }

        attributes.extend(self.attributes.iter().map(|(name, value)| (name.clone(), value.clone())));
        attributes
    }
}

impl ServerRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self::from_request(Request::new(method, uri), ServerParams::new())
    }

    pub fn from_request(request: Request, server_params: ServerParams) -> Self {
        let inner = ServerInner {
            request,
            server_params: Arc::new(server_params),
            cookie_params: CookieParams::new(),
            query_params: Map::new(),
            parsed_body: None,
            uploaded_files: UploadedFiles::new(),
            attributes: Map::new(),
            hidden: BTreeSet::new(),
            router: None,
            resolved: OnceLock::new(),
        };

        Self { inner: Arc::new(inner) }
    }

    /// Returns `true` if both values are the same instance.
    pub fn ptr_eq(&self, other: &ServerRequest) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.inner.server_params
    }

    pub fn cookie_params(&self) -> &CookieParams {
        &self.inner.cookie_params
    }

    #[must_use]
    pub fn with_cookie_params(&self, cookies: CookieParams) -> Self {
        if self.inner.cookie_params == cookies {
            return self.clone();
        }

        self.derive(|inner| inner.cookie_params = cookies)
    }

    pub fn query_params(&self) -> &Map<String, Value> {
        &self.inner.query_params
    }

    #[must_use]
    pub fn with_query_params(&self, query: Map<String, Value>) -> Self {
        if self.inner.query_params == query {
            return self.clone();
        }

        self.derive(|inner| inner.query_params = query)
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.inner.parsed_body.as_ref()
    }

    #[must_use]
    pub fn with_parsed_body(&self, body: Option<Value>) -> Self {
        if self.inner.parsed_body == body {
            return self.clone();
        }

        self.derive(|inner| inner.parsed_body = body)
    }

    pub fn uploaded_files(&self) -> &UploadedFiles {
        &self.inner.uploaded_files
    }

    #[must_use]
    pub fn with_uploaded_files(&self, files: UploadedFiles) -> Self {
        self.derive(|inner| inner.uploaded_files = files)
    }

    /// Binds a router used to resolve attributes on first access.
    ///
    /// Only a weak reference is kept; once the router is dropped no route
    /// attributes are resolved.
    #[must_use]
    pub fn with_router<R>(&self, router: &Arc<R>) -> Self
    where
        R: RouteResolver + Send + Sync + 'static,
    {
        let router = Arc::downgrade(router) as RouterRef;
        self.derive(|inner| inner.router = Some(router))
    }

    /// Returns every attribute, resolving the route once per instance.
    pub fn attributes(&self) -> &Map<String, Value> {
        self.inner.resolved.get_or_init(|| self.inner.resolve_attributes())
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes().get(name)
    }

    #[must_use]
    pub fn with_attribute(&self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.derive(|inner| {
            inner.hidden.remove(name);
            inner.attributes.insert(name.to_string(), value);
        })
    }

    /// Removes an attribute, including one supplied by the router.
    #[must_use]
    pub fn without_attribute(&self, name: &str) -> Self {
        if !self.attributes().contains_key(name) {
            return self.clone();
        }

        self.derive(|inner| {
            inner.attributes.remove(name);
            inner.hidden.insert(name.to_string());
        })
    }

    fn derive(&self, f: impl FnOnce(&mut ServerInner)) -> Self {
        let mut inner = ServerInner::clone(&self.inner);
        f(&mut inner);
        Self { inner: Arc::new(inner) }
    }
}

impl HttpMessage for ServerRequest {
    fn core(&self) -> &MessageCore {
        self.inner.request.core()
    }

    fn with_core(&self, core: MessageCore) -> Self {
        let request = self.inner.request.with_core(core);
        self.with_request(request)
    }
}

impl RequestMessage for ServerRequest {
    fn request(&self) -> &Request {
        &self.inner.request
    }

    fn with_request(&self, request: Request) -> Self {
        self.derive(|inner| inner.request = request)
    }
}

impl fmt::Debug for ServerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = &self.inner;
        f.debug_struct("ServerRequest")
            .field("request", &inner.request)
            .field("server_params", &inner.server_params)
            .field("cookie_params", &inner.cookie_params)
            .field("query_params", &inner.query_params)
            .field("parsed_body", &inner.parsed_body)
            .field("uploaded_files", &inner.uploaded_files)
            .field("attributes", &inner.attributes)
            .field("has_router", &inner.router.is_some())
            .finish_non_exhaustive()
    }
}
