//! Response: a message plus status code and reason phrase.

use std::sync::Arc;

use http::StatusCode;

use crate::error::ValidationError;
use crate::stream::SharedStream;

use super::headers::{Headers, IntoHeaderValues};
use super::message::{HttpMessage, MessageCore, DEFAULT_PROTOCOL_VERSION};

/// An immutable HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    inner: Arc<ResponseInner>,
}

#[derive(Debug, Clone)]
struct ResponseInner {
    core: MessageCore,
    status: StatusCode,
    reason: String,
}

impl Response {
    /// A response with `status`, its canonical reason phrase and no headers.
    pub fn new(status: StatusCode) -> Self {
        Self::from_core(MessageCore::default(), status, None)
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    pub fn ptr_eq(&self, other: &Response) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status
    }

    pub fn reason_phrase(&self) -> &str {
        &self.inner.reason
    }

    /// Returns a response with a new status. Without a `reason`, the canonical
    /// reason phrase of the code is used (empty for unregistered codes).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStatus`] for codes outside `100..=999`.
    pub fn with_status(&self, code: u16, reason: Option<&str>) -> Result<Self, ValidationError> {
        let status = StatusCode::from_u16(code).map_err(|_| ValidationError::InvalidStatus { code })?;
        let reason = reason_phrase(status, reason);

        if status == self.inner.status && reason == self.inner.reason {
            return Ok(self.clone());
        }

        Ok(self.derive(|inner| {
            inner.status = status;
            inner.reason = reason;
        }))
    }

    fn from_core(core: MessageCore, status: StatusCode, reason: Option<&str>) -> Self {
        let reason = reason_phrase(status, reason);
        Self { inner: Arc::new(ResponseInner { core, status, reason }) }
    }

    fn derive(&self, f: impl FnOnce(&mut ResponseInner)) -> Self {
        let mut inner = ResponseInner::clone(&self.inner);
        f(&mut inner);
        Self { inner: Arc::new(inner) }
    }
}

fn reason_phrase(status: StatusCode, reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => reason.to_string(),
        _ => status.canonical_reason().unwrap_or_default().to_string(),
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl HttpMessage for Response {
    fn core(&self) -> &MessageCore {
        &self.inner.core
    }

    fn with_core(&self, core: MessageCore) -> Self {
        self.derive(|inner| inner.core = core)
    }
}

/// Builds a [`Response`] from all of its parts at once.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: u16,
    reason: Option<String>,
    headers: Vec<(String, Vec<String>)>,
    body: Option<SharedStream>,
    version: String,
}

impl ResponseBuilder {
    fn new() -> Self {
        Self { status: 200, reason: None, headers: Vec::new(), body: None, version: DEFAULT_PROTOCOL_VERSION.to_string() }
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

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
    /// Fails on an invalid status code or a syntactically invalid header.
    pub fn build(self) -> Result<Response, ValidationError> {
        let status = StatusCode::from_u16(self.status).map_err(|_| ValidationError::InvalidStatus { code: self.status })?;
        let headers = Headers::from_pairs(self.headers)?;
        let core = MessageCore::new(headers, self.body, self.version);
        Ok(Response::from_core(core, status, self.reason.as_deref()))
    }
}
