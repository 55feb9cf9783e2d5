//! The state and the copy-on-write operations every message shares.

use std::sync::OnceLock;

use crate::error::ValidationError;
use crate::stream::SharedStream;

use super::headers::{normalize, Headers, IntoHeaderValues};

/// Protocol version of messages built without an explicit one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.1";

/// Protocol version, headers and body of a message.
///
/// Request, server request and response embed one by value and expose its
/// operations through [`HttpMessage`].
#[derive(Debug, Clone)]
pub struct MessageCore {
    version: String,
    headers: Headers,
    body: OnceLock<SharedStream>,
}

impl MessageCore {
    pub fn new(headers: Headers, body: Option<SharedStream>, version: impl Into<String>) -> Self {
        let body = body.map_or_else(OnceLock::new, OnceLock::from);
        Self { version: version.into(), headers, body }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body, creating an empty stream the first time none is set.
    pub fn body(&self) -> SharedStream {
        self.body.get_or_init(SharedStream::empty).clone()
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    fn has_body(&self, body: &SharedStream) -> bool {
        self.body.get().is_some_and(|current| current.ptr_eq(body))
    }
}

impl Default for MessageCore {
    fn default() -> Self {
        Self::new(Headers::new(), None, DEFAULT_PROTOCOL_VERSION)
    }
}

/// Operations shared by every message.
///
/// Messages are immutable: each `with_*` method returns a derived message and
/// leaves the receiver untouched. When the requested change is already in
/// place the receiver itself is returned, so `ptr_eq` still holds.
pub trait HttpMessage: Clone {
    fn core(&self) -> &MessageCore;

    /// Derives a message from this one with `core` swapped in.
    #[must_use]
    fn with_core(&self, core: MessageCore) -> Self;

    fn protocol_version(&self) -> &str {
        self.core().version()
    }

    fn headers(&self) -> &Headers {
        self.core().headers()
    }

    fn has_header(&self, name: &str) -> bool {
        self.core().headers().contains(name)
    }

    /// Returns the values of `name`, matched case-insensitively.
    fn header(&self, name: &str) -> &[String] {
        self.core().headers().get(name)
    }

    /// Returns the values of `name` joined with `", "`.
    fn header_line(&self, name: &str) -> String {
        self.core().headers().line(name)
    }

    fn body(&self) -> SharedStream {
        self.core().body()
    }

    #[must_use]
    fn with_protocol_version(&self, version: &str) -> Self {
        if self.core().version() == version {
            return self.clone();
        }

        let mut core = self.core().clone();
        core.version = version.to_string();
        self.with_core(core)
    }

    /// Replaces every value of `name`.
    ///
    /// # Errors
    ///
    /// Fails on a syntactically invalid name or value.
    fn with_header(&self, name: &str, value: impl IntoHeaderValues) -> Result<Self, ValidationError> {
        let values = normalize(name, value)?;

        let mut core = self.core().clone();
        core.headers.set(name, values);
        Ok(self.with_core(core))
    }

    /// Appends values to `name`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Fails on a syntactically invalid name or value.
    fn with_added_header(&self, name: &str, value: impl IntoHeaderValues) -> Result<Self, ValidationError> {
        let values = normalize(name, value)?;

        let mut core = self.core().clone();
        core.headers.append(name, values);
        Ok(self.with_core(core))
    }

    #[must_use]
    fn without_header(&self, name: &str) -> Self {
        if !self.has_header(name) {
            return self.clone();
        }

        let mut core = self.core().clone();
        core.headers.remove(name);
        self.with_core(core)
    }

    #[must_use]
    fn with_body(&self, body: SharedStream) -> Self {
        if self.core().has_body(&body) {
            return self.clone();
        }

        let mut core = self.core().clone();
        core.body = OnceLock::from(body);
        self.with_core(core)
    }
}
