//! Immutable HTTP messages.
//!
//! Every message embeds a [`MessageCore`] (protocol version, headers, body)
//! and exposes it through the [`HttpMessage`] trait. Requests add method, URI
//! and request target through [`RequestMessage`].
//!
//! # Architecture
//!
//! - **Headers** ([`Headers`]): ordered, case-insensitive, original casing kept
//! - **Messages**:
//!   - [`Request`]: client side request, `Host` derived from the URI
//!   - [`ServerRequest`]: request plus server parameters, cookies, query,
//!     parsed body, uploaded files and attributes
//!   - [`Response`]: status code and reason phrase
//! - **Routing** ([`RouteResolver`]): the capability a server request resolves
//!   its attributes through
//! - **Environment** ([`Environment`]): building a server request from
//!   CGI-style server parameters
//!
//! All `with_*` methods are copy-on-write. A call that changes nothing hands
//! back the same instance, which `ptr_eq` observes.
//!
//! ```
//! use http::Method;
//! use micro_message::{HttpMessage, Request};
//!
//! let request = Request::new(Method::GET, "http://example.com/".parse().unwrap());
//! let json = request.with_header("Accept", "application/json").unwrap();
//!
//! assert!(!request.has_header("accept"));
//! assert_eq!(json.header("ACCEPT"), ["application/json"]);
//! assert!(json.without_header("X-Missing").ptr_eq(&json));
//! ```

mod headers;
pub use headers::Headers;
pub use headers::IntoHeaderValues;

mod message;
pub use message::HttpMessage;
pub use message::MessageCore;
pub use message::DEFAULT_PROTOCOL_VERSION;

mod request;
pub use request::Request;
pub use request::RequestBuilder;
pub use request::RequestMessage;

mod response;
pub use response::Response;
pub use response::ResponseBuilder;

mod route;
pub use route::ResolvedRoute;
pub use route::RouteResolver;

mod server_request;
pub use server_request::CookieParams;
pub use server_request::ServerParams;
pub use server_request::ServerRequest;

mod environment;
pub use environment::Environment;
