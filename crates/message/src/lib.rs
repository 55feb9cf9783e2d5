//! Immutable HTTP message, URI and stream types.
//!
//! This crate models HTTP messages as immutable values: every `with_*`
//! method returns a derived message and leaves the receiver untouched, so
//! handler code can pass messages around freely no matter where they came
//! from (a CGI environment, a socket layer or a test harness).
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use micro_message::stream::SharedStream;
//! use micro_message::{HttpMessage, RequestMessage, ServerRequest};
//!
//! let request = ServerRequest::new(Method::POST, "https://api.example.com/v1/items?draft=1".parse().unwrap())
//!     .with_header("Content-Type", "application/json")
//!     .unwrap()
//!     .with_body(SharedStream::from_bytes(r#"{"name":"lamp"}"#));
//!
//! assert_eq!(request.header_line("host"), "api.example.com");
//! assert_eq!(request.request_target(), "/v1/items?draft=1");
//! assert_eq!(request.body().to_string(), r#"{"name":"lamp"}"#);
//! ```
//!
//! # Architecture
//!
//! - [`uri`]: parsing, normalization and reserialization of URIs
//! - [`stream`]: byte streams over memory buffers, files and readers
//! - [`protocol`]: headers, requests, server requests and responses
//! - [`upload`]: uploaded files and upload specification normalization
//!
//! # Error Handling
//!
//! - [`ParseError`]: malformed URI text or port
//! - [`ValidationError`]: input rejected before it becomes part of a message
//! - [`StreamError`]: failures of the underlying resource
//! - [`MessageError`]: any of the above, for operations that can fail in
//!   more than one way

mod error;
mod utils;

pub mod protocol;
pub mod stream;
pub mod upload;
pub mod uri;

pub use error::MessageError;
pub use error::ParseError;
pub use error::StreamError;
pub use error::ValidationError;

pub use protocol::HttpMessage;
pub use protocol::Request;
pub use protocol::RequestMessage;
pub use protocol::Response;
pub use protocol::ServerRequest;
pub use upload::UploadedFile;
pub use uri::Uri;

pub(crate) use utils::ensure;
