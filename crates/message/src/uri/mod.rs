//! URI value type.
//!
//! [`Uri`] splits a reference into scheme, user-info, host, port, path, query
//! and fragment, normalizes every component on the way in, and reserializes
//! them into a syntactically valid reference:
//!
//! - scheme and host are lowercased
//! - the port is dropped when it equals the well-known port of the scheme
//! - path, query and fragment are percent-encoded, leaving valid `%XX`
//!   triplets untouched so encoding can be applied any number of times
//!
//! ```
//! use micro_message::uri::Uri;
//!
//! let uri: Uri = "HTTPS://Example.COM:443/a b?q=1#top".parse().unwrap();
//! assert_eq!(uri.host(), "example.com");
//! assert_eq!(uri.port(), None);
//! assert_eq!(uri.to_string(), "https://example.com/a%20b?q=1#top");
//! ```

mod encode;
mod server;
#[allow(clippy::module_inception, reason = "the type and its module share a name")]
mod uri;

pub use encode::encode_path;
pub use encode::encode_query_or_fragment;
pub use uri::Uri;
pub use uri::default_port;
