//! A route table for `micro-message` server requests.
//!
//! [`RouteTable`] implements [`RouteResolver`](micro_message::protocol::RouteResolver):
//! bind it to a [`ServerRequest`](micro_message::ServerRequest) and the
//! request's attributes are resolved from the matched route on first access.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use http::Method;
//! use micro_message::ServerRequest;
//! use micro_router::filter::scheme;
//! use micro_router::{RouteEntry, RouteTable};
//! use serde_json::json;
//!
//! let table = Arc::new(
//!     RouteTable::builder()
//!         .route("/posts/{slug}", RouteEntry::new("post").default_attribute("format", "html"))
//!         .route("/admin", RouteEntry::new("admin").with(scheme("https")))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let request = ServerRequest::new(Method::GET, "http://blog.example/posts/hello".parse().unwrap()).with_router(&table);
//!
//! assert_eq!(request.attribute("slug"), Some(&json!("hello")));
//! assert_eq!(request.attribute("format"), Some(&json!("html")));
//! assert_eq!(request.attribute("_route"), Some(&json!("post")));
//! ```
//!
//! Paths are matched with `matchit` patterns (`/users/{id}`, `/files/{*path}`).
//! Entries sharing a pattern are told apart with [`filter`]s on host and scheme.

pub mod filter;
mod table;

pub use table::RouteEntry;
pub use table::RouteTable;
pub use table::RouteTableBuilder;
pub use table::ROUTE_NAME_ATTRIBUTE;
