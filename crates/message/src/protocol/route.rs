//! The routing capability a [`ServerRequest`](super::ServerRequest) resolves
//! its attributes through.

use serde_json::{Map, Value};

/// Attributes produced by a successful route resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRoute {
    attributes: Map<String, Value>,
}

impl ResolvedRoute {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }
}

/// Resolves a route for the path, host and scheme of a request URI.
///
/// Returns `None` when nothing matches.
#[cfg_attr(test, mockall::automock)]
pub trait RouteResolver {
    fn resolve_route(&self, path: &str, host: &str, scheme: &str) -> Option<ResolvedRoute>;
}
