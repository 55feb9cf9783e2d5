use std::collections::BTreeMap;
use std::fmt;

use matchit::InsertError;
use micro_message::protocol::{ResolvedRoute, RouteResolver};
use serde_json::{Map, Value};
use tracing::debug;

use crate::filter::{all_filter, AllFilter, RouteFilter, RouteTarget};

/// Attribute holding the name of the matched entry.
pub const ROUTE_NAME_ATTRIBUTE: &str = "_route";

type InnerRouter<T> = matchit::Router<T>;

/// Path patterns mapped to named entries.
///
/// Several entries may share a pattern; the first one (in registration order)
/// whose filters accept the host and scheme wins.
pub struct RouteTable {
    inner_router: InnerRouter<Vec<RouteEntry>>,
}

/// A named route with default attributes and filters.
#[derive(Debug)]
pub struct RouteEntry {
    name: String,
    defaults: Map<String, Value>,
    filters: AllFilter,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Finds the entry for `target`, with the path parameters it captured.
    pub fn at<'t>(&'t self, target: &RouteTarget<'_>) -> Option<(&'t RouteEntry, Vec<(String, String)>)> {
        let path = match target.path() {
            "" => "/",
            path => path,
        };

        let matched = match self.inner_router.at(path) {
            Ok(matched) => matched,
            Err(e) => {
                debug!(path, cause = %e, "no route pattern matched");
                return None;
            }
        };

        let Some(entry) = matched.value.iter().find(|entry| entry.filters.matches(target)) else {
            debug!(path, host = target.host(), scheme = target.scheme(), "route filters rejected target");
            return None;
        };

        let params = matched.params.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect();
        Some((entry, params))
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable").finish_non_exhaustive()
    }
}

impl RouteResolver for RouteTable {
    fn resolve_route(&self, path: &str, host: &str, scheme: &str) -> Option<ResolvedRoute> {
        let (entry, params) = self.at(&RouteTarget::new(path, host, scheme))?;

        let mut attributes = entry.defaults.clone();
        attributes.extend(params.into_iter().map(|(name, value)| (name, Value::String(value))));
        attributes.insert(ROUTE_NAME_ATTRIBUTE.to_string(), Value::String(entry.name.clone()));

        debug!(path, route = %entry.name, "route resolved");
        Some(ResolvedRoute::new(attributes))
    }
}

impl RouteEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), defaults: Map::new(), filters: all_filter() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Adds a default attribute. Path parameters of the same name take precedence.
    #[must_use]
    pub fn default_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with<F: RouteFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.and(filter);
        self
    }
}

#[derive(Debug)]
pub struct RouteTableBuilder {
    data: BTreeMap<String, Vec<RouteEntry>>,
}

impl RouteTableBuilder {
    fn new() -> Self {
        Self { data: BTreeMap::new() }
    }

    /// Registers `entry` under a `matchit` pattern such as `/users/{id}` or `/files/{*path}`.
    #[must_use]
    pub fn route(mut self, pattern: impl Into<String>, entry: RouteEntry) -> Self {
        self.data.entry(pattern.into()).or_default().push(entry);
        self
    }

    /// # Errors
    ///
    /// Returns the [`InsertError`] of the first pattern that is malformed or
    /// conflicts with another one.
    pub fn build(self) -> Result<RouteTable, InsertError> {
        let mut inner_router = InnerRouter::new();

        for (pattern, entries) in self.data {
            inner_router.insert(pattern, entries)?;
        }

        Ok(RouteTable { inner_router })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::filter::{host, scheme};

    fn table() -> RouteTable {
        RouteTable::builder()
            .route("/", RouteEntry::new("home"))
            .route(
                "/users/{id}",
                RouteEntry::new("admin_user").with(host("admin.example.com")).default_attribute("role", "admin"),
            )
            .route("/users/{id}", RouteEntry::new("user").default_attribute("id", "0").default_attribute("page", 1))
            .route("/secure", RouteEntry::new("secure").with(scheme("https")))
            .route("/files/{*path}", RouteEntry::new("file"))
            .build()
            .unwrap()
    }

    fn attributes(route: Option<ResolvedRoute>) -> Value {
        Value::Object(route.unwrap().into_attributes())
    }

    #[test]
    fn test_params_and_defaults() {
        let table = table();
        let route = table.resolve_route("/users/42", "www.example.com", "http");
        assert_eq!(attributes(route), json!({ "id": "42", "page": 1, "_route": "user" }));
    }

    #[test]
    fn test_first_accepting_entry_wins() {
        let table = table();
        let route = table.resolve_route("/users/7", "admin.example.com", "http");
        assert_eq!(attributes(route), json!({ "role": "admin", "id": "7", "_route": "admin_user" }));
    }

    #[test]
    fn test_empty_path_is_root() {
        let table = table();
        assert_eq!(attributes(table.resolve_route("", "x", "http")), json!({ "_route": "home" }));
    }

    #[test]
    fn test_catch_all() {
        let table = table();
        let route = table.resolve_route("/files/a/b.txt", "x", "http");
        assert_eq!(attributes(route)["path"], "a/b.txt");
    }

    #[test]
    fn test_misses() {
        let table = table();
        assert!(table.resolve_route("/nowhere", "x", "http").is_none());
        assert!(table.resolve_route("/secure", "x", "http").is_none());
        assert!(table.resolve_route("/secure", "x", "https").is_some());
    }

    #[test]
    fn test_conflicting_patterns() {
        let result = RouteTable::builder()
            .route("/a/{id}", RouteEntry::new("one"))
            .route("/a/{name}", RouteEntry::new("two"))
            .build();
        assert!(result.is_err());
    }
}
