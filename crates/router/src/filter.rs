//! Composable filters choosing between entries registered for the same path.
//!
//! A filter sees the [`RouteTarget`] being resolved: path, host and scheme.
//!
//! ```
//! use micro_router::filter::{all_filter, any_filter, host, scheme, RouteFilter, RouteTarget};
//!
//! let mut secure_api = all_filter();
//! secure_api.and(scheme("https"));
//! secure_api.and({
//!     let mut hosts = any_filter();
//!     hosts.or(host("api.example.com")).or(host("*.api.example.com"));
//!     hosts
//! });
//!
//! assert!(secure_api.matches(&RouteTarget::new("/", "eu.api.example.com", "https")));
//! assert!(!secure_api.matches(&RouteTarget::new("/", "api.example.com", "http")));
//! ```

use std::fmt;

/// What a route is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTarget<'a> {
    path: &'a str,
    host: &'a str,
    scheme: &'a str,
}

impl<'a> RouteTarget<'a> {
    pub fn new(path: &'a str, host: &'a str, scheme: &'a str) -> Self {
        Self { path, host, scheme }
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn host(&self) -> &'a str {
        self.host
    }

    pub fn scheme(&self) -> &'a str {
        self.scheme
    }
}

/// Decides whether a route entry applies to a target.
pub trait RouteFilter: Send + Sync {
    fn matches(&self, target: &RouteTarget<'_>) -> bool;
}

struct FnFilter<F: Fn(&RouteTarget<'_>) -> bool>(F);

impl<F: Fn(&RouteTarget<'_>) -> bool + Send + Sync> RouteFilter for FnFilter<F> {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        (self.0)(target)
    }
}

/// Creates a filter from a closure.
pub fn fn_filter<F>(f: F) -> impl RouteFilter
where
    F: Fn(&RouteTarget<'_>) -> bool + Send + Sync,
{
    FnFilter(f)
}

pub fn any_filter() -> AnyFilter {
    AnyFilter::new()
}

/// Compose filters with *OR* logic. An empty chain matches everything.
#[derive(Default)]
pub struct AnyFilter {
    filters: Vec<Box<dyn RouteFilter>>,
}

impl AnyFilter {
    fn new() -> Self {
        Self { filters: vec![] }
    }

    pub fn or<F: RouteFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl fmt::Debug for AnyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyFilter").field("filters", &self.filters.len()).finish()
    }
}

impl RouteFilter for AnyFilter {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|filter| filter.matches(target))
    }
}

pub fn all_filter() -> AllFilter {
    AllFilter::new()
}

/// Compose filters with *AND* logic. An empty chain matches everything.
#[derive(Default)]
pub struct AllFilter {
    filters: Vec<Box<dyn RouteFilter>>,
}

impl AllFilter {
    fn new() -> Self {
        Self { filters: vec![] }
    }

    pub fn and<F: RouteFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for AllFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllFilter").field("filters", &self.filters.len()).finish()
    }
}

impl RouteFilter for AllFilter {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        self.filters.iter().all(|filter| filter.matches(target))
    }
}

/// Matches the host case-insensitively.
///
/// A leading `*.` matches any subdomain, but not the bare domain.
#[inline]
pub fn host(host: impl Into<String>) -> HostFilter {
    HostFilter(host.into().to_ascii_lowercase())
}

#[derive(Debug, Clone)]
pub struct HostFilter(String);

impl RouteFilter for HostFilter {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        let host = target.host().to_ascii_lowercase();
        match self.0.strip_prefix("*.") {
            Some(domain) => host.strip_suffix(domain).is_some_and(|sub| sub.len() > 1 && sub.ends_with('.')),
            None => host == self.0,
        }
    }
}

/// Matches the scheme case-insensitively.
#[inline]
pub fn scheme(scheme: impl Into<String>) -> SchemeFilter {
    SchemeFilter(scheme.into().to_ascii_lowercase())
}

#[derive(Debug, Clone)]
pub struct SchemeFilter(String);

impl RouteFilter for SchemeFilter {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        target.scheme().eq_ignore_ascii_case(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(host: &'static str, scheme: &'static str) -> RouteTarget<'static> {
        RouteTarget::new("/", host, scheme)
    }

    #[test]
    fn test_host_filter() {
        let exact = host("Example.com");
        assert!(exact.matches(&target("example.COM", "http")));
        assert!(!exact.matches(&target("www.example.com", "http")));

        let wildcard = host("*.example.com");
        assert!(wildcard.matches(&target("www.example.com", "http")));
        assert!(wildcard.matches(&target("a.b.example.com", "http")));
        assert!(!wildcard.matches(&target("example.com", "http")));
        assert!(!wildcard.matches(&target("badexample.com", "http")));
    }

    #[test]
    fn test_scheme_filter() {
        assert!(scheme("HTTPS").matches(&target("x", "https")));
        assert!(!scheme("https").matches(&target("x", "http")));
    }

    #[test]
    fn test_composed_filters() {
        let mut any = any_filter();
        any.or(host("a.com")).or(host("b.com"));
        assert!(any.matches(&target("b.com", "http")));
        assert!(!any.matches(&target("c.com", "http")));

        let mut all = all_filter();
        all.and(any).and(scheme("https"));
        assert!(all.matches(&target("a.com", "https")));
        assert!(!all.matches(&target("a.com", "http")));
    }

    #[test]
    fn test_empty_chains_match() {
        assert!(all_filter().matches(&target("x", "http")));
        assert!(any_filter().matches(&target("x", "http")));
    }

    #[test]
    fn test_fn_filter() {
        let api = fn_filter(|target| target.path().starts_with("/api"));
        assert!(api.matches(&RouteTarget::new("/api/users", "", "")));
        assert!(!api.matches(&RouteTarget::new("/web", "", "")));
    }
}
