//! Parameter binding and the request context handed to handlers.
//!
//! Captured values are bound to parameter names positionally: the `i`-th
//! captured value belongs to the `i`-th `:name` segment of the route's
//! declared path. Names are re-derived from the declared path with the same
//! segment rule the pattern compiler uses, so both sides always agree.

use http::{HeaderMap, Method, Version};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ids::RequestId;
use crate::router::param_name;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered captured values of one match, as strings.
pub type ParamValues = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// Ordered `(name, value)` pairs.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Immutable named view over the parameters of a resolved route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(ParamVec);

impl PathParams {
    /// Get a parameter by name.
    ///
    /// Uses "last write wins" semantics when a name appears more than once
    /// (e.g. `/org/:id/user/:id` returns the user id).
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Convert to a `HashMap`. Allocates; prefer [`get`](Self::get).
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Parameter names of a declared route path, left to right.
pub fn param_names(route_path: &str) -> impl Iterator<Item = &str> {
    route_path.split('/').filter_map(param_name)
}

/// Bind captured values to the parameter names of `route_path`.
pub fn bind(route_path: &str, values: &[String]) -> PathParams {
    let bound: ParamVec = param_names(route_path)
        .zip(values.iter())
        .map(|(name, value)| (Arc::from(name), value.clone()))
        .collect();
    debug_assert_eq!(bound.len(), values.len(), "capture/name count mismatch");
    PathParams(bound)
}

/// Non-empty `/`-separated segments of a request path.
pub fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Request data visible to handlers.
///
/// Built once per resolution, after the route has been selected and its
/// parameters bound. Nothing in it is mutated afterwards.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Identifier of this resolution
    pub request_id: RequestId,
    /// HTTP method
    pub method: Method,
    /// Request path as matched (percent-decoded)
    pub path: String,
    /// HTTP version of the request
    pub version: Version,
    /// Request headers
    pub headers: HeaderMap,
    /// Name of the resolved route
    pub route_name: Arc<str>,
    attributes: PathParams,
    segments: Vec<String>,
}

impl RequestContext {
    pub(crate) fn new(
        request_id: RequestId,
        method: Method,
        path: String,
        version: Version,
        headers: HeaderMap,
        route_name: Arc<str>,
        attributes: PathParams,
    ) -> Self {
        let segments = segments(&path);
        Self {
            request_id,
            method,
            path,
            version,
            headers,
            route_name,
            attributes,
            segments,
        }
    }

    /// Named path parameter.
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// All bound path parameters.
    #[must_use]
    pub fn attributes(&self) -> &PathParams {
        &self.attributes
    }

    /// Non-empty segments of the request path, independent of parameter names.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segment at `index`, if present.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// Header value as a string (case-insensitive name).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bind_positional() {
        let params = bind("/a/:x/b/:y", &values(&["7", "foo"]));
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("x", "7"), ("y", "foo")]);
        assert_eq!(params.get("x"), Some("7"));
        assert_eq!(params.get("y"), Some("foo"));
        assert_eq!(params.get("z"), None);
    }

    #[test]
    fn test_bind_duplicate_name_last_wins() {
        let params = bind("/org/:id/user/:id", &values(&["1", "2"]));
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("2"));
    }

    #[test]
    fn test_param_names_ignore_literal_colons() {
        let names: Vec<_> = param_names("/a:b/:ok/:/:bad.name").collect();
        assert_eq!(names, vec!["ok"]);
    }

    #[test]
    fn test_segments_skip_empty() {
        assert_eq!(segments("/users//42/"), vec!["users", "42"]);
        assert!(segments("/").is_empty());
    }

    #[test]
    fn test_context_accessors() {
        let ctx = RequestContext::new(
            RequestId::new(),
            Method::GET,
            "/users/42/posts/7".into(),
            Version::HTTP_11,
            HeaderMap::new(),
            Arc::from("users"),
            bind("/users/:id/posts/:pid", &values(&["42", "7"])),
        );
        assert_eq!(ctx.attribute("id"), Some("42"));
        assert_eq!(ctx.attribute("pid"), Some("7"));
        assert_eq!(ctx.segments(), &["users", "42", "posts", "7"]);
        assert_eq!(ctx.segment(2), Some("posts"));
        assert_eq!(ctx.segment(9), None);
        assert_eq!(ctx.attributes().to_map().len(), 2);
    }
}
