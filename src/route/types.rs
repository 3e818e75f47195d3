use http::Method;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::dispatcher::{ResponseFn, RouteHandler};
use crate::response::HandlerOutput;
use crate::router::PathPattern;

/// Allowed methods of a route, in declared order. Duplicates are kept.
pub type MethodSet = SmallVec<[Method; 4]>;

/// Dispatch strategy of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// A type constructed per request and invoked as a whole
    Action,
    /// A `Type@method` pair: constructed per request, then one method invoked
    Controller,
    /// A directly callable function
    Response,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Action => write!(f, "action"),
            HandlerKind::Controller => write!(f, "controller"),
            HandlerKind::Response => write!(f, "response"),
        }
    }
}

/// The `response` field of a descriptor.
#[derive(Clone)]
pub enum ResponseRef {
    /// A callable supplied directly
    Callable(ResponseFn),
    /// Key of a response function in the handler registry
    Named(String),
}

impl fmt::Debug for ResponseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseRef::Callable(_) => f.write_str("Callable(..)"),
            ResponseRef::Named(key) => f.debug_tuple("Named").field(key).finish(),
        }
    }
}

/// Loosely structured route definition, validated on registration.
///
/// Exactly one of `action`, `controller` and `response` must be set.
///
/// ```rust
/// use waypoint::route::RouteDescriptor;
///
/// let descriptor = RouteDescriptor::new("/users/:id", "user")
///     .method("GET")
///     .controller("UserController@show");
/// assert_eq!(descriptor.method, vec!["GET"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteDescriptor {
    /// Path pattern, e.g. `/users/:id`
    pub path: String,
    /// Identity of the route, used for lookups
    pub name: String,
    /// Allowed method tokens, in declared order
    pub method: Vec<String>,
    /// Registry key of an action type
    pub action: Option<String>,
    /// `Type@method` controller reference
    pub controller: Option<String>,
    /// Direct callable or registry key of a response function
    pub response: Option<ResponseRef>,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Allow one more method token.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method.push(method.into());
        self
    }

    /// Allow several method tokens.
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method.extend(methods.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn action(mut self, key: impl Into<String>) -> Self {
        self.action = Some(key.into());
        self
    }

    #[must_use]
    pub fn controller(mut self, reference: impl Into<String>) -> Self {
        self.controller = Some(reference.into());
        self
    }

    /// Handle the route with a closure receiving the captured values in order.
    #[must_use]
    pub fn response<F>(mut self, f: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<HandlerOutput> + Send + Sync + 'static,
    {
        self.response = Some(ResponseRef::Callable(Arc::new(f)));
        self
    }

    /// Handle the route with an already shared response function.
    #[must_use]
    pub fn response_fn(mut self, f: ResponseFn) -> Self {
        self.response = Some(ResponseRef::Callable(f));
        self
    }

    /// Handle the route with a response function registered under `key`.
    #[must_use]
    pub fn response_key(mut self, key: impl Into<String>) -> Self {
        self.response = Some(ResponseRef::Named(key.into()));
        self
    }

    /// Label used in validation errors: the action key, else the name, else the path.
    pub(crate) fn label(&self) -> String {
        [self.action.as_deref(), Some(self.name.as_str()), Some(self.path.as_str())]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("<unnamed>")
            .to_string()
    }
}

/// Input accepted by [`RouterBuilder::add`](crate::router::RouterBuilder::add).
#[derive(Debug, Clone)]
pub enum RouteSource {
    /// A structured descriptor
    Descriptor(RouteDescriptor),
    /// Registry key of an action type exposing static route metadata
    Type(String),
}

impl From<RouteDescriptor> for RouteSource {
    fn from(d: RouteDescriptor) -> Self {
        RouteSource::Descriptor(d)
    }
}

impl From<&str> for RouteSource {
    fn from(key: &str) -> Self {
        RouteSource::Type(key.to_string())
    }
}

impl From<String> for RouteSource {
    fn from(key: String) -> Self {
        RouteSource::Type(key)
    }
}

/// A validated, normalized route. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) path: Arc<str>,
    pub(crate) name: Arc<str>,
    pub(crate) methods: MethodSet,
    pub(crate) handler: RouteHandler,
    pub(crate) pattern: Arc<PathPattern>,
}

impl Route {
    /// Declared path pattern.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Allowed methods in declared order.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Exact, case-sensitive method check.
    #[inline]
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    #[must_use]
    pub fn handler_kind(&self) -> HandlerKind {
        self.handler.kind()
    }

    #[must_use]
    pub fn handler(&self) -> &RouteHandler {
        &self.handler
    }

    /// Compiled path pattern (shared between routes declaring the same path).
    #[must_use]
    pub fn pattern(&self) -> &Arc<PathPattern> {
        &self.pattern
    }
}
