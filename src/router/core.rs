use http::{HeaderMap, Method, Request, Version};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::pattern::PatternCache;
use crate::config::RouterConfig;
use crate::context::{bind, ParamValues, RequestContext};
use crate::dispatcher::{dispatch, Action, HandlerRegistry, RouteHandler};
use crate::error::{Result, RouterError};
use crate::ids::RequestId;
use crate::response::{finalize, HandlerResponse};
use crate::route::{
    load_routes, normalize_methods, split_controller, validate, ResponseRef, Route,
    RouteDescriptor, RouteSource,
};

const SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(1);

/// A route whose path matched, with its captured values in path order.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    /// The candidate route
    pub route: &'a Route,
    /// Parameter captures, whole-match capture excluded
    pub params: ParamValues,
}

/// Evaluate every route against `path` in registration order.
///
/// All routes whose pattern matches are returned, not just the first.
/// Fails with [`RouterError::NotFound`] when none matches.
pub fn match_path<'a>(path: &str, routes: &'a [Route]) -> Result<Vec<MatchResult<'a>>> {
    let candidates: Vec<MatchResult<'a>> = routes
        .iter()
        .filter_map(|route| {
            route
                .pattern()
                .captures(path)
                .map(|params| MatchResult { route, params })
        })
        .collect();

    if candidates.is_empty() {
        return Err(RouterError::NotFound {
            path: path.to_string(),
        });
    }
    Ok(candidates)
}

/// Pick the first candidate allowing `method`.
///
/// When none does, fails with [`RouterError::MethodNotAllowed`] listing the
/// union of methods allowed by every candidate, in first-seen order.
pub fn select_method<'a>(
    candidates: Vec<MatchResult<'a>>,
    method: &Method,
) -> Result<MatchResult<'a>> {
    let mut allowed: Vec<Method> = Vec::new();
    for candidate in candidates {
        for m in candidate.route.methods() {
            if !allowed.contains(m) {
                allowed.push(m.clone());
            }
        }
        if candidate.route.allows(method) {
            return Ok(candidate);
        }
    }
    Err(RouterError::MethodNotAllowed {
        method: method.clone(),
        allowed,
    })
}

/// Percent-decode a request path one `/`-separated segment at a time.
///
/// A segment that does not decode to UTF-8, or that decodes to a value
/// containing `/`, is kept raw so it can never span two path segments.
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }
    let segments: Vec<Cow<'_, str>> = raw
        .split('/')
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) if !decoded.contains('/') => decoded,
            _ => Cow::Borrowed(segment),
        })
        .collect();
    Cow::Owned(segments.join("/"))
}

/// Accumulates routes, then freezes them into a [`Router`].
///
/// Every route is validated, normalized and has its handler and path pattern
/// resolved when it is added, so registration errors surface at the call
/// that caused them.
#[derive(Debug)]
pub struct RouterBuilder {
    handlers: HandlerRegistry,
    routes: Vec<Route>,
    patterns: PatternCache,
    config: RouterConfig,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new(HandlerRegistry::default())
    }
}

impl RouterBuilder {
    #[must_use]
    pub fn new(handlers: HandlerRegistry) -> Self {
        Self {
            handlers,
            routes: Vec::new(),
            patterns: PatternCache::new(),
            config: RouterConfig::default(),
        }
    }

    /// Replace the response finalization config.
    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Handler registry used to resolve handler keys of routes added later.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    /// Register a route from a descriptor or a type reference.
    ///
    /// # Errors
    ///
    /// - [`RouterError::Resolution`] for an unknown type, action or controller key
    /// - [`RouterError::Configuration`] for a type without route metadata
    /// - [`RouterError::Validation`] for an invalid descriptor
    pub fn add(&mut self, source: impl Into<RouteSource>) -> Result<&mut Self> {
        match source.into() {
            RouteSource::Descriptor(d) => self.add_route(d),
            RouteSource::Type(key) => self.add_type(&key),
        }
    }

    /// Register a structured descriptor.
    pub fn add_route(&mut self, descriptor: RouteDescriptor) -> Result<&mut Self> {
        validate(&descriptor, &self.handlers)?;
        let methods = normalize_methods(&descriptor)?;
        let handler = self.resolve_handler(&descriptor)?;
        let pattern = self.patterns.get_or_compile(&descriptor.path).map_err(|e| {
            RouterError::validation(
                descriptor.label(),
                format!("path '{}' does not compile: {e}", descriptor.path),
            )
        })?;

        info!(
            route = %descriptor.name,
            path = %descriptor.path,
            methods = ?methods,
            handler_kind = %handler.kind(),
            handler = %handler.describe(),
            params = pattern.param_count(),
            "Route registered"
        );

        self.routes.push(Route {
            path: Arc::from(descriptor.path.as_str()),
            name: Arc::from(descriptor.name.as_str()),
            methods,
            handler,
            pattern,
        });
        Ok(self)
    }

    /// Register the action type stored under `key` using its static route metadata.
    pub fn add_type(&mut self, key: &str) -> Result<&mut Self> {
        let descriptor = match self.handlers.action_route(key) {
            None => {
                return Err(RouterError::Resolution {
                    kind: "route type",
                    key: key.to_string(),
                })
            }
            Some(None) => {
                return Err(RouterError::Configuration {
                    type_key: key.to_string(),
                })
            }
            Some(Some(route)) => route.clone().action(key),
        };
        self.add_route(descriptor)
    }

    /// Register action type `A` under `key` and add its route in one step.
    pub fn add_action<A: Action>(&mut self, key: &str) -> Result<&mut Self> {
        self.handlers.register_action::<A>(key);
        self.add_type(key)
    }

    /// Register several sources in order, stopping at the first error.
    pub fn extend<I, S>(&mut self, sources: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<RouteSource>,
    {
        for source in sources {
            self.add(source)?;
        }
        Ok(self)
    }

    /// Register every route declared in a YAML, JSON or TOML route file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<&mut Self> {
        let sources = load_routes(path.as_ref())?;
        debug!(
            file = %path.as_ref().display(),
            routes = sources.len(),
            "Route file loaded"
        );
        self.extend(sources)?;
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the route table. The resulting router is immutable.
    #[must_use]
    pub fn freeze(self) -> Router {
        let mut by_name: HashMap<Arc<str>, usize> = HashMap::with_capacity(self.routes.len());
        for (i, route) in self.routes.iter().enumerate() {
            by_name.entry(route.name_arc()).or_insert(i);
        }

        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|r| format!("{:?} {}", r.methods(), r.path()))
            .collect();
        info!(
            routes_count = self.routes.len(),
            patterns_count = self.patterns.len(),
            routes_summary = ?routes_summary,
            "Routing table frozen"
        );

        Router {
            routes: self.routes,
            by_name,
            config: self.config,
        }
    }

    fn resolve_handler(&self, d: &RouteDescriptor) -> Result<RouteHandler> {
        if let Some(response) = &d.response {
            let f = match response {
                ResponseRef::Callable(f) => Arc::clone(f),
                ResponseRef::Named(key) => {
                    self.handlers
                        .response(key)
                        .ok_or_else(|| RouterError::Resolution {
                            kind: "response",
                            key: key.clone(),
                        })?
                }
            };
            return Ok(RouteHandler::Response(f));
        }

        if let Some(reference) = d.controller.as_deref() {
            let (type_key, method) = split_controller(reference).ok_or_else(|| {
                RouterError::validation(d.label(), format!("invalid controller '{reference}'"))
            })?;
            let call = self
                .handlers
                .controller(type_key)
                .ok_or_else(|| RouterError::Resolution {
                    kind: "controller",
                    key: type_key.to_string(),
                })?;
            return Ok(RouteHandler::Controller {
                type_key: Arc::from(type_key),
                method: Arc::from(method),
                call,
            });
        }

        let key = d.action.as_deref().unwrap_or_default();
        let call = self
            .handlers
            .action(key)
            .ok_or_else(|| RouterError::Resolution {
                kind: "action",
                key: key.to_string(),
            })?;
        Ok(RouteHandler::Action {
            type_key: Arc::from(key),
            call,
        })
    }
}

/// Immutable route table.
///
/// `Router` is `Send + Sync`; share it between threads behind an [`Arc`].
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    by_name: HashMap<Arc<str>, usize>,
    config: RouterConfig,
}

impl Router {
    /// Start building a router with the given handlers.
    #[must_use]
    pub fn builder(handlers: HandlerRegistry) -> RouterBuilder {
        RouterBuilder::new(handlers)
    }

    /// Registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First route registered under `name`.
    #[must_use]
    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// All routes whose path pattern matches `path`, in registration order.
    pub fn match_path(&self, path: &str) -> Result<Vec<MatchResult<'_>>> {
        match_path(path, &self.routes)
    }

    /// Match `path` and pick the first candidate allowing `method`.
    pub fn match_route(&self, method: &Method, path: &str) -> Result<MatchResult<'_>> {
        // RT1: Route match attempt
        debug!(method = %method, path = %path, "Route match attempt");

        let start = Instant::now();
        let result = self
            .match_path(path)
            .and_then(|candidates| select_method(candidates, method));
        let elapsed = start.elapsed();

        match &result {
            Ok(m) if elapsed > SLOW_MATCH_THRESHOLD => {
                warn!(
                    method = %method,
                    path = %path,
                    route = %m.route.name(),
                    route_pattern = %m.route.path(),
                    path_params = ?m.params,
                    duration_us = elapsed.as_micros() as u64,
                    "Slow route matching detected"
                );
            }
            Ok(m) => {
                // RT3: Route matched
                info!(
                    method = %method,
                    path = %path,
                    route = %m.route.name(),
                    route_pattern = %m.route.path(),
                    path_params = ?m.params,
                    duration_us = elapsed.as_micros() as u64,
                    "Route matched"
                );
            }
            Err(RouterError::MethodNotAllowed { allowed, .. }) => {
                warn!(
                    method = %method,
                    path = %path,
                    allowed = ?allowed,
                    "Method not allowed"
                );
            }
            Err(_) => {
                // RT4: No route found (404)
                warn!(
                    method = %method,
                    path = %path,
                    duration_us = elapsed.as_micros() as u64,
                    "No route matched"
                );
            }
        }

        result
    }

    /// Resolve an HTTP request into a finalized response.
    ///
    /// The URI path is percent-decoded segment by segment before matching.
    /// See [`decode_path`].
    pub fn resolve<B>(&self, request: &Request<B>) -> Result<HandlerResponse> {
        let path = decode_path(request.uri().path());
        self.resolve_parts(request.method(), &path, request.version(), request.headers())
    }

    /// Resolve a request given as its parts.
    ///
    /// Match, select by method, bind parameters, dispatch, then finalize.
    pub fn resolve_parts(
        &self,
        method: &Method,
        path: &str,
        version: Version,
        headers: &HeaderMap,
    ) -> Result<HandlerResponse> {
        let request_id = RequestId::from_headers(headers);
        let matched = self.match_route(method, path)?;
        let route = matched.route;

        let ctx = RequestContext::new(
            request_id,
            method.clone(),
            path.to_string(),
            version,
            headers.clone(),
            route.name_arc(),
            bind(route.path(), &matched.params),
        );

        let output = dispatch(route, &ctx, &matched.params)?;
        let response = finalize(route.name(), output, &self.config, method, version)?;

        debug!(
            request_id = %request_id,
            route = %route.name(),
            status = response.status.as_u16(),
            "Request resolved"
        );
        Ok(response)
    }

    /// Write the route table, one route per line.
    pub fn dump_routes(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "[routes] count={}", self.routes.len())?;
        for route in &self.routes {
            let methods: Vec<&str> = route.methods().iter().map(Method::as_str).collect();
            writeln!(
                out,
                "[route] {} {} -> {} ({}: {})",
                methods.join(","),
                route.path(),
                route.name(),
                route.handler_kind(),
                route.handler().describe()
            )?;
        }
        Ok(())
    }
}
