use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::context::RequestContext;
use crate::error::{Result, RouterError};
use crate::response::HandlerOutput;
use crate::route::{HandlerKind, Route, RouteDescriptor};

/// Directly callable handler receiving the captured values in order.
pub type ResponseFn = Arc<dyn Fn(&[String]) -> anyhow::Result<HandlerOutput> + Send + Sync>;

/// Type-erased action: construct from the context, then invoke with the captures.
pub type ActionFn =
    Arc<dyn Fn(&RequestContext, &[String]) -> anyhow::Result<HandlerOutput> + Send + Sync>;

/// Type-erased controller: construct from the context, then look up and invoke
/// the named method. `None` when the method does not exist.
pub type ControllerFn = Arc<
    dyn Fn(&RequestContext, &str, &[String]) -> Option<anyhow::Result<HandlerOutput>>
        + Send
        + Sync,
>;

/// Bound controller method.
pub type ControllerMethod<C> = fn(&mut C, &[String]) -> anyhow::Result<HandlerOutput>;

/// A handler type constructed for every request and invoked as a whole.
///
/// ```rust
/// use waypoint::context::RequestContext;
/// use waypoint::dispatcher::Action;
/// use waypoint::response::{HandlerOutput, HandlerResponse};
/// use waypoint::route::RouteDescriptor;
///
/// struct HomeAction;
///
/// impl Action for HomeAction {
///     fn route() -> Option<RouteDescriptor> {
///         Some(RouteDescriptor::new("/", "home").method("GET"))
///     }
///
///     fn new(_ctx: &RequestContext) -> Self {
///         HomeAction
///     }
///
///     fn call(&mut self, _params: &[String]) -> anyhow::Result<HandlerOutput> {
///         Ok(HandlerResponse::ok_json(serde_json::json!({"message": "Home"})).into())
///     }
/// }
/// ```
pub trait Action: Sized + Send + 'static {
    /// Static route metadata (path, name, methods) used when the action is
    /// registered by type reference. The handler fields are filled in on
    /// registration.
    fn route() -> Option<RouteDescriptor> {
        None
    }

    /// Construct the action for one request.
    fn new(ctx: &RequestContext) -> Self;

    /// Invoke the action with the captured values in path order.
    fn call(&mut self, params: &[String]) -> anyhow::Result<HandlerOutput>;
}

/// A handler type exposing several methods, referenced as `Type@method`.
pub trait Controller: Sized + Send + 'static {
    /// Construct the controller for one request.
    fn new(ctx: &RequestContext) -> Self;

    /// Look up a method by name.
    fn method(name: &str) -> Option<ControllerMethod<Self>>;
}

#[derive(Clone)]
struct ActionEntry {
    call: ActionFn,
    route: Option<RouteDescriptor>,
}

/// Maps handler keys to constructors and callables.
///
/// Route descriptors reference handlers by key; the registry turns those keys
/// into typed handlers at registration time, so no string-to-type lookup
/// happens while resolving requests.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    responses: HashMap<String, ResponseFn>,
    actions: HashMap<String, ActionEntry>,
    controllers: HashMap<String, ControllerFn>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut responses: Vec<_> = self.responses.keys().collect();
        let mut actions: Vec<_> = self.actions.keys().collect();
        let mut controllers: Vec<_> = self.controllers.keys().collect();
        responses.sort();
        actions.sort();
        controllers.sort();
        f.debug_struct("HandlerRegistry")
            .field("responses", &responses)
            .field("actions", &actions)
            .field("controllers", &controllers)
            .finish()
    }
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response function under `key`.
    ///
    /// Registering the same key twice replaces the earlier function.
    pub fn register_response<F>(&mut self, key: &str, f: F) -> &mut Self
    where
        F: Fn(&[String]) -> anyhow::Result<HandlerOutput> + Send + Sync + 'static,
    {
        self.responses.insert(key.to_string(), Arc::new(f));
        self
    }

    /// Register an [`Action`] type under `key`.
    pub fn register_action<A: Action>(&mut self, key: &str) -> &mut Self {
        self.register_action_with(key, A::route(), |ctx, params| A::new(ctx).call(params))
    }

    /// Register an action from a closure and optional static route metadata.
    pub fn register_action_with<F>(
        &mut self,
        key: &str,
        route: Option<RouteDescriptor>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(&RequestContext, &[String]) -> anyhow::Result<HandlerOutput> + Send + Sync + 'static,
    {
        self.actions.insert(
            key.to_string(),
            ActionEntry {
                call: Arc::new(f),
                route,
            },
        );
        self
    }

    /// Register a [`Controller`] type under `key`.
    ///
    /// The controller is constructed before its method is looked up.
    pub fn register_controller<C: Controller>(&mut self, key: &str) -> &mut Self {
        self.register_controller_with(key, |ctx, method, params| {
            let mut controller = C::new(ctx);
            C::method(method).map(|m| m(&mut controller, params))
        })
    }

    /// Register a controller from a closure.
    pub fn register_controller_with<F>(&mut self, key: &str, f: F) -> &mut Self
    where
        F: Fn(&RequestContext, &str, &[String]) -> Option<anyhow::Result<HandlerOutput>>
            + Send
            + Sync
            + 'static,
    {
        self.controllers.insert(key.to_string(), Arc::new(f));
        self
    }

    #[must_use]
    pub fn response(&self, key: &str) -> Option<ResponseFn> {
        self.responses.get(key).map(Arc::clone)
    }

    #[must_use]
    pub fn action(&self, key: &str) -> Option<ActionFn> {
        self.actions.get(key).map(|e| Arc::clone(&e.call))
    }

    /// Static route metadata of an action: `None` if the key is unknown,
    /// `Some(None)` if the action exposes no metadata.
    #[must_use]
    pub fn action_route(&self, key: &str) -> Option<Option<&RouteDescriptor>> {
        self.actions.get(key).map(|e| e.route.as_ref())
    }

    #[must_use]
    pub fn controller(&self, key: &str) -> Option<ControllerFn> {
        self.controllers.get(key).map(Arc::clone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len() + self.actions.len() + self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolved handler of a route.
#[derive(Clone)]
pub enum RouteHandler {
    /// Directly callable function
    Response(ResponseFn),
    /// Controller type and the method to invoke on it
    Controller {
        type_key: Arc<str>,
        method: Arc<str>,
        call: ControllerFn,
    },
    /// Action type
    Action { type_key: Arc<str>, call: ActionFn },
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteHandler::Response(_) => f.write_str("Response(..)"),
            RouteHandler::Controller {
                type_key, method, ..
            } => write!(f, "Controller({type_key}@{method})"),
            RouteHandler::Action { type_key, .. } => write!(f, "Action({type_key})"),
        }
    }
}

impl RouteHandler {
    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        match self {
            RouteHandler::Response(_) => HandlerKind::Response,
            RouteHandler::Controller { .. } => HandlerKind::Controller,
            RouteHandler::Action { .. } => HandlerKind::Action,
        }
    }

    /// Human readable handler reference (`<closure>`, `Type@method`, `Type`).
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            RouteHandler::Response(_) => "<closure>".to_string(),
            RouteHandler::Controller {
                type_key, method, ..
            } => format!("{type_key}@{method}"),
            RouteHandler::Action { type_key, .. } => type_key.to_string(),
        }
    }
}

/// Invoke the handler of `route` with the captured values.
///
/// - **Response**: the callable is invoked with the captures.
/// - **Controller**: the type is constructed from `ctx`, then the named method
///   is invoked with the captures. A missing method is a dispatch error.
/// - **Action**: the type is constructed from `ctx` and invoked with the captures.
///
/// A handler error surfaces as [`RouterError::Handler`]; a panic is caught and
/// reported as [`RouterError::Dispatch`].
pub fn dispatch(route: &Route, ctx: &RequestContext, params: &[String]) -> Result<HandlerOutput> {
    let handler = route.handler();

    // D1: Handler invocation start
    debug!(
        request_id = %ctx.request_id,
        route = %route.name(),
        handler_kind = %handler.kind(),
        handler = %handler.describe(),
        params = ?params,
        "Dispatching to handler"
    );

    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| match handler {
        RouteHandler::Response(f) => Some(f(params)),
        RouteHandler::Controller { method, call, .. } => call(ctx, method, params),
        RouteHandler::Action { call, .. } => Some(call(ctx, params)),
    }));

    let result = match outcome {
        Ok(Some(Ok(output))) => Ok(output),
        Ok(Some(Err(source))) => {
            error!(
                request_id = %ctx.request_id,
                route = %route.name(),
                error = %source,
                "Handler returned an error"
            );
            Err(RouterError::Handler {
                route: route.name().to_string(),
                source,
            })
        }
        Ok(None) => {
            // D2: Controller method missing
            error!(
                request_id = %ctx.request_id,
                route = %route.name(),
                handler = %handler.describe(),
                "Controller method does not exist"
            );
            Err(RouterError::dispatch(
                route.name(),
                format!("controller method '{}' does not exist", handler.describe()),
            ))
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            // D3: Handler panic caught
            error!(
                request_id = %ctx.request_id,
                route = %route.name(),
                panic_message = %message,
                "Handler panicked"
            );
            Err(RouterError::dispatch(
                route.name(),
                format!("handler panicked: {message}"),
            ))
        }
    };

    if result.is_ok() {
        info!(
            request_id = %ctx.request_id,
            route = %route.name(),
            execution_time_us = start.elapsed().as_micros() as u64,
            "Handler execution complete"
        );
    }

    result
}
