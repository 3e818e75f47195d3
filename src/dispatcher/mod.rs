//! # Dispatcher Module
//!
//! The dispatcher turns a matched route into a handler invocation. It owns
//! the [`HandlerRegistry`] that maps handler keys to typed factories and the
//! [`dispatch`] function that calls the right one.
//!
//! ## Handler kinds
//!
//! Every route carries exactly one handler, resolved at registration time:
//!
//! | Kind | Declared as | Invoked as |
//! |---|---|---|
//! | response | closure or registry key | `f(params)` |
//! | controller | `"Type@method"` | `C::new(ctx)`, then `C::method("method")(&mut c, params)` |
//! | action | registry key | `A::new(ctx).call(params)` |
//!
//! String references are only looked up once, while the route table is
//! built. Resolution never goes from a string back to a type.
//!
//! ## Handler Registration
//!
//! ```rust
//! use waypoint::context::RequestContext;
//! use waypoint::dispatcher::{Controller, ControllerMethod, HandlerRegistry};
//! use waypoint::response::{HandlerOutput, HandlerResponse};
//!
//! struct HomeController;
//!
//! impl HomeController {
//!     fn test(&mut self, params: &[String]) -> anyhow::Result<HandlerOutput> {
//!         Ok(HandlerResponse::ok_json(serde_json::json!({ "test": params[0] })).into())
//!     }
//! }
//!
//! impl Controller for HomeController {
//!     fn new(_ctx: &RequestContext) -> Self {
//!         HomeController
//!     }
//!
//!     fn method(name: &str) -> Option<ControllerMethod<Self>> {
//!         match name {
//!             "test" => Some(Self::test),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut handlers = HandlerRegistry::new();
//! handlers
//!     .register_controller::<HomeController>("HomeController")
//!     .register_response("health", |_params: &[String]| {
//!         Ok(HandlerResponse::ok_json(serde_json::json!({ "status": "ok" })).into())
//!     });
//! assert_eq!(handlers.len(), 2);
//! ```
//!
//! ## Error Handling
//!
//! - A controller without the referenced method fails with
//!   [`RouterError::Dispatch`](crate::error::RouterError::Dispatch)
//! - A handler returning `Err` fails with
//!   [`RouterError::Handler`](crate::error::RouterError::Handler)
//! - Handler panics are caught and reported as dispatch errors
//!
//! Coercion of captured values to typed parameters happens at the handler
//! boundary, see [`crate::typed`].

mod core;

pub use core::{
    dispatch, Action, ActionFn, Controller, ControllerFn, ControllerMethod, HandlerRegistry,
    ResponseFn, RouteHandler,
};
