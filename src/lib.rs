//! # waypoint
//!
//! **waypoint** is a small, synchronous HTTP request router. Given a set of
//! route definitions (path pattern, allowed methods, one handler) it matches
//! an incoming request to exactly one route, binds its path parameters,
//! invokes the handler and finalizes the result into a response.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`route`]** - Route descriptors, validation and route files
//! - **[`router`]** - Pattern compilation, the route table and request resolution
//! - **[`context`]** - Parameter binding and the per-request context handed to handlers
//! - **[`dispatcher`]** - Handler registry, `Action`/`Controller` traits and dispatch
//! - **[`response`]** - Handler responses and response finalization
//! - **[`typed`]** - Coercion of captured values at the handler boundary
//! - **[`config`]** - Default header configuration
//! - **[`logging`]** - `tracing-subscriber` setup
//! - **[`cli`]** - The `waypoint` command-line tool
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Router
//!     participant Pattern as PathPattern
//!     participant Dispatcher
//!     participant Handler
//!
//!     Caller->>Router: resolve(GET /users/42/posts/7)
//!     Router->>Pattern: test every route in registration order
//!     Pattern-->>Router: candidates + captures
//!     Router->>Router: first candidate allowing GET
//!     alt no path matched
//!         Router-->>Caller: NotFound (404)
//!     else path matched, method did not
//!         Router-->>Caller: MethodNotAllowed (405) + union of methods
//!     end
//!     Router->>Router: bind :id, :pid → RequestContext
//!     Router->>Dispatcher: dispatch(route, ctx, ["42", "7"])
//!     Dispatcher->>Handler: call / new + call / new + method
//!     Handler-->>Dispatcher: HandlerOutput
//!     Dispatcher-->>Router: output
//!     Router->>Router: finalize (default headers, prepare)
//!     Router-->>Caller: HandlerResponse
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Request;
//! use waypoint::dispatcher::HandlerRegistry;
//! use waypoint::response::HandlerResponse;
//! use waypoint::route::RouteDescriptor;
//! use waypoint::router::RouterBuilder;
//! use waypoint::typed;
//!
//! let mut builder = RouterBuilder::new(HandlerRegistry::new());
//! builder
//!     .add_route(
//!         RouteDescriptor::new("/users/:id/posts/:pid", "post")
//!             .method("GET")
//!             .response_fn(typed::response(|(user, post): (u64, u64)| {
//!                 Ok(HandlerResponse::ok_json(serde_json::json!({
//!                     "user": user,
//!                     "post": post,
//!                 }))
//!                 .into())
//!             })),
//!     )
//!     .unwrap();
//! let router = builder.freeze();
//!
//! let request = Request::get("/users/42/posts/7").body(()).unwrap();
//! let response = router.resolve(&request).unwrap();
//! assert_eq!(response.get_header("content-type"), Some("application/json"));
//! ```
//!
//! ## Concurrency
//!
//! Registration happens on a `RouterBuilder` owned by one thread. The frozen
//! [`Router`](router::Router) is immutable and `Send + Sync`; share it behind
//! an `Arc` and resolve from as many threads as needed.

pub mod cli;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod ids;
pub mod logging;
pub mod response;
pub mod route;
pub mod router;
pub mod typed;

pub use config::{HeaderDirective, HeaderDirectives, RouterConfig};
pub use context::{PathParams, RequestContext};
pub use dispatcher::{Action, Controller, HandlerRegistry};
pub use error::{Result, RouterError};
pub use response::{HandlerOutput, HandlerResponse};
pub use route::{RouteDescriptor, RouteSource};
pub use router::{Router, RouterBuilder};
