//! # Router Module
//!
//! Route table construction, path matching and request resolution.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building the route table from descriptors, action types and route files
//! - Compiling declared paths into anchored regex patterns
//! - Matching incoming request paths against every registered route
//! - Choosing among path-matching routes by HTTP method
//! - Handing the selected route to the dispatcher and finalizing its response
//!
//! ## Architecture
//!
//! The router uses a build-then-freeze lifecycle:
//!
//! 1. **Registration**: [`RouterBuilder`] validates each route as it is added,
//!    resolves its handler against the
//!    [`HandlerRegistry`](crate::dispatcher::HandlerRegistry) and compiles its
//!    path (e.g. `/users/:id`) into a [`PathPattern`]. Routes declaring the same
//!    path share one compiled pattern.
//!
//! 2. **Resolution**: [`RouterBuilder::freeze`] yields an immutable [`Router`].
//!    For each request every route is tested in registration order; all routes
//!    whose path matches are candidates, and the first candidate allowing the
//!    request method wins.
//!
//! ## Example
//!
//! ```rust
//! use http::{Method, Request, StatusCode};
//! use waypoint::dispatcher::HandlerRegistry;
//! use waypoint::error::RouterError;
//! use waypoint::response::HandlerResponse;
//! use waypoint::route::RouteDescriptor;
//! use waypoint::router::RouterBuilder;
//!
//! let mut builder = RouterBuilder::new(HandlerRegistry::new());
//! builder
//!     .add_route(
//!         RouteDescriptor::new("/users/:id", "user")
//!             .methods(["GET", "POST"])
//!             .response(|params: &[String]| {
//!                 Ok(HandlerResponse::ok_json(serde_json::json!({ "id": params[0] })).into())
//!             }),
//!     )
//!     .unwrap();
//! let router = builder.freeze();
//!
//! let request = Request::get("/users/42").body(()).unwrap();
//! let response = router.resolve(&request).unwrap();
//! assert_eq!(response.status, StatusCode::OK);
//!
//! let request = Request::delete("/users/42").body(()).unwrap();
//! match router.resolve(&request).unwrap_err() {
//!     RouterError::MethodNotAllowed { allowed, .. } => {
//!         assert_eq!(allowed, vec![Method::GET, Method::POST]);
//!     }
//!     other => panic!("unexpected {other}"),
//! }
//! ```
//!
//! ## Performance
//!
//! Matching is a linear scan over compiled patterns, O(n) in the number of
//! routes. Matches slower than one millisecond are logged at `warn`.

mod core;
mod pattern;

pub use core::{decode_path, match_path, select_method, MatchResult, Router, RouterBuilder};
pub use pattern::{param_name, PathPattern, PatternCache};
