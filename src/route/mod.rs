//! # Route Module
//!
//! Route definitions and everything that happens to them before they enter
//! the route table.
//!
//! ## Overview
//!
//! A route starts life as a loosely structured [`RouteDescriptor`]: a path
//! pattern, a name, one or more method tokens and exactly one handler
//! reference. Descriptors come from three places:
//!
//! - built in code with the [`RouteDescriptor`] builder methods
//! - the static route metadata of an [`Action`](crate::dispatcher::Action)
//!   type, registered by key ([`RouteSource::Type`])
//! - route files in YAML, JSON or TOML ([`load_routes`])
//!
//! On registration every descriptor is [validated](validate()), its method
//! tokens are [normalized](normalize_methods) into a [`MethodSet`], its handler
//! reference is resolved against the
//! [`HandlerRegistry`](crate::dispatcher::HandlerRegistry) and the result is
//! stored as an immutable [`Route`].
//!
//! ## Route files
//!
//! ```yaml
//! routes:
//!   - HomeAction                     # action type exposing its own route metadata
//!   - path: /users/:id/posts/:pid
//!     name: users
//!     method: [GET, POST]
//!     action: IndexAction
//!   - path: /controller/:test
//!     name: controller
//!     method: GET
//!     controller: HomeController@test
//!   - path: /test
//!     name: test
//!     method: GET
//!     response: test                 # key of a registered response function
//! ```

mod load;
mod types;
mod validate;

pub use load::{load_routes, parse_routes};
pub use types::{HandlerKind, MethodSet, ResponseRef, Route, RouteDescriptor, RouteSource};
pub use validate::{normalize_methods, split_controller, validate, CONTROLLER_SEPARATOR};
