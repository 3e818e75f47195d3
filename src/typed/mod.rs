//! # Typed Module
//!
//! Handler-boundary coercion of captured path values.
//!
//! The router hands every handler its captured values as strings, in path
//! order. Converting them to typed values (integers, ids, enums) is the
//! handler's business and may fail there; this module makes that conversion
//! a one-liner.
//!
//! ## Usage
//!
//! ```rust
//! use waypoint::typed;
//!
//! let values = vec!["42".to_string(), "7".to_string()];
//! let (user, post): (u64, u32) = typed::params(&values).unwrap();
//! assert_eq!((user, post), (42, 7));
//!
//! let bad = vec!["forty-two".to_string()];
//! assert!(typed::params::<(u64,)>(&bad).is_err());
//! ```
//!
//! A failed coercion inside a handler surfaces from resolution as
//! [`RouterError::Handler`](crate::error::RouterError::Handler).

mod core;

pub use core::{params, parse_param, response, FromParams};
