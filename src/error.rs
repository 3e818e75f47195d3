//! Error taxonomy for registration and resolution.
//!
//! Every failure is raised synchronously at the call site that triggered it:
//! registration errors come out of [`RouterBuilder`](crate::router::RouterBuilder)
//! and resolution errors out of [`Router::resolve`](crate::router::Router::resolve).
//! Nothing is retried or swallowed internally.

use http::{Method, StatusCode};
use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Errors produced while building the route table or resolving a request.
#[derive(Debug)]
pub enum RouterError {
    /// A type reference was registered but carries no route metadata.
    Configuration {
        /// Registry key of the offending type
        type_key: String,
    },
    /// A route descriptor failed validation.
    Validation {
        /// Label of the route being validated (action key, name or path)
        route: String,
        /// Human readable reason
        reason: String,
    },
    /// A string-referenced handler type is not known to the handler registry.
    Resolution {
        /// Which handler kind was being looked up (`action`, `controller`, `route type`)
        kind: &'static str,
        /// The key that failed to resolve
        key: String,
    },
    /// No registered path pattern matches the request path.
    NotFound {
        /// Request path as matched
        path: String,
    },
    /// At least one path matched, but none of the matching routes allow the method.
    MethodNotAllowed {
        /// Method of the incoming request
        method: Method,
        /// Union of methods allowed by every path-matching route, first-seen order
        allowed: Vec<Method>,
    },
    /// The handler ran but did not produce a usable response.
    Dispatch {
        /// Name of the resolved route
        route: String,
        /// Human readable reason
        reason: String,
    },
    /// The handler itself returned an error (for example a failed parameter coercion).
    Handler {
        /// Name of the resolved route
        route: String,
        /// Error returned by the handler
        source: anyhow::Error,
    },
}

impl RouterError {
    pub(crate) fn validation(route: impl Into<String>, reason: impl Into<String>) -> Self {
        RouterError::Validation {
            route: route.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn dispatch(route: impl Into<String>, reason: impl Into<String>) -> Self {
        RouterError::Dispatch {
            route: route.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status a server should answer with when this error escapes resolution.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RouterError::NotFound { .. } => StatusCode::NOT_FOUND,
            RouterError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for errors raised while registering routes rather than resolving requests.
    #[must_use]
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            RouterError::Configuration { .. }
                | RouterError::Validation { .. }
                | RouterError::Resolution { .. }
        )
    }

    /// Comma separated list of allowed methods, suitable for an `Allow` header.
    ///
    /// Empty for every variant except [`RouterError::MethodNotAllowed`].
    #[must_use]
    pub fn allow_header(&self) -> String {
        match self {
            RouterError::MethodNotAllowed { allowed, .. } => join_methods(allowed),
            _ => String::new(),
        }
    }
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Configuration { type_key } => write!(
                f,
                "missing required route metadata on route type '{type_key}'"
            ),
            RouterError::Validation { route, reason } => {
                write!(f, "invalid route '{route}': {reason}")
            }
            RouterError::Resolution { kind, key } => {
                write!(f, "invalid {kind} given: '{key}' is not registered")
            }
            RouterError::NotFound { path } => write!(f, "no route found for path '{path}'"),
            RouterError::MethodNotAllowed { method, allowed } => write!(
                f,
                "method '{method}' is not allowed, allowed methods: '{}'",
                join_methods(allowed)
            ),
            RouterError::Dispatch { route, reason } => {
                write!(f, "dispatch of route '{route}' failed: {reason}")
            }
            RouterError::Handler { route, source } => {
                write!(f, "handler for route '{route}' failed: {source}")
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::Handler { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = RouterError::NotFound {
            path: "/nope".to_string(),
        };
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let not_allowed = RouterError::MethodNotAllowed {
            method: Method::DELETE,
            allowed: vec![Method::GET, Method::POST],
        };
        assert_eq!(not_allowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(not_allowed.allow_header(), "GET, POST");

        let dispatch = RouterError::dispatch("home", "no response");
        assert_eq!(dispatch.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_method_not_allowed_message_lists_methods() {
        let err = RouterError::MethodNotAllowed {
            method: Method::DELETE,
            allowed: vec![Method::GET, Method::POST],
        };
        assert_eq!(
            err.to_string(),
            "method 'DELETE' is not allowed, allowed methods: 'GET, POST'"
        );
    }

    #[test]
    fn test_registration_classification() {
        assert!(RouterError::validation("x", "bad").is_registration_error());
        assert!(RouterError::Configuration {
            type_key: "home".into()
        }
        .is_registration_error());
        assert!(!RouterError::NotFound { path: "/".into() }.is_registration_error());
    }

    #[test]
    fn test_handler_error_exposes_source() {
        use std::error::Error;
        let err = RouterError::Handler {
            route: "users".into(),
            source: anyhow::anyhow!("invalid digit"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("invalid digit"));
    }
}
