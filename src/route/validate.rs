use http::Method;

use super::types::{MethodSet, ResponseRef, RouteDescriptor};
use crate::dispatcher::HandlerRegistry;
use crate::error::{Result, RouterError};

/// Separator between controller type and method in a controller reference.
pub const CONTROLLER_SEPARATOR: char = '@';

/// Validate a descriptor before it is normalized.
///
/// Checks run in order and the first failure is returned:
/// 1. `path`, `name` and `method` are non-empty
/// 2. exactly one of `action`, `response`, `controller` is set
/// 3. `response` is callable (a closure, or a key registered as a response function)
/// 4. `controller` has the form `Type@method`
pub fn validate(descriptor: &RouteDescriptor, handlers: &HandlerRegistry) -> Result<()> {
    let label = descriptor.label();

    let required = [
        ("path", descriptor.path.is_empty()),
        ("name", descriptor.name.is_empty()),
        ("method", descriptor.method.iter().all(String::is_empty)),
    ];
    if let Some((key, _)) = required.iter().find(|(_, missing)| *missing) {
        return Err(RouterError::validation(
            label,
            format!("missing required key '{key}'"),
        ));
    }

    let has_action = descriptor.action.as_deref().is_some_and(|s| !s.is_empty());
    let has_controller = descriptor
        .controller
        .as_deref()
        .is_some_and(|s| !s.is_empty());
    let has_response = match &descriptor.response {
        Some(ResponseRef::Named(key)) => !key.is_empty(),
        Some(ResponseRef::Callable(_)) => true,
        None => false,
    };

    let kinds = [has_action, has_response, has_controller]
        .iter()
        .filter(|set| **set)
        .count();
    if kinds == 0 {
        return Err(RouterError::validation(
            label,
            "missing one required param: 'action', 'response' or 'controller'",
        ));
    }
    if kinds > 1 {
        return Err(RouterError::validation(
            label,
            "only one of 'action', 'response' or 'controller' may be set",
        ));
    }

    if let Some(ResponseRef::Named(key)) = &descriptor.response {
        if has_response && handlers.response(key).is_none() {
            return Err(RouterError::validation(
                label,
                format!("param 'response' must be a callable, given unregistered key '{key}'"),
            ));
        }
    }

    if let Some(reference) = descriptor.controller.as_deref().filter(|_| has_controller) {
        if split_controller(reference).is_none() {
            return Err(RouterError::validation(
                label,
                format!(
                    "param 'controller' must contain a '{CONTROLLER_SEPARATOR}' between type and method, like 'Controller{CONTROLLER_SEPARATOR}method', given '{reference}'"
                ),
            ));
        }
    }

    Ok(())
}

/// Split `Type@method` into its two non-empty halves.
pub fn split_controller(reference: &str) -> Option<(&str, &str)> {
    let (type_key, method) = reference.split_once(CONTROLLER_SEPARATOR)?;
    if type_key.is_empty() || method.is_empty() {
        return None;
    }
    Some((type_key, method))
}

/// Coerce declared method tokens into a [`MethodSet`], keeping declared order.
///
/// Empty tokens are skipped; tokens that are not valid HTTP method tokens fail.
pub fn normalize_methods(descriptor: &RouteDescriptor) -> Result<MethodSet> {
    descriptor
        .method
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| {
            Method::from_bytes(m.as_bytes()).map_err(|_| {
                RouterError::validation(
                    descriptor.label(),
                    format!("invalid method token '{m}'"),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::HandlerOutput;

    fn registry() -> HandlerRegistry {
        let mut handlers = HandlerRegistry::new();
        handlers.register_response("ping", |_params: &[String]| Ok(HandlerOutput::Empty));
        handlers
    }

    fn reason(err: RouterError) -> String {
        match err {
            RouterError::Validation { reason, .. } => reason,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_keys_reported_in_order() {
        let handlers = registry();
        let d = RouteDescriptor::default().response_key("ping");
        assert_eq!(
            reason(validate(&d, &handlers).unwrap_err()),
            "missing required key 'path'"
        );

        let d = RouteDescriptor::new("/x", "").response_key("ping");
        assert_eq!(
            reason(validate(&d, &handlers).unwrap_err()),
            "missing required key 'name'"
        );

        let d = RouteDescriptor::new("/x", "x").response_key("ping");
        assert_eq!(
            reason(validate(&d, &handlers).unwrap_err()),
            "missing required key 'method'"
        );
    }

    #[test]
    fn test_requires_exactly_one_handler_kind() {
        let handlers = registry();
        let d = RouteDescriptor::new("/x", "x").method("GET");
        assert!(reason(validate(&d, &handlers).unwrap_err()).starts_with("missing one required"));

        let d = RouteDescriptor::new("/x", "x")
            .method("GET")
            .response_key("ping")
            .controller("Home@index");
        assert!(reason(validate(&d, &handlers).unwrap_err()).starts_with("only one of"));
    }

    #[test]
    fn test_response_key_must_be_registered() {
        let handlers = registry();
        let d = RouteDescriptor::new("/x", "x").method("GET").response_key("pong");
        assert!(reason(validate(&d, &handlers).unwrap_err()).contains("must be a callable"));

        let d = RouteDescriptor::new("/x", "x").method("GET").response_key("ping");
        assert!(validate(&d, &handlers).is_ok());
    }

    #[test]
    fn test_controller_requires_separator() {
        let handlers = registry();
        for bad in ["HomeController", "@index", "Home@"] {
            let d = RouteDescriptor::new("/x", "x").method("GET").controller(bad);
            assert!(
                reason(validate(&d, &handlers).unwrap_err()).contains("must contain a '@'"),
                "{bad} should be rejected"
            );
        }
        let d = RouteDescriptor::new("/x", "x")
            .method("GET")
            .controller("HomeController@test");
        assert!(validate(&d, &handlers).is_ok());
    }

    #[test]
    fn test_label_prefers_action_key() {
        let handlers = registry();
        let d = RouteDescriptor::new("", "home").action("HomeAction").method("GET");
        match validate(&d, &handlers).unwrap_err() {
            RouterError::Validation { route, .. } => assert_eq!(route, "HomeAction"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_normalize_methods_keeps_order_and_duplicates() {
        let d = RouteDescriptor::new("/x", "x").methods(["POST", "GET", "POST"]);
        let methods = normalize_methods(&d).unwrap();
        assert_eq!(methods.as_slice(), &[Method::POST, Method::GET, Method::POST]);
    }

    #[test]
    fn test_normalize_methods_rejects_invalid_token() {
        let d = RouteDescriptor::new("/x", "x").method("GE T");
        assert!(normalize_methods(&d).is_err());
    }
}
