//! Echo handlers used to exercise route files without application code.
//!
//! Every handler answers `200` with a JSON document describing what was
//! resolved: the route, the handler reference, the request method and path,
//! the bound parameters and the path segments.

use serde_json::json;

use crate::context::RequestContext;
use crate::dispatcher::HandlerRegistry;
use crate::response::{HandlerOutput, HandlerResponse};
use crate::route::{split_controller, ResponseRef, RouteSource};

/// Echo the request context of an action or controller invocation.
pub fn echo_context(ctx: &RequestContext, handler: &str, params: &[String]) -> HandlerOutput {
    HandlerResponse::ok_json(json!({
        "route": ctx.route_name.as_ref(),
        "handler": handler,
        "method": ctx.method.as_str(),
        "path": ctx.path,
        "params": ctx.attributes().to_map(),
        "values": params,
        "segments": ctx.segments(),
    }))
    .into()
}

/// Echo the captured values of a response function invocation.
pub fn echo_values(handler: &str, params: &[String]) -> HandlerOutput {
    HandlerResponse::ok_json(json!({
        "handler": handler,
        "values": params,
    }))
    .into()
}

/// Build a registry holding an echo handler for every key referenced by `sources`.
///
/// Type references are ignored: a bare key carries no path, and its route
/// metadata only exists on the application's own action type.
pub fn registry_for(sources: &[RouteSource]) -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();
    for source in sources {
        let RouteSource::Descriptor(d) = source else {
            continue;
        };
        if let Some(key) = d.action.as_deref().filter(|k| !k.is_empty()) {
            let name = key.to_string();
            handlers.register_action_with(key, None, move |ctx, params| {
                Ok(echo_context(ctx, &name, params))
            });
        }
        if let Some((type_key, _)) = d.controller.as_deref().and_then(split_controller) {
            let name = type_key.to_string();
            handlers.register_controller_with(type_key, move |ctx, method, params| {
                Some(Ok(echo_context(ctx, &format!("{name}@{method}"), params)))
            });
        }
        if let Some(ResponseRef::Named(key)) = &d.response {
            let name = key.clone();
            handlers.register_response(key, move |params| Ok(echo_values(&name, params)));
        }
    }
    handlers
}
