#![allow(dead_code)]

use serde_json::json;
use waypoint::context::RequestContext;
use waypoint::dispatcher::{Action, Controller, ControllerMethod, HandlerRegistry};
use waypoint::response::{HandlerOutput, HandlerResponse, ResponseBody};
use waypoint::route::RouteDescriptor;
use waypoint::typed;

/// Action exposing its own route metadata.
pub struct HomeAction;

impl Action for HomeAction {
    fn route() -> Option<RouteDescriptor> {
        Some(RouteDescriptor::new("/", "home").method("GET"))
    }

    fn new(_ctx: &RequestContext) -> Self {
        HomeAction
    }

    fn call(&mut self, _params: &[String]) -> anyhow::Result<HandlerOutput> {
        Ok(HandlerResponse::ok_json(json!({ "message": "Home" })).into())
    }
}

/// Action registered through a descriptor; coerces its parameters to integers.
pub struct IndexAction {
    id: Option<String>,
    segments: Vec<String>,
}

impl Action for IndexAction {
    fn new(ctx: &RequestContext) -> Self {
        Self {
            id: ctx.attribute("id").map(str::to_string),
            segments: ctx.segments().to_vec(),
        }
    }

    fn call(&mut self, params: &[String]) -> anyhow::Result<HandlerOutput> {
        let (id, pid): (u64, u64) = typed::params(params)?;
        Ok(HandlerResponse::ok_json(json!({
            "id": id,
            "pid": pid,
            "attribute_id": self.id,
            "segments": self.segments,
        }))
        .into())
    }
}

pub struct HomeController {
    path: String,
}

impl HomeController {
    fn test(&mut self, params: &[String]) -> anyhow::Result<HandlerOutput> {
        Ok(HandlerResponse::ok_json(json!({ "test": params[0], "path": self.path })).into())
    }

    fn text(&mut self, _params: &[String]) -> anyhow::Result<HandlerOutput> {
        Ok(HandlerOutput::Text("plain".to_string()))
    }
}

impl Controller for HomeController {
    fn new(ctx: &RequestContext) -> Self {
        Self {
            path: ctx.path.clone(),
        }
    }

    fn method(name: &str) -> Option<ControllerMethod<Self>> {
        match name {
            "test" => Some(Self::test),
            "text" => Some(Self::text),
            _ => None,
        }
    }
}

/// Registry with the demo handlers above plus a `test` response function.
pub fn demo_handlers() -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();
    handlers
        .register_action::<HomeAction>("HomeAction")
        .register_action::<IndexAction>("IndexAction")
        .register_controller::<HomeController>("HomeController")
        .register_response("test", |params: &[String]| {
            Ok(HandlerResponse::ok_json(json!({ "values": params })).into())
        });
    handlers
}

pub fn json_body(resp: &HandlerResponse) -> serde_json::Value {
    match &resp.body {
        ResponseBody::Json(v) => v.clone(),
        ResponseBody::Text(s) => serde_json::from_str(s).unwrap(),
        ResponseBody::Empty => serde_json::Value::Null,
    }
}
