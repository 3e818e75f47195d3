mod common;

use common::demo_handlers;
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Version};
use waypoint::config::{HeaderDirective, RouterConfig};
use waypoint::dispatcher::HandlerRegistry;
use waypoint::error::RouterError;
use waypoint::ids::{RequestId, REQUEST_ID_HEADER};
use waypoint::response::{HandlerOutput, HandlerResponse, ResponseBody};
use waypoint::route::RouteDescriptor;
use waypoint::router::{Router, RouterBuilder};

fn router(config: RouterConfig, descriptor: RouteDescriptor) -> Router {
    let mut builder = RouterBuilder::new(demo_handlers()).with_config(config);
    builder.add(descriptor).unwrap();
    builder.freeze()
}

fn html(_params: &[String]) -> anyhow::Result<HandlerOutput> {
    let mut resp = HandlerResponse::text(StatusCode::OK, "<h1>hi</h1>");
    resp.set_header("Content-Type", "text/html");
    resp.set_header("Vary", "Accept");
    Ok(resp.into())
}

#[test]
fn test_default_content_type_overwrites_handler_value() {
    let router = router(
        RouterConfig::default(),
        RouteDescriptor::new("/", "home").method("GET").response(html),
    );
    let resp = router
        .resolve(&Request::get("/").body(()).unwrap())
        .unwrap();
    assert_eq!(resp.get_header_all("content-type"), vec!["application/json"]);
    assert_eq!(resp.get_header("content-length"), Some("11"));
}

#[test]
fn test_without_defaults_handler_headers_survive() {
    let router = router(
        RouterConfig::without_default_headers(),
        RouteDescriptor::new("/", "home").method("GET").response(html),
    );
    let resp = router
        .resolve(&Request::get("/").body(()).unwrap())
        .unwrap();
    assert_eq!(resp.get_header("content-type"), Some("text/html"));
}

#[test]
fn test_non_replacing_directive_appends() {
    let config = RouterConfig::without_default_headers().with_header(
        "Vary",
        HeaderDirective::Detailed {
            value: vec!["Origin".into()],
            replace: false,
        },
    );
    let router = router(
        config,
        RouteDescriptor::new("/", "home").method("GET").response(html),
    );
    let resp = router
        .resolve(&Request::get("/").body(()).unwrap())
        .unwrap();
    assert_eq!(resp.get_header_all("vary"), vec!["Accept", "Origin"]);
}

#[test]
fn test_directives_apply_in_declared_order() {
    let config = RouterConfig::without_default_headers()
        .with_header("content-type", HeaderDirective::Value("text/plain".into()))
        .with_header("Content-Type", HeaderDirective::Value("application/json".into()));
    let router = router(
        config,
        RouteDescriptor::new("/", "home").method("GET").response(html),
    );
    let resp = router
        .resolve(&Request::get("/").body(()).unwrap())
        .unwrap();
    assert_eq!(resp.get_header_all("content-type"), vec!["application/json"]);
}

#[test]
fn test_head_keeps_length_but_drops_body() {
    let router = router(
        RouterConfig::default(),
        RouteDescriptor::new("/", "home").methods(["GET", "HEAD"]).response(html),
    );
    let resp = router
        .resolve(&Request::head("/").body(()).unwrap())
        .unwrap();
    assert_eq!(resp.get_header("content-length"), Some("11"));
    assert_eq!(resp.body, ResponseBody::Empty);

    let http = resp.into_http();
    assert!(http.body().is_empty());
    assert_eq!(http.headers()["content-length"], "11");
}

#[test]
fn test_non_response_output_is_dispatch_error() {
    let router = router(
        RouterConfig::default(),
        RouteDescriptor::new("/text/:x", "text")
            .method("GET")
            .controller("HomeController@text"),
    );
    let err = router
        .resolve(&Request::get("/text/1").body(()).unwrap())
        .unwrap_err();
    assert!(matches!(err, RouterError::Dispatch { .. }));
    assert!(err.to_string().contains("produced string"));
}

#[test]
fn test_missing_controller_method_is_dispatch_error() {
    let router = router(
        RouterConfig::default(),
        RouteDescriptor::new("/c/:x", "c")
            .method("GET")
            .controller("HomeController@missing"),
    );
    let err = router
        .resolve(&Request::get("/c/1").body(()).unwrap())
        .unwrap_err();
    assert!(matches!(err, RouterError::Dispatch { .. }));
    assert!(err.to_string().contains("HomeController@missing"));
}

#[test]
fn test_request_id_is_reused_from_header() {
    let id = RequestId::new();
    let mut builder = RouterBuilder::new(HandlerRegistry::new());
    builder
        .handlers_mut()
        .register_action_with("Echo", None, |ctx, _params| {
            Ok(HandlerResponse::ok_json(serde_json::json!({ "id": ctx.request_id.to_string() }))
                .into())
        });
    builder
        .add(RouteDescriptor::new("/id", "id").method("GET").action("Echo"))
        .unwrap();
    let router = builder.freeze();

    let mut headers = HeaderMap::new();
    headers.insert(
        REQUEST_ID_HEADER,
        HeaderValue::from_str(&id.to_string()).unwrap(),
    );
    let resp = router
        .resolve_parts(&Method::GET, "/id", Version::HTTP_11, &headers)
        .unwrap();
    assert_eq!(
        resp.body,
        ResponseBody::Json(serde_json::json!({ "id": id.to_string() }))
    );
}
