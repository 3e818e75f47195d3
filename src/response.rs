//! Response objects produced by handlers and the finalization step applied
//! to them before they leave the router.

use http::{HeaderValue, Method, StatusCode, Version};
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

use crate::config::{HeaderDirective, RouterConfig};
use crate::error::{Result, RouterError};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names use `Arc<str>` so the names of configured default headers
/// can be shared between responses without copying.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Body carried by a [`HandlerResponse`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    /// No body
    #[default]
    Empty,
    /// Plain text body
    Text(String),
    /// JSON body, serialized on [`HandlerResponse::prepare`]
    Json(Value),
}

impl ResponseBody {
    /// Serialize the body to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Text(s) => s.as_bytes().to_vec(),
            ResponseBody::Json(v) => v.to_string().into_bytes(),
        }
    }

    fn default_content_type(&self) -> Option<&'static str> {
        match self {
            ResponseBody::Empty => None,
            ResponseBody::Text(_) => Some("text/plain; charset=UTF-8"),
            ResponseBody::Json(_) => Some("application/json"),
        }
    }
}

/// Response returned by a handler.
///
/// Header names are compared case-insensitively. [`set_header`](Self::set_header)
/// has last-write-wins semantics per header name.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// HTTP response headers
    pub headers: HeaderVec,
    /// Response body
    pub body: ResponseBody,
    /// Protocol version, negotiated against the request in [`prepare`](Self::prepare)
    pub version: Version,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new(StatusCode::OK, ResponseBody::Empty)
    }
}

impl HandlerResponse {
    /// Create a response with the given status and body and no headers.
    #[must_use]
    pub fn new(status: StatusCode, body: ResponseBody) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body,
            version: Version::HTTP_11,
        }
    }

    /// Create a JSON response.
    #[must_use]
    pub fn json(status: StatusCode, body: Value) -> Self {
        let mut resp = Self::new(status, ResponseBody::Json(body));
        resp.set_header("content-type", "application/json");
        resp
    }

    /// `200 OK` JSON response.
    #[must_use]
    pub fn ok_json(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    /// Plain text response.
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, ResponseBody::Text(body.into()))
    }

    /// JSON error response of the form `{"error": message}`.
    #[must_use]
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get the first value of a header.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values stored under a header name, in insertion order.
    #[must_use]
    pub fn get_header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Set a header, replacing every existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.remove_header(name);
        self.headers.push((Arc::from(name), value.into()));
    }

    /// Add a header value, keeping existing values with the same name.
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.push((Arc::from(name), value.into()));
    }

    /// Remove every value stored under a header name.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Apply a configured default header directive.
    ///
    /// A plain value replaces whatever the handler set under the same name.
    /// A detailed directive sets its values one after another; with
    /// `replace: false` the existing values are kept and the new ones appended.
    pub fn apply_directive(&mut self, name: &str, directive: &HeaderDirective) {
        match directive {
            HeaderDirective::Value(value) => self.set_header(name, value.clone()),
            HeaderDirective::Detailed { value, replace } => {
                let mut values = value.iter();
                if *replace {
                    match values.next() {
                        Some(first) => self.set_header(name, first.clone()),
                        None => self.remove_header(name),
                    }
                }
                for v in values {
                    self.append_header(name, v.clone());
                }
            }
        }
    }

    /// Prepare the response against the request it answers.
    ///
    /// Informational, `204` and `304` responses lose their body and entity
    /// headers. Otherwise `Content-Length` is computed from the serialized body
    /// (unless `Transfer-Encoding` is present) and a `Content-Type` is
    /// defaulted from the body kind. HEAD responses keep their headers but
    /// drop the body. The protocol version follows the request when it was
    /// HTTP/1.0 and is HTTP/1.1 otherwise.
    pub fn prepare(&mut self, method: &Method, version: Version) {
        self.version = if version == Version::HTTP_10 {
            Version::HTTP_10
        } else {
            Version::HTTP_11
        };

        let status = self.status.as_u16();
        if self.status.is_informational() || status == 204 || status == 304 {
            self.body = ResponseBody::Empty;
            self.remove_header("content-type");
            self.remove_header("content-length");
            return;
        }

        if self.get_header("content-type").is_none() {
            if let Some(ct) = self.body.default_content_type() {
                self.set_header("content-type", ct);
            }
        }

        if self.get_header("transfer-encoding").is_some() {
            self.remove_header("content-length");
        } else {
            let len = self.body.to_bytes().len();
            self.set_header("content-length", len.to_string());
        }

        if *method == Method::HEAD {
            self.body = ResponseBody::Empty;
        }

        debug!(
            status = status,
            version = ?self.version,
            headers = self.headers.len(),
            "Response prepared"
        );
    }

    /// Convert into an [`http::Response`] ready to be written to the wire.
    ///
    /// Headers whose name or value are not valid HTTP tokens are skipped.
    #[must_use]
    pub fn into_http(self) -> http::Response<Vec<u8>> {
        let body = self.body.to_bytes();
        let mut resp = http::Response::new(body);
        *resp.status_mut() = self.status;
        *resp.version_mut() = self.version;
        let headers = resp.headers_mut();
        for (name, value) in &self.headers {
            let (Ok(name), Ok(value)) = (
                http::header::HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                continue;
            };
            headers.append(name, value);
        }
        resp
    }
}

/// What a handler produced.
///
/// Only [`HandlerOutput::Response`] is accepted by the finalizer; every other
/// variant is reported as a dispatch error naming what was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// A response object
    Response(HandlerResponse),
    /// A bare JSON value
    Json(Value),
    /// A bare string
    Text(String),
    /// Nothing at all
    Empty,
}

impl HandlerOutput {
    /// Short description of the produced value, used in dispatch errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerOutput::Response(_) => "response",
            HandlerOutput::Json(Value::Null) => "json null",
            HandlerOutput::Json(Value::Bool(_)) => "json boolean",
            HandlerOutput::Json(Value::Number(_)) => "json number",
            HandlerOutput::Json(Value::String(_)) => "json string",
            HandlerOutput::Json(Value::Array(_)) => "json array",
            HandlerOutput::Json(Value::Object(_)) => "json object",
            HandlerOutput::Text(_) => "string",
            HandlerOutput::Empty => "nothing",
        }
    }
}

impl From<HandlerResponse> for HandlerOutput {
    fn from(resp: HandlerResponse) -> Self {
        HandlerOutput::Response(resp)
    }
}

impl From<Value> for HandlerOutput {
    fn from(v: Value) -> Self {
        HandlerOutput::Json(v)
    }
}

impl From<String> for HandlerOutput {
    fn from(s: String) -> Self {
        HandlerOutput::Text(s)
    }
}

impl From<()> for HandlerOutput {
    fn from(_: ()) -> Self {
        HandlerOutput::Empty
    }
}

/// Turn a handler's output into a finalized response.
///
/// Fails with [`RouterError::Dispatch`] when the handler did not produce a
/// [`HandlerOutput::Response`]. Otherwise the configured default headers are
/// applied after the handler's own headers (defaults win on conflict, unless a
/// directive says `replace: false`) and the response is
/// [prepared](HandlerResponse::prepare) against the request.
pub fn finalize(
    route: &str,
    output: HandlerOutput,
    config: &RouterConfig,
    method: &Method,
    version: Version,
) -> Result<HandlerResponse> {
    let mut resp = match output {
        HandlerOutput::Response(resp) => resp,
        other => {
            return Err(RouterError::dispatch(
                route,
                format!(
                    "handler must produce a response object, produced {}",
                    other.kind()
                ),
            ))
        }
    };

    for (name, directive) in config.default_headers.iter() {
        resp.apply_directive(name, directive);
    }
    resp.prepare(method, version);
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_header_is_last_write_wins() {
        let mut resp = HandlerResponse::default();
        resp.set_header("X-Trace", "a");
        resp.set_header("x-trace", "b");
        assert_eq!(resp.get_header_all("X-TRACE"), vec!["b"]);
    }

    #[test]
    fn test_apply_plain_directive_overwrites() {
        let mut resp = HandlerResponse::text(StatusCode::OK, "hi");
        resp.set_header("Content-Type", "text/html");
        resp.apply_directive(
            "Content-Type",
            &HeaderDirective::Value("application/json".into()),
        );
        assert_eq!(resp.get_header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_apply_detailed_directive_appends_without_replace() {
        let mut resp = HandlerResponse::default();
        resp.set_header("Vary", "Accept");
        resp.apply_directive(
            "Vary",
            &HeaderDirective::Detailed {
                value: vec!["Origin".into(), "Cookie".into()],
                replace: false,
            },
        );
        assert_eq!(resp.get_header_all("vary"), vec!["Accept", "Origin", "Cookie"]);
    }

    #[test]
    fn test_prepare_computes_length_and_type() {
        let mut resp = HandlerResponse::new(StatusCode::OK, ResponseBody::Json(json!({"a": 1})));
        resp.prepare(&Method::GET, Version::HTTP_11);
        assert_eq!(resp.get_header("content-length"), Some("7"));
        assert_eq!(resp.get_header("content-type"), Some("application/json"));
        assert_eq!(resp.version, Version::HTTP_11);
    }

    #[test]
    fn test_prepare_head_keeps_length_drops_body() {
        let mut resp = HandlerResponse::text(StatusCode::OK, "hello");
        resp.prepare(&Method::HEAD, Version::HTTP_11);
        assert_eq!(resp.get_header("content-length"), Some("5"));
        assert_eq!(resp.body, ResponseBody::Empty);
    }

    #[test]
    fn test_prepare_no_content_strips_entity() {
        let mut resp = HandlerResponse::text(StatusCode::NO_CONTENT, "ignored");
        resp.set_header("Content-Type", "text/plain");
        resp.prepare(&Method::GET, Version::HTTP_11);
        assert_eq!(resp.body, ResponseBody::Empty);
        assert!(resp.get_header("content-type").is_none());
        assert!(resp.get_header("content-length").is_none());
    }

    #[test]
    fn test_prepare_transfer_encoding_removes_length() {
        let mut resp = HandlerResponse::text(StatusCode::OK, "chunk");
        resp.set_header("Transfer-Encoding", "chunked");
        resp.set_header("Content-Length", "99");
        resp.prepare(&Method::GET, Version::HTTP_11);
        assert!(resp.get_header("content-length").is_none());
    }

    #[test]
    fn test_prepare_follows_http10_request() {
        let mut resp = HandlerResponse::default();
        resp.prepare(&Method::GET, Version::HTTP_10);
        assert_eq!(resp.version, Version::HTTP_10);

        let mut resp = HandlerResponse::default();
        resp.prepare(&Method::GET, Version::HTTP_2);
        assert_eq!(resp.version, Version::HTTP_11);
    }

    #[test]
    fn test_into_http() {
        let mut resp = HandlerResponse::ok_json(json!({"ok": true}));
        resp.prepare(&Method::GET, Version::HTTP_11);
        let http = resp.into_http();
        assert_eq!(http.status(), StatusCode::OK);
        assert_eq!(http.headers()["content-type"], "application/json");
        assert_eq!(http.body(), br#"{"ok":true}"#);
    }

    #[test]
    fn test_output_kind() {
        assert_eq!(HandlerOutput::from(json!(null)).kind(), "json null");
        assert_eq!(HandlerOutput::from("x".to_string()).kind(), "string");
        assert_eq!(HandlerOutput::from(()).kind(), "nothing");
    }

    #[test]
    fn test_finalize_rejects_non_response_output() {
        let err = finalize(
            "home",
            HandlerOutput::Text("hi".into()),
            &RouterConfig::default(),
            &Method::GET,
            Version::HTTP_11,
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::Dispatch { .. }));
        assert!(err.to_string().contains("produced string"));
    }

    #[test]
    fn test_finalize_applies_defaults_after_handler() {
        let mut resp = HandlerResponse::text(StatusCode::OK, "<p>hi</p>");
        resp.set_header("Content-Type", "text/html");
        let config = RouterConfig::default().with_header(
            "Vary",
            HeaderDirective::Detailed {
                value: vec!["Accept".into()],
                replace: false,
            },
        );
        let out = finalize("home", resp.into(), &config, &Method::GET, Version::HTTP_11).unwrap();
        assert_eq!(out.get_header_all("content-type"), vec!["application/json"]);
        assert_eq!(out.get_header("vary"), Some("Accept"));
        assert_eq!(out.get_header("content-length"), Some("9"));
    }
}
