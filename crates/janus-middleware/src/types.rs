//! Common HTTP types used by the interception layer.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::StatusCode;
use http_body_util::Full;

use janus_core::ErrorBody;

/// The HTTP request type used in the middleware chain.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware chain.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building the gate's short-circuit responses.
pub trait ResponseExt {
    /// Creates a JSON response with a `{"detail": ...}` body.
    fn detail_json(status: StatusCode, detail: &str) -> Response;

    /// Creates a 302 redirect to the given location.
    fn redirect(location: &str) -> Response;
}

impl ResponseExt for Response {
    fn detail_json(status: StatusCode, detail: &str) -> Response {
        let body = serde_json::to_string(&ErrorBody::new(detail))
            .unwrap_or_else(|_| r#"{"detail":"internal error"}"#.to_string());

        http::Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build JSON response")
    }

    fn redirect(location: &str) -> Response {
        // A location with characters invalid in a header cannot be issued;
        // it degrades to a 500 rather than a panic.
        http::Response::builder()
            .status(StatusCode::FOUND)
            .header(LOCATION, location)
            .body(Full::new(Bytes::new()))
            .unwrap_or_else(|_| {
                http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from("invalid redirect target")))
                    .expect("failed to build error response")
            })
    }
}
