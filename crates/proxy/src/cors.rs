//! Permissive CORS for browser callers.
//!
//! Every response carries the CORS headers, and any `OPTIONS` request is
//! answered with an unconditional 204 before it reaches routing, so
//! preflights succeed even for paths the router does not know.

use std::sync::LazyLock;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

/// Methods advertised to preflights, including the WebDAV verbs browsers
/// must be told about explicitly.
pub const ALLOWED_METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "DELETE", "OPTIONS", "PROPFIND", "MKCOL", "HEAD",
];

/// Request headers advertised to preflights.
pub const ALLOWED_REQUEST_HEADERS: [&str; 6] = [
    "Authorization",
    "Content-Type",
    "Depth",
    "X-WebDAV-Target",
    "If-None-Match",
    "If-Match",
];

static ALLOW_METHODS_VALUE: LazyLock<HeaderValue> = LazyLock::new(|| {
    HeaderValue::from_str(&ALLOWED_METHODS.join(", "))
        .unwrap_or_else(|_| HeaderValue::from_static("GET"))
});

static ALLOW_HEADERS_VALUE: LazyLock<HeaderValue> = LazyLock::new(|| {
    HeaderValue::from_str(&ALLOWED_REQUEST_HEADERS.join(", "))
        .unwrap_or_else(|_| HeaderValue::from_static("Authorization"))
});

/// Add the CORS headers to a response header map.
pub fn apply(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS_VALUE.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS_VALUE.clone());
}

/// Middleware answering preflights and decorating every other response.
pub async fn layer(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertises_webdav_methods() {
        let value = ALLOW_METHODS_VALUE.to_str().unwrap();
        assert!(value.contains("PROPFIND"));
        assert!(value.contains("MKCOL"));
    }

    #[test]
    fn advertises_the_target_header() {
        let value = ALLOW_HEADERS_VALUE.to_str().unwrap();
        assert!(value.contains("X-WebDAV-Target"));
    }

    #[test]
    fn apply_sets_all_three_headers() {
        let mut headers = HeaderMap::new();
        apply(&mut headers);

        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert!(headers.contains_key(ACCESS_CONTROL_ALLOW_METHODS));
        assert!(headers.contains_key(ACCESS_CONTROL_ALLOW_HEADERS));
    }
}
