//! Per-request forwarding types.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, HOST};
use http::{HeaderMap, HeaderValue, Method};
use uuid::Uuid;

use crate::target::TargetOrigin;

/// Name of the header carrying the target origin.
pub const TARGET_HEADER: &str = "x-webdav-target";

/// Request headers copied to the upstream when present on the inbound
/// request. Everything outside this list is dropped; no caller-controlled
/// header beyond these ever reaches the upstream.
pub const FORWARDED_HEADERS: [&str; 6] = [
    "authorization",
    "content-type",
    "content-length",
    "depth",
    "if-none-match",
    "if-match",
];

/// One inbound request translated for forwarding. Lives for exactly one
/// request/response cycle; nothing is cached across requests.
#[derive(Clone, Debug)]
pub struct ForwardRequest {
    /// Correlation ID for the diagnostic log.
    pub id: Uuid,

    /// The inbound HTTP method, passed through unchanged.
    pub method: Method,

    /// The origin named by the caller.
    pub target: TargetOrigin,

    /// The inbound path with the mount prefix stripped.
    pub path: String,

    /// The allow-listed header subset, plus a synthesized `host`.
    pub headers: HeaderMap,

    /// Body bytes to send upstream, if any.
    pub body: Option<Bytes>,
}

impl ForwardRequest {
    /// Build a forwarding request from inbound parts.
    ///
    /// Applies the header allow-list (first value wins when a header is
    /// repeated), synthesizes `host` from the target, and decides whether
    /// the body travels upstream: always for PUT/POST/PATCH, otherwise only
    /// when a positive `content-length` was declared.
    #[must_use]
    pub fn new(
        method: Method,
        target: TargetOrigin,
        path: String,
        inbound_headers: &HeaderMap,
        body: Bytes,
    ) -> Self {
        let headers = forwarded_headers(inbound_headers, &target);
        let body = if forwards_body(&method, inbound_headers) {
            Some(body)
        } else {
            None
        };

        Self {
            id: Uuid::new_v4(),
            method,
            target,
            path,
            headers,
            body,
        }
    }

    /// The authorization header, redacted for logging. Shows the scheme and
    /// a short credential prefix, never the full value.
    #[must_use]
    pub fn redacted_authorization(&self) -> Option<String> {
        self.headers
            .get(http::header::AUTHORIZATION)
            .map(redact_credential)
    }
}

fn forwarded_headers(inbound: &HeaderMap, target: &TargetOrigin) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(host) = HeaderValue::from_str(target.host()) {
        headers.insert(HOST, host);
    }

    for name in FORWARDED_HEADERS {
        // `HeaderMap::get` returns the first value when repeated.
        if let Some(value) = inbound.get(name) {
            if let Ok(name) = http::HeaderName::from_bytes(name.as_bytes()) {
                headers.insert(name, value.clone());
            }
        }
    }

    headers
}

fn forwards_body(method: &Method, inbound: &HeaderMap) -> bool {
    if matches!(*method, Method::PUT | Method::POST | Method::PATCH) {
        return true;
    }

    declared_content_length(inbound) > 0
}

fn declared_content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn redact_credential(value: &HeaderValue) -> String {
    let Ok(value) = value.to_str() else {
        return "<non-ascii>".to_string();
    };

    match value.split_once(' ') {
        Some((scheme, credential)) => {
            let shown = &credential[..credential.len().min(8)];
            format!("{scheme} {shown}...")
        }
        None => {
            let shown = &value[..value.len().min(8)];
            format!("{shown}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn target() -> TargetOrigin {
        TargetOrigin::from_str("https://dav.example.com").unwrap()
    }

    fn request(method: Method, inbound: &HeaderMap, body: &'static [u8]) -> ForwardRequest {
        ForwardRequest::new(
            method,
            target(),
            "/a/b.txt".to_string(),
            inbound,
            Bytes::from_static(body),
        )
    }

    #[test]
    fn drops_headers_outside_the_allow_list() {
        let mut inbound = HeaderMap::new();
        inbound.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwdw=="));
        inbound.insert("depth", HeaderValue::from_static("1"));
        inbound.insert("cookie", HeaderValue::from_static("session=abc"));
        inbound.insert("x-evil", HeaderValue::from_static("1"));

        let forward = request(Method::GET, &inbound, b"");

        assert!(forward.headers.contains_key("authorization"));
        assert!(forward.headers.contains_key("depth"));
        assert!(!forward.headers.contains_key("cookie"));
        assert!(!forward.headers.contains_key("x-evil"));
    }

    #[test]
    fn synthesizes_host_from_the_target() {
        let forward = request(Method::GET, &HeaderMap::new(), b"");
        assert_eq!(forward.headers.get(HOST).unwrap(), "dav.example.com");
    }

    #[test]
    fn first_value_wins_for_repeated_headers() {
        let mut inbound = HeaderMap::new();
        inbound.append("depth", HeaderValue::from_static("0"));
        inbound.append("depth", HeaderValue::from_static("infinity"));

        let forward = request(Method::GET, &inbound, b"");
        assert_eq!(forward.headers.get("depth").unwrap(), "0");
        assert_eq!(forward.headers.get_all("depth").iter().count(), 1);
    }

    #[test]
    fn put_always_carries_its_body() {
        let forward = request(Method::PUT, &HeaderMap::new(), b"hello");
        assert_eq!(forward.body, Some(Bytes::from_static(b"hello")));
    }

    #[test]
    fn get_without_content_length_carries_no_body() {
        let forward = request(Method::GET, &HeaderMap::new(), b"hello");
        assert_eq!(forward.body, None);
    }

    #[test]
    fn get_with_positive_content_length_carries_its_body() {
        let mut inbound = HeaderMap::new();
        inbound.insert(CONTENT_LENGTH, HeaderValue::from_static("5"));

        let forward = request(Method::GET, &inbound, b"hello");
        assert_eq!(forward.body, Some(Bytes::from_static(b"hello")));
    }

    #[test]
    fn redacts_the_authorization_credential() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            "authorization",
            HeaderValue::from_static("Basic dXNlcjpzdXBlcnNlY3JldA=="),
        );

        let forward = request(Method::GET, &inbound, b"");
        let redacted = forward.redacted_authorization().unwrap();

        assert!(redacted.starts_with("Basic "));
        assert!(redacted.ends_with("..."));
        assert!(!redacted.contains("dXNlcjpzdXBlcnNlY3JldA=="));
    }
}
