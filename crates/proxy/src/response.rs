//! Upstream response relaying and JSON error bodies.

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_ENCODING, TRANSFER_ENCODING};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

/// Response headers never relayed back to the caller. These describe the
/// proxy-to-upstream connection, not the payload, and would corrupt the
/// already-decoded body we return.
pub const DROPPED_RESPONSE_HEADERS: [http::HeaderName; 3] =
    [CONTENT_ENCODING, TRANSFER_ENCODING, CONNECTION];

/// An upstream response ready to relay to the caller.
///
/// The status code passes through verbatim, including WebDAV codes such as
/// 207 Multi-Status. Headers are filtered through the drop-list and
/// empty-valued headers are discarded; the body is relayed byte for byte.
#[derive(Clone, Debug)]
pub struct RelayedResponse {
    /// The upstream status code, unchanged.
    pub status: StatusCode,

    /// Upstream headers minus the drop-list and empty values.
    pub headers: HeaderMap,

    /// The full upstream body.
    pub body: Bytes,
}

impl RelayedResponse {
    /// Filter upstream parts into a relayable response.
    #[must_use]
    pub fn from_upstream(status: StatusCode, upstream_headers: &HeaderMap, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();

        for (name, value) in upstream_headers {
            if DROPPED_RESPONSE_HEADERS.contains(name) || value.is_empty() {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }

        Self {
            status,
            headers,
            body,
        }
    }
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Body::from(self.body)).into_response()
    }
}

/// Body of the 400 response returned when the target header is absent.
#[derive(Debug, Serialize)]
pub struct MissingTargetBody {
    /// Short error name.
    pub error: &'static str,

    /// How to fix the request.
    pub hint: &'static str,
}

impl MissingTargetBody {
    /// The body for a request missing the target header.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            error: "Missing X-WebDAV-Target header",
            hint: "Add X-WebDAV-Target: https://dav.jianguoyun.com to request headers",
        }
    }
}

impl Default for MissingTargetBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of the 502 response returned when forwarding fails.
#[derive(Debug, Serialize)]
pub struct ProxyErrorBody {
    /// Short error name.
    pub error: &'static str,

    /// The underlying failure, as text.
    pub message: String,

    /// The target the caller asked for, echoed back verbatim.
    pub target: String,
}

impl ProxyErrorBody {
    /// The body for a failed forward to `target`.
    #[must_use]
    pub fn new(message: String, target: String) -> Self {
        Self {
            error: "Proxy error",
            message,
            target,
        }
    }
}
