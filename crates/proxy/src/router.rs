//! HTTP surface of the proxy.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router, middleware};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use serde_json::json;
use tracing::{info, warn};

use crate::cors;
use crate::forwarder::Forwarder;
use crate::request::{ForwardRequest, TARGET_HEADER};
use crate::response::{MissingTargetBody, ProxyErrorBody};
use crate::target::TargetOrigin;

/// Path prefix under which the proxy is mounted.
pub const MOUNT_PREFIX: &str = "/api/webdav-proxy";

/// Build the complete router: proxy mount, health and root endpoints,
/// JSON 404 fallback, CORS on everything.
pub fn router(forwarder: Arc<Forwarder>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
        .route(MOUNT_PREFIX, any(proxy))
        .route(&format!("{MOUNT_PREFIX}/"), any(proxy))
        .route(&format!("{MOUNT_PREFIX}/{{*path}}"), any(proxy))
        .fallback(any(not_found))
        .layer(middleware::from_fn(cors::layer))
        .with_state(forwarder)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "davbridge",
    }))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "davbridge WebDAV forwarding proxy",
        "endpoints": {
            "proxy": MOUNT_PREFIX,
            "health": "/health",
        },
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found" })),
    )
}

/// Handle one proxied request end to end.
///
/// A request without the target header is rejected with 400 before any
/// upstream contact. Everything that fails after that point, including an
/// unparsable target value, maps to 502 with the offending target echoed
/// back.
async fn proxy(
    State(forwarder): State<Arc<Forwarder>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(raw_target) = headers.get(TARGET_HEADER) else {
        warn!(method = %method, path = uri.path(), "request without target header");
        return (StatusCode::BAD_REQUEST, Json(MissingTargetBody::new())).into_response();
    };

    let raw_target = String::from_utf8_lossy(raw_target.as_bytes()).into_owned();

    let target = match TargetOrigin::from_str(&raw_target) {
        Ok(target) => target,
        Err(error) => {
            warn!(target = %raw_target, %error, "unusable target header");
            return bad_gateway(error.to_string(), raw_target);
        }
    };

    let path = uri
        .path()
        .strip_prefix(MOUNT_PREFIX)
        .unwrap_or_default()
        .to_string();

    let request = ForwardRequest::new(method, target, path, &headers, body);

    info!(
        id = %request.id,
        method = %request.method,
        target = %request.target,
        path = %request.path,
        "proxying request"
    );

    match forwarder.forward(request).await {
        Ok(relayed) => relayed.into_response(),
        Err(error) => {
            warn!(target = %raw_target, %error, "forwarding failed");
            bad_gateway(error.to_string(), raw_target)
        }
    }
}

fn bad_gateway(message: String, target: String) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(ProxyErrorBody::new(message, target)),
    )
        .into_response()
}
