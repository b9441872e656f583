//! Outbound forwarding to the target origin.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, ForwardError};
use crate::request::ForwardRequest;
use crate::response::RelayedResponse;

/// How many characters of an upstream error body end up in the log.
const LOGGED_BODY_LIMIT: usize = 500;

/// Sends translated requests to the target origin.
///
/// Holds a single shared client; the proxy itself keeps no per-request
/// state, so one forwarder serves every request concurrently.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Create a forwarder.
    ///
    /// Redirects are never followed; upstream 3xx responses relay to the
    /// caller like any other status. `upstream_timeout` bounds the whole
    /// request/response exchange, `None` disables the bound.
    pub fn new(upstream_timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());

        if let Some(timeout) = upstream_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(Error::Client)?;

        Ok(Self { client })
    }

    /// Forward one request and collect the full upstream response.
    pub async fn forward(&self, request: ForwardRequest) -> Result<RelayedResponse, ForwardError> {
        let url = request.target.upstream_url(&request.path)?;

        debug!(
            id = %request.id,
            method = %request.method,
            url = %url,
            authorization = request.redacted_authorization().as_deref().unwrap_or("<none>"),
            "forwarding to upstream"
        );

        let mut outbound = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        if let Some(body) = request.body {
            outbound = outbound.body(body);
        }

        let upstream = outbound.send().await?;
        let status = upstream.status();
        let headers = upstream.headers().clone();
        let body = upstream.bytes().await?;

        if status.is_client_error() || status.is_server_error() {
            let preview: String = String::from_utf8_lossy(&body)
                .chars()
                .take(LOGGED_BODY_LIMIT)
                .collect();
            warn!(
                id = %request.id,
                status = %status,
                body = preview,
                "upstream returned an error status"
            );
        } else {
            debug!(
                id = %request.id,
                status = %status,
                bytes = body.len(),
                "upstream responded"
            );
        }

        Ok(RelayedResponse::from_upstream(status, &headers, body))
    }
}
