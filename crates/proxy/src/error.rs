use thiserror::Error;

use crate::target::TargetOriginError;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The server has already been started.
    #[error("the server has already been started")]
    AlreadyStarted,

    /// Failed to bind the listen address.
    #[error("failed to bind listen address: {0}")]
    Bind(#[from] std::io::Error),

    /// Failed to construct the outbound HTTP client.
    #[error("failed to construct outbound client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors that can occur while forwarding a single request.
///
/// Every variant maps to the 502 response path; by the time forwarding
/// starts, the target header has already been validated as present.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The target origin could not be parsed or composed into an upstream URL.
    #[error(transparent)]
    Target(#[from] TargetOriginError),

    /// The outbound request failed or the upstream response could not be read.
    #[error("upstream error: {0}")]
    Upstream(#[from] reqwest::Error),
}
