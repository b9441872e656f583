//! Proxy service lifecycle.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

use crate::error::Error;
use crate::forwarder::Forwarder;
use crate::router::router;

/// Options for the proxy service.
pub struct ProxyServiceOptions {
    /// The address to listen on.
    pub listen_addr: SocketAddr,

    /// Bound on each upstream exchange, `None` for no bound.
    pub upstream_timeout: Option<Duration>,
}

/// The WebDAV forwarding proxy service.
///
/// Owns the listener task and the shared outbound client. Start it once;
/// a second `start` returns [`Error::AlreadyStarted`].
pub struct ProxyService {
    forwarder: Arc<Forwarder>,
    listen_addr: SocketAddr,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl ProxyService {
    /// Create a new proxy service.
    pub fn new(
        ProxyServiceOptions {
            listen_addr,
            upstream_timeout,
        }: ProxyServiceOptions,
    ) -> Result<Self, Error> {
        Ok(Self {
            forwarder: Arc::new(Forwarder::new(upstream_timeout)?),
            listen_addr,
            shutdown_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        })
    }

    /// Start serving.
    ///
    /// Binds the listen address and spawns the server task. The returned
    /// handle resolves when the server exits.
    pub async fn start(&self) -> Result<JoinHandle<()>, Error> {
        if self.task_tracker.is_closed() {
            return Err(Error::AlreadyStarted);
        }

        let router = router(self.forwarder.clone());
        let shutdown_token = self.shutdown_token.clone();

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(Error::Bind)?;

        info!("proxy listening on {}", self.listen_addr);

        let handle = self.task_tracker.spawn(async move {
            tokio::select! {
                e = axum::serve(listener, router.into_make_service()).into_future() => {
                    info!("proxy server exited {:?}", e);
                }
                () = shutdown_token.cancelled() => {}
            };
        });

        self.task_tracker.close();

        Ok(handle)
    }

    /// Shut the service down and wait for the listener task to finish.
    pub async fn shutdown(&self) {
        info!("proxy shutting down...");

        self.shutdown_token.cancel();
        self.task_tracker.wait().await;

        info!("proxy shutdown");
    }

    /// Wait for the listener task to finish without initiating shutdown.
    pub async fn wait(&self) {
        self.task_tracker.wait().await;
    }
}
