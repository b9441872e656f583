//! CLI binary to run the WebDAV forwarding proxy.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use davbridge_proxy::{MOUNT_PREFIX, ProxyService, ProxyServiceOptions};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Proxy library error
    #[error(transparent)]
    Proxy(#[from] davbridge_proxy::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 3000, env = "DAVBRIDGE_PORT")]
    port: u16,

    /// Upstream exchange timeout in seconds (0 disables the timeout)
    #[arg(long, default_value_t = 30, env = "DAVBRIDGE_UPSTREAM_TIMEOUT_SECS")]
    upstream_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let listen_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let upstream_timeout = match args.upstream_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let service = ProxyService::new(ProxyServiceOptions {
        listen_addr,
        upstream_timeout,
    })?;

    // Create shared shutdown token
    let shutdown_token = CancellationToken::new();

    // Set up signal handlers
    let signal_shutdown_token = shutdown_token.clone();
    tokio::spawn(async move {
        if cfg!(unix) {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler failed");
            let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler failed");

            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
            }
        } else {
            // Fall back to just ctrl-c on non-unix platforms
            let _ = tokio::signal::ctrl_c().await;
            info!("Received interrupt signal");
        }

        info!("Shutting down");
        signal_shutdown_token.cancel();
    });

    let handle = service.start().await?;

    info!("proxy mounted at http://0.0.0.0:{}{}", args.port, MOUNT_PREFIX);
    info!("health check at http://0.0.0.0:{}/health", args.port);

    tokio::select! {
        () = shutdown_token.cancelled() => {
            service.shutdown().await;
        }
        _ = handle => {}
    }

    Ok(())
}
