use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::info;

use crate::config::ServerConfig;
use crate::http::connection::{Connection, ConnectionLimits};
use crate::server::router::Router;
use crate::server::shutdown::Shutdown;

/// Pause after a failed `accept` so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the listening socket with address reuse and the configured backlog.
pub fn bind(cfg: &ServerConfig) -> anyhow::Result<TcpListener> {
    let ip: IpAddr = cfg
        .host
        .parse()
        .with_context(|| format!("invalid listen host {:?}", cfg.host))?;
    let addr = SocketAddr::new(ip, cfg.port);

    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket
        .bind(addr)
        .with_context(|| format!("failed to bind {addr}"))?;
    let listener = socket.listen(cfg.backlog)?;

    info!(address = %listener.local_addr()?, backlog = cfg.backlog, "Listening");
    Ok(listener)
}

/// Binds according to `cfg` and serves until `shutdown` is triggered.
pub async fn run(cfg: &ServerConfig, router: Arc<Router>, shutdown: Shutdown) -> anyhow::Result<()> {
    let listener = bind(cfg)?;
    serve(listener, router, cfg, shutdown).await
}

/// Accept loop.
///
/// `accept` is polled with `poll_interval_ms` so the shutdown flag is seen
/// promptly. Each connection runs in its own task and is closed when that task
/// ends. Accept failures are logged and the loop carries on. Once shutdown is
/// observed no new connections are taken, in-flight ones run to completion,
/// and the listening socket is dropped.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    cfg: &ServerConfig,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let poll_interval = Duration::from_millis(cfg.poll_interval_ms);
    let limits = ConnectionLimits::from(cfg);
    let mut tasks = JoinSet::new();

    while !shutdown.is_triggered() {
        while let Some(done) = tasks.try_join_next() {
            if let Err(e) = done {
                tracing::error!(error = %e, "Connection task failed");
            }
        }

        let accepted = match timeout(poll_interval, listener.accept()).await {
            Ok(accepted) => accepted,
            Err(_) => continue,
        };

        let (socket, peer) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tasks.spawn(async move {
            let mut conn = Connection::new(socket, Some(peer), router, limits);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {:#}", peer, e);
            }
            info!("Connection from {} closed", peer);
        });
    }

    info!(in_flight = tasks.len(), "Stopping listener");
    while let Some(done) = tasks.join_next().await {
        if let Err(e) = done {
            tracing::error!(error = %e, "Connection task failed");
        }
    }
    drop(listener);
    info!("Server stopped");

    Ok(())
}
