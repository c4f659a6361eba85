use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{lookup_host, TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::routing::chain::Router;
use crate::server::Context;

/// Pending connections the OS may queue before `accept`.
const LISTEN_BACKLOG: u32 = 16;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// A bound listener with its routing table and settings.
pub struct Server {
    listener: TcpListener,
    limit: Arc<Semaphore>,
    ctx: Arc<Context>,
}

impl Server {
    /// Binds the configured address. Handlers are fixed from here on.
    pub async fn bind(cfg: Config, router: Router) -> Result<Self, ServerError> {
        let addr = cfg.listen_addr();

        let listener = bind_listener(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;

        let max_connections = cfg.server.max_connections.max(1);
        info!(address = %addr, max_connections, handlers = router.len(), "Listening");

        Ok(Self {
            listener,
            limit: Arc::new(Semaphore::new(max_connections)),
            ctx: Arc::new(Context::new(cfg, router)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then drops the listener.
    ///
    /// Connections already accepted keep running to completion.
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            res = self.run() => res,
            _ = shutdown => {
                info!("Shutdown signal received");
                Ok(())
            }
        }
    }

    /// Accepts connections forever, one task per socket.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            // Wait for a free slot before taking the next connection.
            let permit = Arc::clone(&self.limit).acquire_owned().await?;

            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed");
                    continue;
                }
            };
            tracing::debug!(peer = %peer, "Accepted connection");

            let ctx = Arc::clone(&self.ctx);
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, peer, ctx);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {}", peer, e);
                }
                drop(permit);
            });
        }
    }
}

async fn bind_listener(addr: &str) -> io::Result<TcpListener> {
    let sock_addr = lookup_host(addr)
        .await?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "address did not resolve"))?;

    let socket = if sock_addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(sock_addr)?;
    socket.listen(LISTEN_BACKLOG)
}
