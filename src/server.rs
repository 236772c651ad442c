use crate::blocklist::BlockList;
use crate::cache::ProxyCache;
use crate::config::Config;
use crate::handler::handle_client;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Semaphore;

/// Owns the listening socket, the concurrency semaphore, and the shared
/// cache — the three process singletons the reference design keeps as
/// globals, collected here into a value built in `main` and passed to
/// workers explicitly (§9).
pub struct ProxyServer {
    listener: TcpListener,
    cache: ProxyCache,
    block_list: Arc<BlockList>,
    permits: Arc<Semaphore>,
    max_request_bytes: usize,
}

impl ProxyServer {
    pub async fn bind(config: &Config, block_list: BlockList) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
        Ok(Self {
            listener,
            cache: ProxyCache::new(),
            block_list: Arc::new(block_list),
            permits: Arc::new(Semaphore::new(config.max_clients)),
            max_request_bytes: config.max_request_bytes,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until SIGINT/SIGTERM, spawning one bounded
    /// worker per connection. A worker acquires its permit before any other
    /// work and releases it via RAII drop on every exit path, including a
    /// panic unwind.
    pub async fn run(self) -> std::io::Result<()> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT, shutting down");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.dispatch(stream, addr),
                        Err(err) => {
                            tracing::warn!(error = %err, "accept failed, continuing");
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Spawns a worker for `stream`. The semaphore permit is acquired
    /// inside the spawned task (not before spawning it) so a burst of
    /// accepts never blocks the accept loop itself — excess connections
    /// queue on the permit, not on `accept`.
    fn dispatch(&self, stream: tokio::net::TcpStream, addr: std::net::SocketAddr) {
        let cache = self.cache.clone();
        let block_list = self.block_list.clone();
        let permits = self.permits.clone();
        let max_request_bytes = self.max_request_bytes;

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return, // semaphore closed during shutdown
            };
            tracing::debug!(%addr, "accepted connection");
            handle_client(stream, cache, block_list, max_request_bytes).await;
        });
    }
}
