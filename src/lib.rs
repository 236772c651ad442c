//! Forward HTTP caching proxy for small workgroups.
//!
//! Terminates client connections, forwards `GET` requests to origin
//! servers, streams responses back, and maintains an in-memory LRU response
//! cache keyed on `(host, port, path)`. Not an RFC-compliant general
//! purpose proxy — see `SPEC_FULL.md` for the full contract.

pub mod blocklist;
pub mod cache;
pub mod config;
pub mod connect;
pub mod decode;
pub mod error;
pub mod error_response;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use blocklist::BlockList;
pub use cache::{CachedResponse, ProxyCache};
pub use config::Config;
pub use request::{create_cache_key, parse_request, rewrite_for_origin, ParsedRequest};
pub use response::{calculate_ttl, is_cacheable, parse_response};
pub use server::ProxyServer;

/// Builds a `ProxyServer` from `config` (loading the block list file if one
/// was named) and runs it until SIGINT/SIGTERM.
pub async fn run(config: Config) -> std::io::Result<()> {
    let block_list = match &config.block_list_path {
        Some(path) => BlockList::load(path)?,
        None => BlockList::empty(),
    };

    let server = ProxyServer::bind(&config, block_list).await?;
    tracing::info!(port = config.port, "listening");
    server.run().await
}
