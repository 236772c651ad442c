use crate::error::ConnectError;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Bound on how long a single upstream connect attempt may take.
pub const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves `host` and opens a TCP connection to `(host, port)`.
///
/// Delegates resolution to `TcpStream::connect`, which tries every address
/// the system resolver returns — including IPv6 — rather than the
/// single-address IPv4-only path the reference implementation used.
pub async fn connect_origin(host: &str, port: u16) -> Result<TcpStream, ConnectError> {
    match timeout(UPSTREAM_CONNECT_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(ConnectError::Resolve {
            host: host.to_string(),
            port,
            source,
        }),
        Err(_) => Err(ConnectError::Timeout {
            host: host.to_string(),
            port,
        }),
    }
}
