use thiserror::Error;

/// Failures that can occur while dialing an origin server.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("DNS resolution failed for {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("connect to {host}:{port} timed out")]
    Timeout { host: String, port: u16 },
}

/// Failures that can occur while decoding a captured response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported content-encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("decompression failed: {0}")]
    Inflate(#[source] std::io::Error),
}
