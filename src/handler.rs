use crate::blocklist::BlockList;
use crate::cache::{CachedResponse, ProxyCache};
use crate::connect::connect_origin;
use crate::decode::decode;
use crate::error_response;
use crate::request::{create_cache_key, parse_request, rewrite_for_origin};
use crate::response::{calculate_ttl, is_cacheable, parse_response};
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Deadline on every individual socket read, both from the client and from
/// the origin. The reference design has none; this is the recommended
/// extension from §5, applied uniformly to both legs of the connection.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
/// Chunk size used when replaying a cached payload to the client.
const REPLAY_CHUNK_SIZE: usize = 8192;

/// Handles one accepted client connection end to end: reads and parses the
/// request, serves a cache hit or forwards to the origin and streams the
/// response back, capturing bytes for a possible cache insertion along the
/// way. Every exit path returns normally — there is no error path that
/// leaves the socket or any buffer unreleased, since both are owned values
/// dropped by the caller once this function returns.
pub async fn handle_client(
    mut client: TcpStream,
    cache: ProxyCache,
    block_list: Arc<BlockList>,
    max_request_bytes: usize,
) {
    let Some(raw_request) = read_request(&mut client, max_request_bytes).await else {
        return;
    };

    let Some(request) = parse_request(&raw_request) else {
        tracing::debug!("failed to parse client request, closing");
        return;
    };

    if request.method != "GET" {
        tracing::debug!(method = %request.method, "unsupported method, closing");
        return;
    }

    let Some((host, port)) = request.host_port() else {
        let _ = error_response::send(&mut client, 500).await;
        return;
    };
    if request.path.is_empty() {
        let _ = error_response::send(&mut client, 500).await;
        return;
    }
    if request.version != "HTTP/1.0" && request.version != "HTTP/1.1" {
        let _ = error_response::send(&mut client, 500).await;
        return;
    }

    if block_list.is_blocked(&host) {
        tracing::info!(%host, "blocked by policy");
        let _ = error_response::send(&mut client, 403).await;
        return;
    }

    let cache_key = create_cache_key(&host, port, &request.path);

    if let Some(cached) = cache.lookup(cache_key).await {
        tracing::debug!(%host, path = %request.path, "cache hit");
        let _ = serve_cached(&mut client, &cached).await;
        return;
    }

    tracing::debug!(%host, path = %request.path, "cache miss, forwarding");
    forward_and_cache(&mut client, &request, &host, port, &cache, cache_key).await;
}

/// Reads into a bounded buffer until `CRLF CRLF` appears, the buffer fills,
/// the peer closes, or a read stalls past [`CONNECTION_TIMEOUT`]. All three
/// non-terminator outcomes abandon the request silently, matching the
/// reference's "no error body sent" limitation.
async fn read_request(client: &mut TcpStream, max_bytes: usize) -> Option<BytesMut> {
    let mut buffer = BytesMut::with_capacity(max_bytes.min(8192));

    loop {
        match timeout(CONNECTION_TIMEOUT, client.read_buf(&mut buffer)).await {
            Ok(Ok(0)) => return None,
            Ok(Ok(_)) => {
                if buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                    return Some(buffer);
                }
                if buffer.len() >= max_bytes {
                    return None;
                }
            }
            Ok(Err(_)) | Err(_) => return None,
        }
    }
}

/// Writes a cached payload back to the client in fixed-size chunks and
/// returns — the intended cache-hit behavior (§9), not the reference's
/// forward-on-hit bug.
async fn serve_cached(client: &mut TcpStream, cached: &CachedResponse) -> std::io::Result<()> {
    client.write_all(cached.status_line.as_bytes()).await?;
    for header in &cached.headers {
        client.write_all(header.as_bytes()).await?;
        client.write_all(b"\r\n").await?;
    }
    client.write_all(b"\r\n").await?;
    for chunk in cached.body.chunks(REPLAY_CHUNK_SIZE) {
        client.write_all(chunk).await?;
    }
    Ok(())
}

/// Opens an origin connection, forwards the rewritten request, and streams
/// the response back to the client while capturing bytes for a possible
/// cache insertion. Capture stops early once the response is already too
/// large to ever be cached, but streaming to the client continues
/// regardless (spec §8 scenario 5).
async fn forward_and_cache(
    client: &mut TcpStream,
    request: &crate::request::ParsedRequest,
    host: &str,
    port: u16,
    cache: &ProxyCache,
    cache_key: u64,
) {
    let rewritten = rewrite_for_origin(request, host);

    let mut upstream = match connect_origin(host, port).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(%host, port, error = %err, "origin connect failed");
            let _ = error_response::send(client, 500).await;
            return;
        }
    };

    if upstream.write_all(&rewritten).await.is_err() {
        let _ = error_response::send(client, 500).await;
        return;
    }

    let mut captured: Vec<u8> = Vec::with_capacity(8192);
    let mut oversized = false;
    let capture_limit = cache.max_entry_bytes();
    let mut chunk = vec![0u8; 4095];

    loop {
        let read = match timeout(CONNECTION_TIMEOUT, upstream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
            Ok(Err(_)) | Err(_) => return, // mid-stream fault: abort, no caching
        };

        if client.write_all(&chunk[..read]).await.is_err() {
            return;
        }

        if !oversized {
            if captured.len() + read > capture_limit {
                oversized = true;
                captured.clear();
                captured.shrink_to_fit();
            } else {
                captured.extend_from_slice(&chunk[..read]);
            }
        }
    }

    if oversized {
        tracing::debug!(%host, path = %request.path, "response exceeds cache entry bound, not cached");
        return;
    }

    try_cache_response(&captured, host, &request.path, cache, cache_key).await;
}

/// Parses the captured response, decides cacheability, decodes a
/// compressed body if declared, and inserts into the cache. All failures
/// here are non-fatal: the response has already been streamed to the
/// client, so a decode or cache-bound failure just means this response
/// stays uncached.
async fn try_cache_response(
    captured: &[u8],
    host: &str,
    path: &str,
    cache: &ProxyCache,
    cache_key: u64,
) {
    let Some(parsed) = parse_response(captured) else {
        return;
    };

    if !is_cacheable("GET", &parsed.headers) {
        return;
    }

    let encoding = parsed.header_get("Content-Encoding").map(str::to_string);
    let body = match encoding.as_deref() {
        Some(enc) => match decode(parsed.body, enc) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::debug!(%host, path, error = %err, "decode failed, not caching");
                return;
            }
        },
        None => Bytes::copy_from_slice(parsed.body),
    };

    let headers: Vec<String> = parsed
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("Content-Encoding"))
        .map(|(name, value)| format!("{name}: {value}"))
        .collect();

    let ttl = calculate_ttl(&parsed.headers);
    let expires = now_secs() + ttl;

    let response = CachedResponse {
        status_line: parsed.status_line.clone(),
        headers,
        body,
        expires,
    };

    if cache.insert(cache_key, response).await {
        tracing::debug!(%host, path, ttl, "cached");
    } else {
        tracing::debug!(%host, path, "cache rejected entry (oversize)");
    }
}

fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
