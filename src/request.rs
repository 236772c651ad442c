use xxhash_rust::xxh64::xxh64;

/// A parsed HTTP/1.x request line plus its headers, owned so it can outlive
/// the read buffer it was parsed from.
///
/// Headers are kept in arrival order in a flat `Vec` rather than a map:
/// requests rarely carry more than a dozen headers, and preserving order
/// matters when the remaining headers are serialized back out verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    pub path: String,
    pub version: &'static str,
    pub headers: Vec<(String, String)>,
}

impl ParsedRequest {
    /// Returns the first header value matching `name`, case-insensitively.
    pub fn header_get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets `name` to `value`, replacing the first existing occurrence or
    /// appending if absent.
    pub fn header_set(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            entry.1 = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    /// Removes every header matching `name`, case-insensitively.
    pub fn header_remove(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// `host` parsed out of the `Host` header, split from an optional port.
    pub fn host_port(&self) -> Option<(String, u16)> {
        extract_host_port(self.header_get("Host")?)
    }
}

/// Parses a raw client request. Returns `None` on malformed input or a
/// version `httparse` does not recognize as complete.
pub fn parse_request(data: &[u8]) -> Option<ParsedRequest> {
    let mut raw_headers = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut raw_headers);

    match req.parse(data) {
        Ok(httparse::Status::Complete(_)) => {
            let method = req.method?.to_string();
            let path = req.path?.to_string();
            let version = match req.version? {
                0 => "HTTP/1.0",
                1 => "HTTP/1.1",
                _ => return None,
            };
            let headers = req
                .headers
                .iter()
                .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).into_owned()))
                .collect();
            Some(ParsedRequest {
                method,
                path,
                version,
                headers,
            })
        }
        _ => None,
    }
}

/// Splits a `Host` header value into `(host, port)`, defaulting to port 80
/// when no `:port` suffix is present.
fn extract_host_port(host_value: &str) -> Option<(String, u16)> {
    let host_value = host_value.trim();
    if host_value.is_empty() {
        return None;
    }
    match host_value.rfind(':') {
        Some(colon_pos) => {
            let host = host_value[..colon_pos].to_string();
            let port = host_value[colon_pos + 1..].parse::<u16>().unwrap_or(80);
            Some((host, port))
        }
        None => Some((host_value.to_string(), 80)),
    }
}

/// Rewrites a parsed request for forwarding upstream: forces `Connection:
/// close`, ensures `Host` is present, and serializes `GET <path> <version>`
/// followed by the remaining headers.
pub fn rewrite_for_origin(request: &ParsedRequest, host: &str) -> Vec<u8> {
    let mut rewritten = request.clone();
    rewritten.header_set("Connection", "close");
    if rewritten.header_get("Host").is_none() {
        rewritten.header_set("Host", host);
    }

    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(b"GET ");
    buf.extend_from_slice(rewritten.path.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(rewritten.version.as_bytes());
    buf.extend_from_slice(b"\r\n");
    for (name, value) in &rewritten.headers {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"\r\n");
    buf
}

/// Cache fingerprint for `(host, port, path)`. Keying on the parsed triple
/// rather than the raw client bytes avoids conflating requests that differ
/// only in User-Agent, Accept-Language, or header order.
pub fn create_cache_key(host: &str, port: u16, path: &str) -> u64 {
    let mut buf = Vec::with_capacity(host.len() + path.len() + 8);
    buf.extend_from_slice(host.as_bytes());
    buf.push(b':');
    buf.extend_from_slice(port.to_string().as_bytes());
    buf.extend_from_slice(path.as_bytes());
    xxh64(&buf, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_get() {
        let req = parse_request(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.host_port(), Some(("example.com".to_string(), 80)));
    }

    #[test]
    fn parses_http_1_0() {
        let req = parse_request(b"GET /a HTTP/1.0\r\nHost: h\r\n\r\n").unwrap();
        assert_eq!(req.version, "HTTP/1.0");
    }

    #[test]
    fn rejects_incomplete_request() {
        assert!(parse_request(b"GET / HTTP/1.1\r\nHost: h\r\n").is_none());
        assert!(parse_request(b"").is_none());
        assert!(parse_request(b"GET").is_none());
    }

    #[test]
    fn host_header_with_port() {
        let req = parse_request(b"GET / HTTP/1.1\r\nHost: example.com:8080\r\n\r\n").unwrap();
        assert_eq!(req.host_port(), Some(("example.com".to_string(), 8080)));
    }

    #[test]
    fn host_header_case_insensitive_lookup() {
        let req = parse_request(b"GET / HTTP/1.1\r\nHOST: example.com\r\n\r\n").unwrap();
        assert_eq!(req.host_port(), Some(("example.com".to_string(), 80)));
    }

    #[test]
    fn missing_host_header() {
        let req = parse_request(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.host_port(), None);
    }

    #[test]
    fn header_set_replaces_existing() {
        let mut req = parse_request(b"GET / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n").unwrap();
        req.header_set("Connection", "close");
        assert_eq!(req.header_get("Connection"), Some("close"));
        assert_eq!(req.headers.iter().filter(|(k, _)| k == "Connection").count(), 1);
    }

    #[test]
    fn rewrite_forces_connection_close_and_host() {
        let req = parse_request(b"GET /a HTTP/1.1\r\nHost: h\r\nConnection: keep-alive\r\n\r\n").unwrap();
        let rewritten = rewrite_for_origin(&req, "h");
        let text = String::from_utf8(rewritten).unwrap();
        assert!(text.starts_with("GET /a HTTP/1.1\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(!text.contains("keep-alive"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn rewrite_is_idempotent() {
        let req = parse_request(b"GET /a HTTP/1.1\r\nHost: h\r\n\r\n").unwrap();
        let once = rewrite_for_origin(&req, "h");
        let reparsed = parse_request(&once).unwrap();
        let twice = rewrite_for_origin(&reparsed, "h");
        assert_eq!(once, twice);
    }

    #[test]
    fn cache_key_is_deterministic_and_distinguishes_inputs() {
        let k1 = create_cache_key("example.com", 80, "/a");
        let k2 = create_cache_key("example.com", 80, "/a");
        let k3 = create_cache_key("example.com", 80, "/b");
        let k4 = create_cache_key("example.com", 443, "/a");
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
        assert_ne!(k1, k4);
    }
}
