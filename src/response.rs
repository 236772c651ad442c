/// A parsed origin response: status line reconstructed as sent, headers in
/// arrival order, and the body slice borrowed from the capture buffer.
pub struct ParsedResponse<'a> {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: &'a [u8],
}

impl ParsedResponse<'_> {
    pub fn header_get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parses a captured origin response. Returns `None` if `httparse` can't
/// find a complete status line and header block.
pub fn parse_response(data: &[u8]) -> Option<ParsedResponse<'_>> {
    let mut raw_headers = [httparse::EMPTY_HEADER; 64];
    let mut response = httparse::Response::new(&mut raw_headers);

    match response.parse(data) {
        Ok(httparse::Status::Complete(header_len)) => {
            let status = response.code?;
            let status_line = format!("HTTP/1.1 {} {}\r\n", status, response.reason.unwrap_or(""));
            let headers = response
                .headers
                .iter()
                .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).into_owned()))
                .collect();
            Some(ParsedResponse {
                status_line,
                headers,
                body: &data[header_len..],
            })
        }
        _ => None,
    }
}

/// Whether a response is eligible for caching at all. Per spec, GET
/// responses are cached unconditionally on success; the only opt-out this
/// implementation honors is an explicit `Cache-Control: no-cache` or
/// `no-store` from the origin (non-goals exclude conditional revalidation,
/// not a same-request opt-out).
pub fn is_cacheable(method: &str, headers: &[(String, String)]) -> bool {
    if method != "GET" {
        return false;
    }
    for (name, value) in headers {
        if !name.eq_ignore_ascii_case("cache-control") {
            continue;
        }
        let lower = value.to_lowercase();
        if lower.contains("no-cache") || lower.contains("no-store") {
            return false;
        }
    }
    true
}

/// Default TTL applied when the origin sends no `Cache-Control: max-age`.
pub const DEFAULT_TTL_SECS: u64 = 3600;
/// Upper bound on any TTL, regardless of what the origin requests.
pub const MAX_TTL_SECS: u64 = 86_400;

/// Reads `max-age` out of a `Cache-Control` header, capped at 24 hours and
/// falling back to [`DEFAULT_TTL_SECS`] when absent or unparseable.
pub fn calculate_ttl(headers: &[(String, String)]) -> u64 {
    for (name, value) in headers {
        if !name.eq_ignore_ascii_case("cache-control") {
            continue;
        }
        let lower = value.to_lowercase();
        if let Some(pos) = lower.find("max-age=") {
            let rest = &lower[pos + "max-age=".len()..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(seconds) = digits.parse::<u64>() {
                return seconds.min(MAX_TTL_SECS);
            }
        }
    }
    DEFAULT_TTL_SECS
}
