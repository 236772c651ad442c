use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Status codes the responder knows how to render. Anything else is an
/// internal bug and gets rejected by `render`.
const KNOWN_CODES: &[(u16, &str, &str)] = &[
    (400, "Bad Request", "<BODY><H1>400 Bad Request</H1>\n</BODY>"),
    (
        403,
        "Forbidden",
        "<BODY><H1>403 Forbidden</H1><br>Permission Denied\n</BODY>",
    ),
    (404, "Not Found", "<BODY><H1>404 Not Found</H1>\n</BODY>"),
    (
        500,
        "Internal Server Error",
        "<BODY><H1>500 Internal Server Error</H1>\n</BODY>",
    ),
    (
        501,
        "Not Implemented",
        "<BODY><H1>501 Not Implemented</H1>\n</BODY>",
    ),
    (
        505,
        "HTTP Version Not Supported",
        "<BODY><H1>505 HTTP Version Not Supported</H1>\n</BODY>",
    ),
];

/// Builds the fixed error response body for `status_code`, or `None` if the
/// code isn't one of the six the proxy ever sends.
pub fn render(status_code: u16) -> Option<String> {
    let (_, reason, body) = KNOWN_CODES.iter().find(|(code, _, _)| *code == status_code)?;
    let title = format!("{status_code} {reason}");
    let html = format!("<HTML><HEAD><TITLE>{title}</TITLE></HEAD>\n{body}</HTML>");
    let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

    Some(format!(
        "HTTP/1.1 {status_code} {reason}\r\n\
         Content-Length: {len}\r\n\
         Content-Type: text/html\r\n\
         Connection: keep-alive\r\n\
         Date: {date}\r\n\
         Server: TheOklama\r\n\
         \r\n\
         {html}",
        len = html.len(),
    ))
}

/// Writes a fixed error response to `client`. Returns `false` for an
/// unrecognized status code without writing anything.
pub async fn send(client: &mut TcpStream, status_code: u16) -> bool {
    match render(status_code) {
        Some(body) => client.write_all(body.as_bytes()).await.is_ok(),
        None => false,
    }
}
