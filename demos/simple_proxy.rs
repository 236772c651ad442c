/// Simple proxy example - runs the real proxy server with default bounds.
///
/// Run with: cargo run --example simple_proxy
/// Then test with: curl -x localhost:3128 http://example.com
use wgproxy::config::{MAX_CLIENTS, MAX_REQUEST_BYTES};
use wgproxy::{BlockList, Config, ProxyServer};

const PROXY_PORT: u16 = 3128;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_env_filter("wgproxy=info").init();

    println!("Simple Proxy Example");
    println!("=====================");
    println!("Starting proxy on localhost:{PROXY_PORT}");

    let config = Config {
        port: PROXY_PORT,
        block_list_path: None,
        max_clients: MAX_CLIENTS,
        max_request_bytes: MAX_REQUEST_BYTES,
    };

    let server = ProxyServer::bind(&config, BlockList::empty())
        .await
        .expect("failed to bind proxy port");
    println!("Listening on {}", server.local_addr().unwrap());
    println!("Press Ctrl+C to stop\n");

    server.run().await.expect("proxy server exited with an error");
}
