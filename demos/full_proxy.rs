/// Full proxy server example - runs the complete HTTP caching proxy,
/// including origin forwarding, LRU eviction, and gzip/deflate decoding.
///
/// Run with: cargo run --example full_proxy -- 8888
/// Test with: curl -x localhost:8888 http://httpbin.org/get
use wgproxy::{run, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("wgproxy=info,full_proxy=info")
        .init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: full_proxy <port> [--block-list <path>]");
            std::process::exit(1);
        }
    };

    println!("Full Proxy Example");
    println!("===================");
    println!("Starting proxy server on port {}", config.port);
    println!();
    println!("Test commands:");
    println!("  curl -x localhost:{} http://httpbin.org/get", config.port);
    println!("  curl -x localhost:{} http://example.com", config.port);
    println!();
    println!("Press Ctrl+C to stop\n");

    if let Err(err) = run(config).await {
        eprintln!("proxy exited with an error: {err}");
        std::process::exit(1);
    }
}
