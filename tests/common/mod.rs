#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Starts a one-shot mock origin: accepts a single connection, drains the
/// request, writes back `response` verbatim, then closes. Returns the port
/// to dial and a handle to await completion.
pub async fn spawn_origin_once(response: Vec<u8>) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).await;
        let _ = stream.write_all(&response).await;
        let _ = stream.shutdown().await;
    });

    (port, handle)
}

/// Like [`spawn_origin_once`], but counts every connection accepted and
/// serves `response` to each, so a test can assert how many round trips
/// actually reached the origin (e.g. a cache hit should open zero).
pub async fn spawn_counting_origin(response: Vec<u8>) -> (u16, Arc<AtomicUsize>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();

    let handle = tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            hits_clone.fetch_add(1, Ordering::SeqCst);
            let response = response.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(&response).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (port, hits, handle)
}

/// Sends `request` over a fresh TCP connection to `port` and reads the full
/// response until the peer closes.
pub async fn send_request(port: u16, request: &[u8]) -> Vec<u8> {
    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    stream.write_all(request).await.unwrap();
    stream.shutdown().await.ok();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}
