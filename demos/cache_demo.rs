/// Cache demonstration - shows cache operations and TTL handling
///
/// Run with: cargo run --example cache_demo
use bytes::Bytes;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wgproxy::cache::{CACHE_CAPACITY, MAX_CACHE_BYTES, MAX_ENTRY_BYTES};
use wgproxy::response::DEFAULT_TTL_SECS;
use wgproxy::{calculate_ttl, create_cache_key, is_cacheable, CachedResponse, ProxyCache};

fn header(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Cache Demonstration");
    println!("====================");

    println!("\nCache Configuration:");
    println!("   Max entries: {CACHE_CAPACITY}");
    println!("   Max total size: {} MB", MAX_CACHE_BYTES / 1_048_576);
    println!("   Max entry size: {} MB", MAX_ENTRY_BYTES / 1_048_576);
    println!("   Default TTL: {DEFAULT_TTL_SECS} seconds");

    let cache = ProxyCache::new();

    println!("\nCacheability Tests:");
    test_cacheability();

    println!("\nTTL Calculation:");
    test_ttl_calculation();

    println!("\nCache Operations:");
    test_cache_operations(&cache).await;

    println!("\nCache Expiration:");
    test_cache_expiration(&cache).await;

    println!("\nSize Limits:");
    test_size_limits(&cache).await;

    println!("\nAll demonstrations completed!");
}

fn test_cacheability() {
    let tests: Vec<(&str, Vec<(String, String)>, bool, &str)> = vec![
        ("GET", vec![], true, "plain GET is cacheable"),
        (
            "POST",
            vec![],
            false,
            "POST requests not cacheable",
        ),
        (
            "GET",
            vec![header("Cache-Control", "no-cache")],
            false,
            "no-cache respected",
        ),
        (
            "GET",
            vec![header("Cache-Control", "no-store")],
            false,
            "no-store respected",
        ),
        (
            "GET",
            vec![header("Cache-Control", "max-age=300")],
            true,
            "max-age allows caching",
        ),
    ];

    for (method, headers, expected, reason) in tests {
        let result = is_cacheable(method, &headers);
        let status = if result == expected { "ok" } else { "FAIL" };
        println!("   [{status}] {method} -> {result} ({reason})");
    }
}

fn test_ttl_calculation() {
    let tests: Vec<(Vec<(String, String)>, u64, &str)> = vec![
        (vec![], DEFAULT_TTL_SECS, "default TTL when no headers"),
        (
            vec![header("Cache-Control", "max-age=300")],
            300,
            "5 minutes from max-age",
        ),
        (
            vec![header("Cache-Control", "max-age=7200")],
            7200,
            "2 hours from max-age",
        ),
        (
            vec![header("Cache-Control", "max-age=100000")],
            86400,
            "capped at 24 hours",
        ),
    ];

    for (headers, expected, description) in tests {
        let ttl = calculate_ttl(&headers);
        let status = if ttl == expected { "ok" } else { "FAIL" };
        println!("   [{status}] TTL: {ttl}s - {description}");
    }
}

async fn test_cache_operations(cache: &ProxyCache) {
    for i in 0..5 {
        let key = create_cache_key(&format!("site{i}.com"), 80, "/page");
        let response = CachedResponse {
            status_line: format!("HTTP/1.1 200 OK {i}\r\n"),
            headers: vec!["Content-Type: text/html".to_string()],
            body: Bytes::from(format!("Content {i}")),
            expires: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600,
        };

        if cache.insert(key, response).await {
            println!("   added entry {i} to cache");
        }
    }

    println!("   cache now has {} entries", cache.len().await);
    println!("   total size: {} bytes", cache.total_bytes());

    let test_key = create_cache_key("site2.com", 80, "/page");
    if let Some(cached) = cache.lookup(test_key).await {
        println!("   retrieved: {}", cached.status_line.trim());
    }

    cache.clear().await;
    println!("   cache cleared - now has {} entries", cache.len().await);
}

async fn test_cache_expiration(cache: &ProxyCache) {
    let key = create_cache_key("expire.com", 80, "/test");
    let response = CachedResponse {
        status_line: "HTTP/1.1 200 OK\r\n".to_string(),
        headers: vec![],
        body: Bytes::from("will expire soon"),
        expires: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 1,
    };

    cache.insert(key, response).await;
    println!("   added entry with 1 second TTL");

    if cache.lookup(key).await.is_some() {
        println!("   entry retrievable immediately");
    }

    tokio::time::sleep(Duration::from_secs(2)).await;

    if cache.lookup(key).await.is_none() {
        println!("   entry correctly expired after TTL");
    }
}

async fn test_size_limits(cache: &ProxyCache) {
    let key = create_cache_key("large.com", 80, "/huge");
    let oversized = CachedResponse {
        status_line: "HTTP/1.1 200 OK\r\n".to_string(),
        headers: vec![],
        body: Bytes::from(vec![0u8; cache.max_entry_bytes() + 1]),
        expires: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600,
    };

    if !cache.insert(key, oversized).await {
        println!(
            "   correctly rejected oversized entry (>{} MB)",
            cache.max_entry_bytes() / 1_048_576
        );
    }

    let normal = CachedResponse {
        status_line: "HTTP/1.1 200 OK\r\n".to_string(),
        headers: vec![],
        body: Bytes::from(vec![0u8; 1024]),
        expires: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600,
    };

    if cache.insert(key, normal).await {
        println!("   accepted normal-sized entry (1 KB)");
    }
}
