//! Integration Tests for the Resource Loader
//!
//! Exercises the HTTP fetcher, single-flight coalescing, and the cached
//! loader end-to-end against a local TCP listener speaking just enough
//! HTTP/1.1 for one request/response exchange per connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{StatusCode, Url};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use rescache::{HttpFetcher, HttpLoader, LoadError, SingleFlightLoader};

// == Test Server ==

const OK_BODY: &[u8] = b"binary resource payload";

/// Serves paths under `/ok` with a 200 and a fixed body, anything else
/// with a 404. Counts requests and optionally delays each response.
async fn spawn_server(delay: Duration) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                // Read until the end of the request head
                loop {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                    if read == buf.len() {
                        return;
                    }
                }

                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;

                let (status, body): (&str, &[u8]) = if buf[..read].starts_with(b"GET /ok") {
                    ("200 OK", OK_BODY)
                } else {
                    ("404 Not Found", b"no such resource")
                };
                let head = format!(
                    "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.flush().await;
            });
        }
    });

    (addr, requests)
}

fn url(addr: SocketAddr, path: &str) -> Url {
    format!("http://{}{}", addr, path).parse().unwrap()
}

// == HTTP Fetcher Tests ==

#[tokio::test]
async fn test_fetch_returns_body_on_success() {
    let (addr, requests) = spawn_server(Duration::ZERO).await;
    let loader = SingleFlightLoader::new(HttpFetcher::default());

    let bytes = loader.fetch(&url(addr, "/ok")).await.unwrap();

    assert_eq!(bytes, Bytes::from_static(OK_BODY));
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_success_status_is_bad_response() {
    let (addr, _) = spawn_server(Duration::ZERO).await;
    let loader = SingleFlightLoader::new(HttpFetcher::default());

    let err = loader.fetch(&url(addr, "/missing")).await.unwrap_err();

    assert_eq!(err, LoadError::BadResponse(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_failure() {
    // Bind and immediately drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let loader = SingleFlightLoader::new(HttpFetcher::default());

    let err = loader.fetch(&url(addr, "/ok")).await.unwrap_err();
    assert!(matches!(err, LoadError::Transport(_)));
}

// == Cached Loader Tests ==

#[tokio::test]
async fn test_second_load_is_served_from_cache() {
    let (addr, requests) = spawn_server(Duration::ZERO).await;
    let loader = HttpLoader::with_lru(10, HttpFetcher::default());
    let resource = url(addr, "/ok");

    let first = loader.load(&resource).await.unwrap();
    let second = loader.load(&resource).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(requests.load(Ordering::SeqCst), 1);

    let stats = loader.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_concurrent_loads_share_one_request() {
    // The response delay keeps the first fetch in flight while the second
    // caller arrives, forcing it to join rather than refetch
    let (addr, requests) = spawn_server(Duration::from_millis(150)).await;
    let loader = HttpLoader::with_lru(10, HttpFetcher::default());
    let resource = url(addr, "/ok");

    let (a, b) = tokio::join!(loader.load(&resource), loader.load(&resource));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_load_leaves_cache_clean() {
    let (addr, requests) = spawn_server(Duration::ZERO).await;
    let loader = HttpLoader::with_lru(10, HttpFetcher::default());
    let resource = url(addr, "/missing");

    assert!(loader.load(&resource).await.is_err());
    assert!(loader.load(&resource).await.is_err());

    // Both attempts hit the network; the failure was never cached
    assert_eq!(requests.load(Ordering::SeqCst), 2);
    assert_eq!(loader.stats().await.entries, 0);
}

#[tokio::test]
async fn test_eviction_refetches_cold_resources() {
    let (addr, requests) = spawn_server(Duration::ZERO).await;
    let loader = HttpLoader::with_lru(1, HttpFetcher::default());
    let ok = url(addr, "/ok");
    let also_ok = url(addr, "/ok2");

    loader.load(&ok).await.unwrap();
    // A second distinct URL pushes the first out of the one-slot cache
    loader.load(&also_ok).await.unwrap();
    loader.load(&ok).await.unwrap();

    assert_eq!(requests.load(Ordering::SeqCst), 3);
}
