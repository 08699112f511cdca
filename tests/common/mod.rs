//! Shared utilities for integration testing.

use std::future::pending;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use bandwidth_hero_proxy::config::ProxyConfig;
use bandwidth_hero_proxy::http::HttpServer;

/// Canned reply for a mock origin server.
#[derive(Clone)]
pub struct OriginReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl OriginReply {
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: vec![("content-type".into(), content_type.into())],
            body,
        }
    }
}

/// Handle to a running mock origin.
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
    request_heads: Arc<Mutex<Vec<String>>>,
}

impl MockOrigin {
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request heads (start line + headers) seen so far.
    pub fn request_heads(&self) -> Vec<String> {
        self.request_heads.lock().unwrap().clone()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a mock origin that answers every request with the given reply.
pub async fn start_origin(reply: OriginReply) -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let request_heads = Arc::new(Mutex::new(Vec::new()));

    let origin = MockOrigin {
        addr,
        hits: hits.clone(),
        request_heads: request_heads.clone(),
    };

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let reply = reply.clone();
            let hits = hits.clone();
            let request_heads = request_heads.clone();
            tokio::spawn(async move {
                // GET requests only: read until the end of the head.
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                hits.fetch_add(1, Ordering::SeqCst);
                request_heads
                    .lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&head).into_owned());

                let status_text = match reply.status {
                    200 => "200 OK",
                    204 => "204 No Content",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    _ => "200 OK",
                };
                let mut response = format!("HTTP/1.1 {status_text}\r\n");
                for (name, value) in &reply.headers {
                    response.push_str(&format!("{name}: {value}\r\n"));
                }
                response.push_str(&format!(
                    "content-length: {}\r\nconnection: close\r\n\r\n",
                    reply.body.len()
                ));
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(&reply.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    origin
}

/// Start the proxy with the given config on an ephemeral port.
pub async fn spawn_proxy(config: ProxyConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, pending()).await;
    });
    addr
}

/// Deterministic noisy PNG bytes; noise keeps the file from collapsing to a
/// few bytes so size thresholds are actually exercised.
pub fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x.wrapping_mul(31) ^ y.wrapping_mul(17)) as u8,
            (x.wrapping_add(y).wrapping_mul(53)) as u8,
            (x ^ y) as u8,
        ])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

/// Client that never follows redirects, so 302s can be asserted directly.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
