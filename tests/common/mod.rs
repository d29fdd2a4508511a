//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use uptime_pinger::config::DeliveryConfig;

/// What a programmable backend does with one request.
pub enum Reply {
    Respond(u16, String),
    /// Write these bytes verbatim, then close.
    Raw(String),
    /// Read the request and never answer.
    Hang,
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request body and decides the reply. Every connection is
/// closed after one exchange.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(String) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_request(&mut socket).await else {
                            return;
                        };
                        match f(body) {
                            Reply::Respond(status, body) => {
                                let response = format!(
                                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                    status,
                                    reason(status),
                                    body.len(),
                                    body
                                );
                                let _ = socket.write_all(response.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            Reply::Raw(raw) => {
                                let _ = socket.write_all(raw.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            Reply::Hang => {
                                std::future::pending::<()>().await;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Delivery settings for a collector at `addr` with fast retries.
pub fn delivery_config(addr: SocketAddr, server_timeout_ms: u64) -> DeliveryConfig {
    DeliveryConfig {
        collector_url: format!("http://{}/data", addr),
        server_timeout_ms,
        min_retry_ms: 10,
        max_retry_ms: 1_000,
        retry_exp: 2.0,
    }
}

/// Read headers plus a `Content-Length` body and return the body.
async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = buf.len().min(header_end + length);
    Some(String::from_utf8_lossy(&buf[header_end..end]).into_owned())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
