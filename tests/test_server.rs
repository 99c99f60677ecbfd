//! End-to-end tests over real sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use courier::config::{Config, ServerConfig};
use courier::handlers::{self, AppState};
use courier::server::{Shutdown, listener};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let cfg = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            poll_interval_ms: 50,
            read_timeout_ms: 1000,
            ..ServerConfig::default()
        };
        let listener = listener::bind(&cfg).unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Arc::new(handlers::router(Arc::new(AppState::new(&Config::default()))));
        let shutdown = Shutdown::new();

        let token = shutdown.clone();
        let handle = tokio::spawn(async move { listener::serve(listener, router, &cfg, token).await });

        Self { addr, shutdown, handle }
    }

    async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

struct WireResponse {
    status: u16,
    head: String,
    body: Vec<u8>,
}

impl WireResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

fn parse_wire(raw: &[u8]) -> WireResponse {
    let end = raw.windows(4).position(|w| w == b"\r\n\r\n").expect("no header terminator");
    let head = String::from_utf8(raw[..end].to_vec()).unwrap();
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    WireResponse {
        status,
        head,
        body: raw[end + 4..].to_vec(),
    }
}

async fn send_parts(addr: SocketAddr, parts: &[&[u8]]) -> WireResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        stream.write_all(part).await.unwrap();
    }

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    parse_wire(&raw)
}

async fn send(addr: SocketAddr, raw: &[u8]) -> WireResponse {
    send_parts(addr, &[raw]).await
}

#[tokio::test]
async fn test_get_health_over_socket() {
    let server = TestServer::start().await;

    let response = send(server.addr, b"GET /api/health HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert_eq!(response.status, 200);
    assert!(response.head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.header("Connection"), Some("close"));
    let declared: usize = response.header("Content-Length").unwrap().parse().unwrap();
    assert_eq!(declared, response.body.len());
    assert_eq!(response.json()["status"], "healthy");

    server.stop().await;
}

#[tokio::test]
async fn test_request_split_across_segments() {
    let server = TestServer::start().await;
    let body = br#"{"a":10,"b":5,"operation":"add"}"#;
    let head = format!(
        "POST /api/calculate HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );

    let response = send_parts(
        server.addr,
        &[&head.as_bytes()[..20], &head.as_bytes()[20..], &body[..10], &body[10..]],
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.json()["data"]["result"].as_f64(), Some(15.0));

    server.stop().await;
}

#[tokio::test]
async fn test_unroutable_requests_get_404() {
    let server = TestServer::start().await;

    for raw in [
        b"GET /nonexistent HTTP/1.1\r\n\r\n".as_slice(),
        b"DELETE / HTTP/1.1\r\n\r\n".as_slice(),
        b"GET /api/health?verbose=1 HTTP/1.1\r\n\r\n".as_slice(),
    ] {
        let response = send(server.addr, raw).await;
        assert_eq!(response.status, 404);
        assert!(response.head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    server.stop().await;
}

#[tokio::test]
async fn test_login_statuses_over_socket() {
    let server = TestServer::start().await;

    let ok = br#"{"username":"admin","password":"password"}"#;
    let raw = [
        format!("POST /api/login HTTP/1.1\r\nContent-Length: {}\r\n\r\n", ok.len()).as_bytes(),
        ok.as_slice(),
    ]
    .concat();
    assert_eq!(send(server.addr, &raw).await.status, 200);

    let bad = br#"{"username":"admin","password":"nope"}"#;
    let raw = [
        format!("POST /api/login HTTP/1.1\r\nContent-Length: {}\r\n\r\n", bad.len()).as_bytes(),
        bad.as_slice(),
    ]
    .concat();
    let response = send(server.addr, &raw).await;
    assert_eq!(response.status, 401);
    assert!(response.head.starts_with("HTTP/1.1 401 Unauthorized\r\n"));

    server.stop().await;
}

#[tokio::test]
async fn test_silent_client_does_not_break_server() {
    let server = TestServer::start().await;

    // connect and hang up without sending anything
    let stream = TcpStream::connect(server.addr).await.unwrap();
    drop(stream);

    let response = send(server.addr, b"GET / HTTP/1.1\r\n\r\n").await;
    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));

    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_connections() {
    let server = TestServer::start().await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let addr = server.addr;
        tasks.push(tokio::spawn(async move {
            send(addr, b"GET /api/users HTTP/1.1\r\n\r\n").await.status
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 200);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_stops_accept_loop() {
    let server = TestServer::start().await;
    let addr = server.addr;

    server.stop().await;

    assert!(TcpStream::connect(addr).await.is_err());
}
