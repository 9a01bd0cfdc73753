//! End-to-end checks over a real socket: routing and body decoding, which
//! handler-level tests cannot see.

use compute_server::{ServerConfig, start_server};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn request(addr: SocketAddr, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let raw = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        workers: 2,
        quiet: true,
        ..ServerConfig::default()
    }
}

#[tokio::test]
async fn serves_routes_over_tcp() {
    let server = start_server(test_config()).await.unwrap();
    let addr = server.local_addr;

    let health = request(addr, "GET", "/healthz", "").await;
    assert!(health.starts_with("HTTP/1.1 200"), "{}", health);
    assert!(health.contains(r#""status":"ok""#));
    assert!(health.contains(r#""workers":2"#));

    let factorial = request(addr, "POST", "/api/factorial", r#"{"n": 20}"#).await;
    assert!(factorial.starts_with("HTTP/1.1 200"), "{}", factorial);
    assert!(factorial.contains(r#""value":"2432902008176640000""#));

    let matrix = request(
        addr,
        "POST",
        "/api/matrix_multiply",
        r#"{"matrixA": [[1, 2], [3]], "matrixB": [[1], [1]]}"#,
    )
    .await;
    assert!(matrix.starts_with("HTTP/1.1 422"), "{}", matrix);
    assert!(matrix.contains(r#""errorKind":"MalformedMatrix""#));

    server.handle.abort();
}

#[tokio::test]
async fn malformed_body_is_invalid_input() {
    let server = start_server(test_config()).await.unwrap();
    let addr = server.local_addr;

    let garbage = request(addr, "POST", "/api/sort", "{not json").await;
    assert!(garbage.starts_with("HTTP/1.1 400"), "{}", garbage);
    assert!(garbage.contains(r#""errorKind":"InvalidInput""#));

    let missing_field = request(addr, "POST", "/api/factorial", r#"{"m": 3}"#).await;
    assert!(missing_field.starts_with("HTTP/1.1 400"), "{}", missing_field);

    server.handle.abort();
}
