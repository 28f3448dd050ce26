//! The serial console over a real TCP connection.

use std::time::Duration;

use std::io;

use rfmodem_runner::{HaltReason, NodeConfig, NodeSession, UartServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Five ticks of guard window keeps the test fast.
const NODE: &str = r#"
identity:
  node_id: 12
modem:
  escape_guard_ticks: 5
uart:
  bind: "127.0.0.1"
  port: 0
"#;

const GUARD: Duration = Duration::from_millis(200);

async fn start() -> TcpStream {
    start_with_handle().await.0
}

async fn start_with_handle() -> (TcpStream, JoinHandle<io::Result<HaltReason>>) {
    let config = NodeConfig::from_yaml(NODE).expect("valid node config");
    let session = NodeSession::from_config(&config).expect("valid board");
    let server = UartServer::bind(&config.uart, session)
        .await
        .expect("bind succeeds");
    let addr = server.local_addr().expect("bound address");
    let handle = tokio::spawn(server.run());
    let stream = TcpStream::connect(addr).await.expect("connect succeeds");
    (stream, handle)
}

/// Read until `needle` shows up or the deadline passes.
async fn read_until(stream: &mut TcpStream, needle: &str) -> String {
    let mut received = String::new();
    let mut buf = [0u8; 256];
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !received.contains(needle) {
        let n = tokio::time::timeout_at(deadline, stream.read(&mut buf))
            .await
            .expect("reply before deadline")
            .expect("read succeeds");
        assert!(n > 0, "server closed the connection");
        received.push_str(&String::from_utf8_lossy(&buf[..n]));
    }
    received
}

#[tokio::test]
async fn test_escape_and_query_over_tcp() {
    let mut stream = start().await;

    tokio::time::sleep(GUARD).await;
    stream.write_all(b"+++").await.expect("write succeeds");
    let received = read_until(&mut stream, "[12] OK\n").await;
    assert_eq!(received, "[12] OK\n");

    stream.write_all(b"ati1\r").await.expect("write succeeds");
    let received = read_until(&mut stream, "[12] 1.0\n").await;
    assert_eq!(received, "ATI1\n[12] 1.0\n");
}

#[tokio::test]
async fn test_data_mode_sends_nothing_back() {
    let mut stream = start().await;
    stream.write_all(b"hello radio\r").await.expect("write succeeds");

    let mut buf = [0u8; 64];
    let result = tokio::time::timeout(GUARD, stream.read(&mut buf)).await;
    assert!(result.is_err(), "no reply expected in data mode");
}

#[tokio::test]
async fn test_reset_flushes_echo_then_stops() {
    let (mut stream, server) = start_with_handle().await;

    tokio::time::sleep(GUARD).await;
    stream.write_all(b"+++").await.expect("write succeeds");
    read_until(&mut stream, "[12] OK\n").await;

    stream.write_all(b"ATZ\r").await.expect("write succeeds");
    assert_eq!(read_until(&mut stream, "ATZ\n").await, "ATZ\n");

    let reason = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server stops")
        .expect("server task completes")
        .expect("no IO error");
    assert_eq!(reason, HaltReason::Reset);

    let mut buf = [0u8; 16];
    let n = stream.read(&mut buf).await.unwrap_or(0);
    assert_eq!(n, 0, "connection closed after reset");
}
