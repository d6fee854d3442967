//! TCP transport and controller over a loopback socket

mod common;

use common::*;
use parking_lot::Mutex;
use puzzlebot_communication::{
    LineHandler, MotionController, MotionTimeouts, TcpConnectionInfo, TcpTransport, Transport,
};
use puzzlebot_core::{ConnectionError, Coord, MachineStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Default)]
struct Recorder {
    lines: Mutex<Vec<String>>,
    lost: Mutex<Vec<ConnectionError>>,
}

impl LineHandler for Recorder {
    fn on_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }

    fn on_connection_lost(&self, error: ConnectionError) {
        self.lost.lock().push(error);
    }
}

async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

#[tokio::test]
async fn test_transport_delivers_lines_and_reports_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = String::new();
        BufReader::new(&mut socket)
            .read_line(&mut received)
            .await
            .unwrap();
        socket
            .write_all(b"first\n\n   \r\n  second  \r\n")
            .await
            .unwrap();
        received
    });

    let recorder = Arc::new(Recorder::default());
    let transport = TcpTransport::connect(&TcpConnectionInfo::new("127.0.0.1", port), recorder.clone())
        .await
        .unwrap();
    assert!(transport.is_connected());
    assert_eq!(transport.address(), format!("127.0.0.1:{}", port));

    transport.write_line(STATUS_REQUEST).await.unwrap();
    assert_eq!(server.await.unwrap(), format!("{}\n", STATUS_REQUEST));

    assert!(eventually(|| !recorder.lost.lock().is_empty()).await);
    assert_eq!(
        *recorder.lines.lock(),
        vec!["first".to_string(), "second".to_string()]
    );
    assert_eq!(recorder.lost.lock().len(), 1);
    assert!(!transport.is_connected());

    let err = transport.write_line("M5").await.unwrap_err();
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn test_shutdown_stops_writes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move { listener.accept().await.unwrap().0 });

    let transport = TcpTransport::connect(
        &TcpConnectionInfo::new("127.0.0.1", port),
        Arc::new(Recorder::default()),
    )
    .await
    .unwrap();
    let _socket = server.await.unwrap();
    transport.write_line(STATUS_REQUEST).await.unwrap();

    transport.shutdown();
    assert!(!transport.is_connected());
    let err = transport.write_line("M5").await.unwrap_err();
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = TcpTransport::connect(
        &TcpConnectionInfo::new("127.0.0.1", port),
        Arc::new(Recorder::default()),
    )
    .await
    .err()
    .unwrap();
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn test_connect_rejects_invalid_parameters() {
    let err = TcpTransport::connect(
        &TcpConnectionInfo::new("127.0.0.1", 0),
        Arc::new(Recorder::default()),
    )
    .await
    .err()
    .unwrap();
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn test_controller_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line == STATUS_REQUEST {
                let reply = format!(
                    "{{\"r\":{},\"f\":[1,0,10]}}\n",
                    status_line(1, Coord::new(1.0, 2.0, -3.0, 4.0))
                );
                if write_half.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
        }
    });

    let controller = MotionController::connect(
        &TcpConnectionInfo::new("127.0.0.1", port),
        identity(),
        MotionTimeouts::default(),
    )
    .await
    .unwrap();

    assert!(eventually(|| controller.status() == MachineStatus::Ready).await);
    assert_eq!(controller.position(), Coord::new(1.0, 2.0, -3.0, 4.0));
    assert!(controller.snapshot().connection_lost.is_none());
}
