use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use vanity_engine::{EngineConfig, EngineEvent, EngineHandle};
use vanity_protocol::{ClientEvent, ConnectionRequest, ServerEvent};

fn next_event(handle: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match handle.recv_timeout(remaining) {
            Ok(EngineEvent::DownloadProgress { .. }) => continue,
            Ok(event) => return event,
            Err(err) => panic!("no engine event: {err}"),
        }
    }
}

#[test]
fn engine_relays_requests_and_replies() {
    let server_rt = tokio::runtime::Runtime::new().unwrap();
    let listener = server_rt
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let server = server_rt.spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"0{"sid":"s","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#.to_string(),
        ))
        .await
        .unwrap();
        let mut received = Vec::new();
        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            if text == "40" {
                ws.send(Message::Text("40".to_string())).await.unwrap();
            } else if text.starts_with("42") {
                received.push(text);
                ws.send(Message::Text(
                    r#"42["connection_result",{"success":false,"message":"Authentication failed."}]"#
                        .to_string(),
                ))
                .await
                .unwrap();
            }
        }
        received
    });

    let temp = TempDir::new().unwrap();
    let config = EngineConfig::new(
        Url::parse(&format!("http://{addr}")).unwrap(),
        temp.path().to_path_buf(),
    );
    let handle = EngineHandle::new(config).expect("engine starts");

    assert_eq!(next_event(&handle), EngineEvent::Server(ServerEvent::Connect));

    handle.emit(ClientEvent::TestConnection(ConnectionRequest {
        host: "1.2.3.4".to_string(),
        port: 22,
        username: "root".to_string(),
        password: "pw".to_string(),
    }));
    match next_event(&handle) {
        EngineEvent::Server(ServerEvent::ConnectionResult(result)) => {
            assert!(!result.success);
            assert_eq!(result.message.as_deref(), Some("Authentication failed."));
        }
        other => panic!("unexpected event {other:?}"),
    }

    drop(handle);
    let received = server_rt.block_on(server).unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].starts_with(r#"42["test_connection","#));
}

#[test]
fn download_failure_is_reported_as_completion() {
    let temp = TempDir::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = EngineConfig::new(
        Url::parse(&format!("http://{addr}")).unwrap(),
        temp.path().to_path_buf(),
    );
    let handle = EngineHandle::new(config).expect("engine starts");
    handle.download("wallets_task_1.txt");

    loop {
        match next_event(&handle) {
            // The socket session fails too; it may arrive before or after.
            EngineEvent::TransportError(_) => continue,
            EngineEvent::DownloadCompleted {
                result_file,
                result,
            } => {
                assert_eq!(result_file, "wallets_task_1.txt");
                assert!(result.is_err());
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
