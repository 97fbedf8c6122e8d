use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, timeout, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;
use vanity_logging::{vanity_debug, vanity_info, vanity_warn};
use vanity_protocol::{ClientEvent, ServerEvent};

use crate::download::EventSink;
use crate::socketio::{decode_frame, encode_event, Frame, CONNECT_PACKET, PONG_PACKET};
use crate::EngineEvent;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    /// Used until the server's open packet announces its own heartbeat.
    pub heartbeat_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            heartbeat_timeout: Duration::from_secs(45),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server url {0} must use http, https, ws or wss")]
    UnsupportedScheme(String),
    #[error("connecting to {url} timed out")]
    ConnectTimeout { url: String },
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("handshake failed: {0}")]
    Handshake(String),
}

/// Builds the Engine.IO WebSocket endpoint for a backend base url.
pub fn socket_url(server_url: &Url) -> Result<Url, TransportError> {
    let scheme = match server_url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(TransportError::UnsupportedScheme(server_url.to_string())),
    };
    let mut url = server_url.clone();
    url.set_scheme(scheme)
        .map_err(|_| TransportError::UnsupportedScheme(server_url.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| TransportError::UnsupportedScheme(server_url.to_string()))?
        .pop_if_empty()
        .push("socket.io")
        .push("");
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

/// Runs one connection to the backend until either side closes it.
///
/// Inbound events are forwarded to `sink` in the order they arrive.
/// `ServerEvent::Disconnect` is emitted when an established namespace
/// connection ends. Events queued before the namespace is connected are held
/// and sent once it is. Returns when the socket closes or `commands` is
/// dropped; there is no reconnection.
pub async fn run_session(
    server_url: &Url,
    settings: &TransportSettings,
    mut commands: mpsc::UnboundedReceiver<ClientEvent>,
    sink: &dyn EventSink,
) -> Result<(), TransportError> {
    let url = socket_url(server_url)?;
    vanity_info!("Connecting to {}", url);
    let (mut socket, _) = timeout(settings.connect_timeout, connect_async(url.as_str()))
        .await
        .map_err(|_| TransportError::ConnectTimeout {
            url: url.to_string(),
        })??;

    let heartbeat = await_open(&mut socket, settings).await?;
    socket.send(Message::Text(CONNECT_PACKET.to_string())).await?;

    let mut connected = false;
    let mut queued: Vec<ClientEvent> = Vec::new();
    let mut deadline = Instant::now() + heartbeat;

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(event) if connected => send_event(&mut socket, &event, sink).await?,
                    Some(event) => queued.push(event),
                    None => {
                        vanity_debug!("Command channel closed; closing socket");
                        let _ = socket.close(None).await;
                        break;
                    }
                }
            }
            incoming = socket.next() => {
                deadline = Instant::now() + heartbeat;
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match decode_frame(&text) {
                            Ok(Frame::Ping) => {
                                socket.send(Message::Text(PONG_PACKET.to_string())).await?;
                            }
                            Ok(Frame::Connected) => {
                                connected = true;
                                sink.emit(EngineEvent::Server(ServerEvent::Connect));
                                for event in queued.drain(..) {
                                    send_event(&mut socket, &event, sink).await?;
                                }
                            }
                            Ok(Frame::Event { name, payload }) => forward_event(&name, payload, sink),
                            Ok(Frame::Close) | Ok(Frame::Disconnected) => {
                                vanity_info!("Server closed the session");
                                break;
                            }
                            Ok(Frame::ConnectError(message)) => {
                                sink.emit(EngineEvent::TransportError(format!(
                                    "server refused connection: {message}"
                                )));
                                break;
                            }
                            Ok(Frame::Open(_)) | Ok(Frame::Pong) | Ok(Frame::Noop) => {}
                            Err(err) => {
                                vanity_warn!("Dropping undecodable frame {:?}: {}", text, err);
                                sink.emit(EngineEvent::TransportError(err.to_string()));
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        vanity_warn!("WebSocket read failed: {}", err);
                        break;
                    }
                }
            }
            _ = sleep_until(deadline) => {
                vanity_warn!("No heartbeat from server within {:?}", heartbeat);
                break;
            }
        }
    }

    if connected {
        sink.emit(EngineEvent::Server(ServerEvent::Disconnect));
    }
    Ok(())
}

async fn await_open(
    socket: &mut Socket,
    settings: &TransportSettings,
) -> Result<Duration, TransportError> {
    let first = timeout(settings.connect_timeout, socket.next())
        .await
        .map_err(|_| TransportError::Handshake("no open packet".to_string()))?;
    match first {
        Some(Ok(Message::Text(text))) => match decode_frame(&text) {
            Ok(Frame::Open(open)) => {
                vanity_debug!("Engine.IO session {} opened", open.sid);
                if open.ping_interval == 0 {
                    Ok(settings.heartbeat_timeout)
                } else {
                    Ok(Duration::from_millis(open.ping_interval + open.ping_timeout))
                }
            }
            Ok(other) => Err(TransportError::Handshake(format!(
                "expected open packet, got {other:?}"
            ))),
            Err(err) => Err(TransportError::Handshake(err.to_string())),
        },
        Some(Ok(other)) => Err(TransportError::Handshake(format!(
            "expected text frame, got {other:?}"
        ))),
        Some(Err(err)) => Err(TransportError::WebSocket(err)),
        None => Err(TransportError::Handshake("socket closed".to_string())),
    }
}

async fn send_event(
    socket: &mut Socket,
    event: &ClientEvent,
    sink: &dyn EventSink,
) -> Result<(), TransportError> {
    match encode_event(event) {
        Ok(text) => {
            vanity_debug!("Sending {}", event.name());
            socket.send(Message::Text(text)).await?;
        }
        Err(err) => {
            sink.emit(EngineEvent::TransportError(format!(
                "could not encode {}: {err}",
                event.name()
            )));
        }
    }
    Ok(())
}

fn forward_event(name: &str, payload: Option<serde_json::Value>, sink: &dyn EventSink) {
    match ServerEvent::from_named(name, payload) {
        Ok(Some(event)) => sink.emit(EngineEvent::Server(event)),
        Ok(None) => vanity_debug!("Ignoring unhandled event {}", name),
        Err(err) => {
            vanity_warn!("Malformed {} payload: {}", name, err);
            sink.emit(EngineEvent::TransportError(format!(
                "malformed {name} payload: {err}"
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_url_switches_scheme_and_appends_engine_path() {
        let url = socket_url(&Url::parse("http://127.0.0.1:5000").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket"
        );

        let url = socket_url(&Url::parse("https://example.com/gen/").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://example.com/gen/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn socket_url_rejects_other_schemes() {
        let err = socket_url(&Url::parse("ftp://example.com").unwrap()).unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedScheme(_)));
    }
}
