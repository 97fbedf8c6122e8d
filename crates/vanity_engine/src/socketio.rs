//! Text framing for Socket.IO v5 over Engine.IO v4 on a WebSocket.
//!
//! Only the packets a plain event client needs are understood: the Engine.IO
//! open/close/ping/pong/noop/message packets, and inside `message` the
//! Socket.IO connect, disconnect, event and connect-error packets on the
//! default namespace. Binary attachments are rejected.
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use vanity_protocol::ClientEvent;

/// Socket.IO connect request for the default namespace.
pub const CONNECT_PACKET: &str = "40";
/// Engine.IO reply to a heartbeat ping.
pub const PONG_PACKET: &str = "3";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type {0:?}")]
    UnknownPacket(char),
    #[error("binary packets are not supported")]
    Binary,
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine.IO open packet payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Open(OpenHandshake),
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace connect acknowledged.
    Connected,
    /// Server closed the namespace.
    Disconnected,
    Event {
        name: String,
        payload: Option<Value>,
    },
    ConnectError(String),
}

pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let rest = chars.as_str();
    match kind {
        '0' => Ok(Frame::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Frame::Close),
        // "2probe" is only used during transport upgrade; treat it as a ping.
        '2' => Ok(Frame::Ping),
        '3' => Ok(Frame::Pong),
        '4' => decode_message(rest),
        '6' => Ok(Frame::Noop),
        other => Err(CodecError::UnknownPacket(other)),
    }
}

fn decode_message(text: &str) -> Result<Frame, CodecError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let body = strip_ack_id(strip_namespace(chars.as_str()));
    match kind {
        '0' => Ok(Frame::Connected),
        '1' => Ok(Frame::Disconnected),
        '2' => decode_event(body),
        // Acks for events we never request; nothing to deliver.
        '3' => Ok(Frame::Noop),
        '4' => Ok(Frame::ConnectError(connect_error_message(body))),
        '5' | '6' => Err(CodecError::Binary),
        other => Err(CodecError::UnknownPacket(other)),
    }
}

fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(comma) => &body[comma + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_event(body: &str) -> Result<Frame, CodecError> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Array(mut items) = value else {
        return Err(CodecError::MalformedEvent("expected an array".to_string()));
    };
    if items.is_empty() {
        return Err(CodecError::MalformedEvent("missing event name".to_string()));
    }
    let name = match items.remove(0) {
        Value::String(name) => name,
        other => {
            return Err(CodecError::MalformedEvent(format!(
                "event name is not a string: {other}"
            )))
        }
    };
    let payload = if items.is_empty() {
        None
    } else {
        Some(items.remove(0))
    };
    Ok(Frame::Event { name, payload })
}

fn connect_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| body.to_string()),
        Ok(Value::String(message)) => message,
        _ => body.to_string(),
    }
}

/// Encodes an outbound event as `42["name",payload]`.
pub fn encode_event(event: &ClientEvent) -> Result<String, CodecError> {
    let frame = Value::Array(vec![
        Value::String(event.name().to_string()),
        event.payload()?,
    ]);
    Ok(format!("42{}", serde_json::to_string(&frame)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vanity_protocol::TaskId;

    #[test]
    fn decodes_open_handshake() {
        let frame = decode_frame(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            Frame::Open(OpenHandshake {
                sid: "abc".to_string(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn decodes_heartbeat_and_namespace_packets() {
        assert_eq!(decode_frame("2").unwrap(), Frame::Ping);
        assert_eq!(decode_frame("3").unwrap(), Frame::Pong);
        assert_eq!(decode_frame("6").unwrap(), Frame::Noop);
        assert_eq!(decode_frame(r#"40{"sid":"xyz"}"#).unwrap(), Frame::Connected);
        assert_eq!(decode_frame("41").unwrap(), Frame::Disconnected);
    }

    #[test]
    fn decodes_event_with_payload() {
        let frame = decode_frame(r#"42["task_started",{"task_id":"task_1"}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Event {
                name: "task_started".to_string(),
                payload: Some(json!({ "task_id": "task_1" })),
            }
        );
    }

    #[test]
    fn decodes_event_with_namespace_and_ack_id() {
        let frame = decode_frame(r#"42/admin,17["generation_output",{"output":"x"}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Event {
                name: "generation_output".to_string(),
                payload: Some(json!({ "output": "x" })),
            }
        );
    }

    #[test]
    fn connect_error_carries_message() {
        let frame = decode_frame(r#"44{"message":"Not authorized"}"#).unwrap();
        assert_eq!(frame, Frame::ConnectError("Not authorized".to_string()));
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(matches!(decode_frame(""), Err(CodecError::Empty)));
        assert!(matches!(decode_frame("9"), Err(CodecError::UnknownPacket('9'))));
        assert!(matches!(decode_frame("42{}"), Err(CodecError::MalformedEvent(_))));
        assert!(matches!(decode_frame("42[1]"), Err(CodecError::MalformedEvent(_))));
        assert!(matches!(decode_frame("42[oops"), Err(CodecError::Json(_))));
        assert!(matches!(decode_frame("451-[\"x\"]"), Err(CodecError::Binary)));
    }

    #[test]
    fn encodes_stop_task_event() {
        let text = encode_event(&ClientEvent::StopTask {
            task_id: TaskId::new("task_9"),
        })
        .unwrap();
        assert_eq!(text, r#"42["stop_task",{"task_id":"task_9"}]"#);
    }
}
