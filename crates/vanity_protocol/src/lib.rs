//! Wire types exchanged with the generation backend over the real-time channel.
//!
//! Every event travels as a named event with a JSON payload. Both directions
//! are closed enums so handlers match exhaustively on payload shape.
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier of one backend-side generation run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub prefix: String,
    pub suffix: String,
    pub contains: String,
    pub case_sensitive: bool,
    pub wallet_count: u32,
    pub cpu_cores: u32,
}

/// Reply to `test_connection`. Only `success` is guaranteed; the machine
/// details are present on success.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ConnectionResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cpu_cores: Option<u32>,
    #[serde(default)]
    pub memory_gb: Option<f64>,
    #[serde(default)]
    pub python_version: Option<String>,
    #[serde(default)]
    pub os_info: Option<String>,
}

/// Messages the client sends to the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    TestConnection(ConnectionRequest),
    StartGeneration(GenerationRequest),
    StopTask { task_id: TaskId },
}

impl ClientEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::TestConnection(_) => "test_connection",
            ClientEvent::StartGeneration(_) => "start_generation",
            ClientEvent::StopTask { .. } => "stop_task",
        }
    }

    /// JSON payload without the event name.
    pub fn payload(&self) -> serde_json::Result<Value> {
        let mut tagged = serde_json::to_value(self)?;
        Ok(tagged
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }
}

/// Messages the backend (or the transport itself) delivers to the client.
///
/// `Connect` and `Disconnect` are produced by the transport when the channel
/// opens or drops; the rest are named backend events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connect,
    Disconnect,
    ConnectionResult(ConnectionResult),
    TaskStarted {
        task_id: TaskId,
    },
    TaskStopped {
        task_id: TaskId,
        #[serde(default)]
        message: String,
    },
    GenerationOutput {
        output: String,
        #[serde(default)]
        task_id: Option<TaskId>,
    },
    TaskCompleted {
        result_file: String,
        #[serde(default)]
        task_id: Option<TaskId>,
    },
    TaskError {
        error: String,
        #[serde(default)]
        task_id: Option<TaskId>,
    },
}

const BACKEND_EVENTS: &[&str] = &[
    "connection_result",
    "task_started",
    "task_stopped",
    "generation_output",
    "task_completed",
    "task_error",
];

impl ServerEvent {
    /// Decodes a named backend event.
    ///
    /// Returns `Ok(None)` for event names this client does not handle, so the
    /// backend may add events without breaking older clients.
    pub fn from_named(name: &str, payload: Option<Value>) -> serde_json::Result<Option<Self>> {
        if !BACKEND_EVENTS.contains(&name) {
            return Ok(None);
        }
        let mut tagged = serde_json::Map::new();
        tagged.insert("event".to_string(), Value::String(name.to_string()));
        if let Some(payload) = payload {
            tagged.insert("data".to_string(), payload);
        }
        serde_json::from_value(Value::Object(tagged)).map(Some)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connect => "connect",
            ServerEvent::Disconnect => "disconnect",
            ServerEvent::ConnectionResult(_) => "connection_result",
            ServerEvent::TaskStarted { .. } => "task_started",
            ServerEvent::TaskStopped { .. } => "task_stopped",
            ServerEvent::GenerationOutput { .. } => "generation_output",
            ServerEvent::TaskCompleted { .. } => "task_completed",
            ServerEvent::TaskError { .. } => "task_error",
        }
    }
}
