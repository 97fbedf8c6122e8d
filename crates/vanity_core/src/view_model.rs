use vanity_protocol::TaskId;

use crate::form::{CpuSlider, FormState};
use crate::state::ServerInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

impl StatusLine {
    pub(crate) fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfoView {
    pub cpu_cores: u32,
    pub memory_gb: Option<f64>,
    pub python_version: Option<String>,
}

impl From<&ServerInfo> for ServerInfoView {
    fn from(info: &ServerInfo) -> Self {
        Self {
            cpu_cores: info.cpu_cores,
            memory_gb: info.memory_gb,
            python_version: info.python_version.clone(),
        }
    }
}

/// Snapshot handed to the renderer. The password is never included.
#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub status: StatusLine,
    /// Append-only between clears; `terminal_epoch` changes on clear.
    pub terminal: Vec<TerminalLine>,
    pub terminal_epoch: u64,
    pub task_label: Option<TaskId>,
    pub start_enabled: bool,
    pub stop_visible: bool,
    pub download_visible: bool,
    pub server_info: Option<ServerInfoView>,
    pub cpu: CpuSlider,
    pub pending_prompt: Option<String>,
    pub form: FormState,
    pub password_set: bool,
    pub dirty: bool,
}
