use vanity_protocol::{ConnectionResult, GenerationRequest, TaskId};

use crate::form::{ConnectionProfile, FormField, FormState};
use crate::view_model::{AppViewModel, ServerInfoView, StatusLine, TerminalLine, Tone};

/// Machine details reported by a successful connection test.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub cpu_cores: u32,
    pub memory_gb: Option<f64>,
    pub python_version: Option<String>,
    pub os_info: Option<String>,
}

impl ServerInfo {
    pub(crate) fn from_result(result: &ConnectionResult) -> Self {
        Self {
            cpu_cores: result.cpu_cores.unwrap_or(1).max(1),
            memory_gb: result.memory_gb,
            python_version: result.python_version.clone(),
            os_info: result.os_info.clone(),
        }
    }
}

/// Identifiers that gate the stop and download actions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    current_task_id: Option<TaskId>,
    current_result_file: Option<String>,
    server_info: Option<ServerInfo>,
}

impl SessionState {
    pub fn current_task_id(&self) -> Option<&TaskId> {
        self.current_task_id.as_ref()
    }

    pub fn current_result_file(&self) -> Option<&str> {
        self.current_result_file.as_deref()
    }

    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    pub fn is_tracking(&self, task_id: &TaskId) -> bool {
        self.current_task_id.as_ref() == Some(task_id)
    }

    pub(crate) fn track_task(&mut self, task_id: TaskId) {
        self.current_task_id = Some(task_id);
    }

    pub(crate) fn set_result_file(&mut self, result_file: String) {
        self.current_result_file = Some(result_file);
    }

    pub(crate) fn set_server_info(&mut self, info: ServerInfo) {
        self.server_info = Some(info);
    }

    /// Forget the tracked task. Called on every terminal task transition.
    pub(crate) fn reset_task(&mut self) {
        self.current_task_id = None;
    }
}

/// Action waiting for the user's yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    StartGeneration(GenerationRequest),
    StopTask(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: PendingAction,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    session: SessionState,
    form: FormState,
    terminal: Vec<TerminalLine>,
    terminal_epoch: u64,
    status: StatusLine,
    task_label: Option<TaskId>,
    start_enabled: bool,
    stop_visible: bool,
    download_visible: bool,
    pending: Option<PendingConfirmation>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: SessionState::default(),
            form: FormState::default(),
            terminal: Vec::new(),
            terminal_epoch: 0,
            status: StatusLine::new("Not connected", Tone::Info),
            task_label: None,
            start_enabled: false,
            stop_visible: false,
            download_visible: false,
            pending: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            status: self.status.clone(),
            terminal: self.terminal.clone(),
            terminal_epoch: self.terminal_epoch,
            task_label: self.task_label.clone(),
            start_enabled: self.start_enabled,
            stop_visible: self.stop_visible,
            download_visible: self.download_visible,
            server_info: self.session.server_info().map(ServerInfoView::from),
            cpu: self.form.cpu,
            pending_prompt: self.pending.as_ref().map(|pending| pending.prompt.clone()),
            form: self.form_without_secret(),
            password_set: !self.form.password.is_empty(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Start stays disabled until a connection test succeeds.
    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub(crate) fn edit_form(&mut self, field: FormField) {
        self.form.apply(field);
        self.dirty = true;
    }

    pub(crate) fn restore_profile(&mut self, profile: ConnectionProfile) {
        self.form.restore(profile);
        self.dirty = true;
    }

    pub(crate) fn configure_cpu(&mut self, cores: u32) {
        self.form.cpu.configure(cores);
        self.dirty = true;
    }

    pub(crate) fn append_line(&mut self, text: impl Into<String>, tone: Tone) {
        self.terminal.push(TerminalLine {
            text: text.into(),
            tone,
        });
        self.dirty = true;
    }

    pub(crate) fn clear_terminal(&mut self) {
        self.terminal.clear();
        self.terminal_epoch += 1;
        self.append_line("Terminal cleared, waiting for new output...", Tone::Info);
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, tone: Tone) {
        self.status = StatusLine::new(text, tone);
        self.dirty = true;
    }

    pub(crate) fn show_task_label(&mut self, task_id: TaskId) {
        self.task_label = Some(task_id);
        self.dirty = true;
    }

    pub(crate) fn enable_start(&mut self) {
        self.start_enabled = true;
        self.dirty = true;
    }

    pub(crate) fn set_stop_visible(&mut self, visible: bool) {
        self.stop_visible = visible;
        self.dirty = true;
    }

    pub(crate) fn set_download_visible(&mut self, visible: bool) {
        self.download_visible = visible;
        self.dirty = true;
    }

    pub(crate) fn open_confirmation(&mut self, pending: PendingConfirmation) {
        self.pending = Some(pending);
        self.dirty = true;
    }

    pub(crate) fn take_confirmation(&mut self) -> Option<PendingConfirmation> {
        let pending = self.pending.take();
        if pending.is_some() {
            self.dirty = true;
        }
        pending
    }

    fn form_without_secret(&self) -> FormState {
        FormState {
            password: String::new(),
            ..self.form.clone()
        }
    }
}
