use vanity_protocol::{ClientEvent, ConnectionResult, ServerEvent};

use crate::state::{PendingAction, PendingConfirmation, ServerInfo};
use crate::{AppState, Effect, Msg, Tone};

const BANNER_WIDTH: usize = 60;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    // The confirmation prompt is modal: nothing else the user does lands
    // until it is answered.
    if state.pending_confirmation().is_some() && msg.is_user_action() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::FormEdited(field) => {
            state.edit_form(field);
            Vec::new()
        }
        Msg::ProfileRestored(profile) => {
            state.restore_profile(profile);
            Vec::new()
        }
        Msg::TestConnectionClicked => test_connection(&mut state),
        Msg::StartClicked => start_generation(&mut state),
        Msg::StopClicked => stop_task(&mut state),
        Msg::DownloadClicked => download_result(&mut state),
        Msg::ClearTerminalClicked => {
            state.clear_terminal();
            Vec::new()
        }
        Msg::ConfirmationResolved { accepted } => resolve_confirmation(&mut state, accepted),
        Msg::Server(event) => apply_server_event(&mut state, event),
        Msg::DownloadSaved { result_file, path } => {
            state.append_line(format!("Saved {result_file} to {path}"), Tone::Success);
            Vec::new()
        }
        Msg::DownloadFailed {
            result_file,
            reason,
        } => {
            state.append_line(
                format!("Download of {result_file} failed: {reason}"),
                Tone::Error,
            );
            Vec::new()
        }
        Msg::TransportError(reason) => {
            state.append_line(format!("Transport error: {reason}"), Tone::Error);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn test_connection(state: &mut AppState) -> Vec<Effect> {
    let form = state.form();
    if form.host().is_empty() {
        return vec![Effect::Alert("Please enter the server IP address!".to_string())];
    }
    if form.password.is_empty() {
        return vec![Effect::Alert("Please enter the server password!".to_string())];
    }
    let request = form.connection_request();

    state.append_line("\nTesting connection...", Tone::Warning);
    state.set_status("Connecting...", Tone::Warning);
    vec![Effect::Emit(ClientEvent::TestConnection(request))]
}

fn start_generation(state: &mut AppState) -> Vec<Effect> {
    if !state.start_enabled() {
        return Vec::new();
    }
    let form = state.form();
    if !form.has_filter() {
        return vec![Effect::Alert(
            "Set at least one condition (prefix, suffix or contains)!".to_string(),
        )];
    }
    let request = form.generation_request();
    let prompt = format!(
        "Start generation?\n\nPrefix: {}\nSuffix: {}\nContains: {}\nCount: {}\nCores: {}",
        or_none(&request.prefix),
        or_none(&request.suffix),
        or_none(&request.contains),
        request.wallet_count,
        request.cpu_cores,
    );

    state.open_confirmation(PendingConfirmation {
        action: PendingAction::StartGeneration(request),
        prompt: prompt.clone(),
    });
    vec![Effect::Confirm { prompt }]
}

fn stop_task(state: &mut AppState) -> Vec<Effect> {
    let Some(task_id) = state.session().current_task_id().cloned() else {
        return vec![Effect::Alert("No running task".to_string())];
    };
    let prompt =
        "Stop the current task? Results generated so far may be lost.".to_string();

    state.open_confirmation(PendingConfirmation {
        action: PendingAction::StopTask(task_id),
        prompt: prompt.clone(),
    });
    vec![Effect::Confirm { prompt }]
}

fn download_result(state: &mut AppState) -> Vec<Effect> {
    let Some(result_file) = state.session().current_result_file().map(ToOwned::to_owned) else {
        return vec![Effect::Alert("No file available to download!".to_string())];
    };

    state.append_line(format!("\nDownloading: {result_file}"), Tone::Success);
    vec![Effect::OpenDownload { result_file }]
}

fn resolve_confirmation(state: &mut AppState, accepted: bool) -> Vec<Effect> {
    let Some(pending) = state.take_confirmation() else {
        return Vec::new();
    };
    if !accepted {
        return Vec::new();
    }

    match pending.action {
        PendingAction::StartGeneration(request) => {
            state.set_download_visible(false);
            let rule = "=".repeat(BANNER_WIDTH);
            state.append_line(format!("\n{rule}"), Tone::Warning);
            state.append_line("Starting a new generation task...", Tone::Warning);
            state.append_line(format!("{rule}\n"), Tone::Warning);
            vec![Effect::Emit(ClientEvent::StartGeneration(request))]
        }
        PendingAction::StopTask(task_id) => {
            // The task may have finished while the prompt was open.
            if !state.session().is_tracking(&task_id) {
                return Vec::new();
            }
            state.append_line("\nStopping task...", Tone::Warning);
            vec![Effect::Emit(ClientEvent::StopTask { task_id })]
        }
    }
}

fn apply_server_event(state: &mut AppState, event: ServerEvent) -> Vec<Effect> {
    match event {
        ServerEvent::Connect => {
            state.append_line("Connected to web server", Tone::Success);
            Vec::new()
        }
        ServerEvent::Disconnect => {
            state.append_line("Disconnected from web server", Tone::Error);
            Vec::new()
        }
        ServerEvent::ConnectionResult(result) => apply_connection_result(state, result),
        ServerEvent::TaskStarted { task_id } => {
            state.session_mut().track_task(task_id.clone());
            state.show_task_label(task_id);
            state.set_status("Generating...", Tone::Warning);
            state.set_stop_visible(true);
            Vec::new()
        }
        ServerEvent::TaskStopped { task_id, message } => {
            if state.session().is_tracking(&task_id) {
                state.append_line(format!("\n{message}"), Tone::Success);
                state.set_status("Task stopped", Tone::Warning);
                state.set_stop_visible(false);
                state.session_mut().reset_task();
            }
            Vec::new()
        }
        ServerEvent::GenerationOutput { output, .. } => {
            state.append_line(output, Tone::Plain);
            Vec::new()
        }
        ServerEvent::TaskCompleted { result_file, .. } => {
            state.session_mut().set_result_file(result_file);
            state.set_status("Generation complete!", Tone::Success);
            state.set_download_visible(true);
            state.append_line(
                "\nTask complete! The result file is ready to download.",
                Tone::Success,
            );
            finish_task(state);
            Vec::new()
        }
        ServerEvent::TaskError { error, .. } => {
            state.set_status("Task failed", Tone::Error);
            state.append_line(format!("\nError: {error}"), Tone::Error);
            if state.session().current_task_id().is_some() {
                finish_task(state);
            }
            Vec::new()
        }
    }
}

fn apply_connection_result(state: &mut AppState, result: ConnectionResult) -> Vec<Effect> {
    if !result.success {
        let reason = result.message.as_deref().unwrap_or("unknown error");
        state.set_status("Connection failed", Tone::Error);
        state.append_line(format!("Connection failed: {reason}"), Tone::Error);
        return Vec::new();
    }

    let info = ServerInfo::from_result(&result);
    state.configure_cpu(info.cpu_cores);
    state.enable_start();
    state.set_status("Connected, ready to generate", Tone::Success);

    let memory = info
        .memory_gb
        .map(|gb| format!("{gb} GB"))
        .unwrap_or_else(|| "unknown".to_string());
    state.append_line("Connection succeeded!", Tone::Success);
    state.append_line(format!("   CPU: {} cores", info.cpu_cores), Tone::Success);
    state.append_line(format!("   Memory: {memory}"), Tone::Success);
    state.append_line(
        format!(
            "   Python: {}",
            info.python_version.as_deref().unwrap_or("unknown")
        ),
        Tone::Success,
    );
    state.append_line(
        format!(
            "   System: {}\n",
            info.os_info.as_deref().unwrap_or("unknown")
        ),
        Tone::Success,
    );
    state.session_mut().set_server_info(info);

    vec![Effect::SaveProfile(state.form().profile())]
}

fn finish_task(state: &mut AppState) {
    state.set_stop_visible(false);
    state.session_mut().reset_task();
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}
