use std::io::{self, Write};

use chrono::Local;
use vanity_core::{AppViewModel, ServerInfoView, StatusLine, TaskId, Tone};

type Clock = Box<dyn Fn() -> String>;

/// Prints the parts of the view model that changed since the last call.
///
/// Terminal lines are append-only between clears, so only the tail beyond
/// `printed` is new. A changed `terminal_epoch` means the buffer was cleared.
pub(crate) struct Renderer {
    clock: Clock,
    epoch: u64,
    printed: usize,
    status: Option<StatusLine>,
    task_label: Option<TaskId>,
    stop_visible: bool,
    download_visible: bool,
    server_info: Option<ServerInfoView>,
    prompt: Option<String>,
}

impl Renderer {
    pub(crate) fn new() -> Self {
        Self::with_clock(Box::new(|| Local::now().format("%H:%M:%S").to_string()))
    }

    pub(crate) fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            epoch: 0,
            printed: 0,
            status: None,
            task_label: None,
            stop_visible: false,
            download_visible: false,
            server_info: None,
            prompt: None,
        }
    }

    pub(crate) fn render(&mut self, view: &AppViewModel, out: &mut dyn Write) -> io::Result<()> {
        if view.terminal_epoch != self.epoch {
            self.epoch = view.terminal_epoch;
            self.printed = 0;
        }
        if self.printed > view.terminal.len() {
            self.printed = 0;
        }
        for line in &view.terminal[self.printed..] {
            let stamp = (self.clock)();
            writeln!(out, "[{stamp}] {}{}", tone_marker(line.tone), line.text)?;
        }
        self.printed = view.terminal.len();

        if self.status.as_ref() != Some(&view.status) {
            writeln!(out, "status: {}{}", tone_marker(view.status.tone), view.status.text)?;
            self.status = Some(view.status.clone());
        }

        if self.task_label != view.task_label {
            if let Some(task_id) = &view.task_label {
                writeln!(out, "task: {task_id}")?;
            }
            self.task_label = view.task_label.clone();
        }

        if self.server_info != view.server_info {
            if view.server_info.is_some() {
                writeln!(
                    out,
                    "cpu cores: {} of {} selected (`set cores <n>` to change)",
                    view.cpu.value, view.cpu.max
                )?;
            }
            self.server_info = view.server_info.clone();
        }

        if view.stop_visible && !self.stop_visible {
            writeln!(out, "task running: type `stop` to cancel it")?;
        }
        self.stop_visible = view.stop_visible;

        if view.download_visible && !self.download_visible {
            writeln!(out, "result ready: type `download` to save it")?;
        }
        self.download_visible = view.download_visible;

        if self.prompt != view.pending_prompt {
            if let Some(prompt) = &view.pending_prompt {
                write!(out, "{prompt}\n[y/N] ")?;
            }
            self.prompt = view.pending_prompt.clone();
        }

        out.flush()
    }

    pub(crate) fn alert(&self, message: &str, err: &mut dyn Write) -> io::Result<()> {
        writeln!(err, "! {message}")
    }
}

/// Multi-line report for the `status` command. The password is shown only
/// as set or unset.
pub(crate) fn summary(view: &AppViewModel) -> String {
    let form = &view.form;
    let mut lines = vec![
        format!("status:   {}", view.status.text),
        format!(
            "server:   {}:{} as {}",
            display_or(&form.host, "(unset)"),
            display_or(&form.port, "22"),
            display_or(&form.username, "root"),
        ),
        format!(
            "password: {}",
            if view.password_set { "set" } else { "unset" }
        ),
        format!(
            "filters:  prefix={} suffix={} contains={} case={}",
            display_or(&form.prefix, "-"),
            display_or(&form.suffix, "-"),
            display_or(&form.contains, "-"),
            if form.case_sensitive { "on" } else { "off" },
        ),
        format!(
            "count:    {}   cores: {}",
            display_or(&form.wallet_count, "1"),
            if view.cpu.enabled {
                format!("{} of {}", view.cpu.value, view.cpu.max)
            } else {
                "test the connection first".to_string()
            },
        ),
    ];
    if let Some(task_id) = &view.task_label {
        lines.push(format!("task:     {task_id}"));
    }
    if let Some(info) = &view.server_info {
        lines.push(describe_server(info));
    }
    if !view.start_enabled {
        lines.push("start is available after a successful `test`".to_string());
    }
    lines.join("\n")
}

fn describe_server(info: &ServerInfoView) -> String {
    let mut text = format!("remote: {} CPU cores", info.cpu_cores);
    if let Some(memory) = info.memory_gb {
        text.push_str(&format!(", {memory} GB memory"));
    }
    if let Some(python) = &info.python_version {
        text.push_str(&format!(", Python {python}"));
    }
    text
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Plain | Tone::Info => "",
        Tone::Success => "+ ",
        Tone::Warning => "~ ",
        Tone::Error => "! ",
    }
}
