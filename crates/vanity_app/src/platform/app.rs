use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use url::Url;
use vanity_core::{update, AppState, Msg};
use vanity_engine::{EngineConfig, EngineHandle};
use vanity_logging::{vanity_info, vanity_warn};

use super::commands::{self, Command};
use super::effects::{EffectRunner, Notice};
use super::persistence;
use super::render::{self, Renderer};

pub struct AppOptions {
    pub server_url: Url,
    pub output_dir: PathBuf,
    pub profile_path: PathBuf,
    pub assume_yes: bool,
}

/// Everything the main loop reacts to, in arrival order.
pub(crate) enum Inbound {
    Line(String),
    Engine(Msg),
    InputClosed,
}

pub fn run_app(options: AppOptions) -> anyhow::Result<()> {
    vanity_info!(
        "Starting client for {} (output {:?})",
        options.server_url,
        options.output_dir
    );
    let engine = EngineHandle::new(EngineConfig::new(
        options.server_url.clone(),
        options.output_dir.clone(),
    ))
    .context("failed to start the network engine")?;

    let (inbox_tx, inbox_rx) = mpsc::channel::<Inbound>();
    let effects = EffectRunner::new(engine, options.profile_path.clone(), inbox_tx.clone());
    spawn_input_reader(inbox_tx);

    println!(
        "Vanity wallet client for {}. Type `help` for commands.",
        options.server_url
    );

    let mut app = App::new(effects, Renderer::new(), options.assume_yes);
    if let Some(profile) = persistence::load_profile(&options.profile_path) {
        app.dispatch(Msg::ProfileRestored(profile));
    }
    app.render();

    while let Ok(inbound) = inbox_rx.recv() {
        if app.handle(inbound).is_break() {
            break;
        }
    }
    vanity_info!("Client shutting down");
    Ok(())
}

fn spawn_input_reader(inbox_tx: mpsc::Sender<Inbound>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if inbox_tx.send(Inbound::Line(line)).is_err() {
                return;
            }
        }
        let _ = inbox_tx.send(Inbound::InputClosed);
    });
}

struct App {
    state: AppState,
    effects: EffectRunner,
    renderer: Renderer,
    assume_yes: bool,
}

impl App {
    fn new(effects: EffectRunner, renderer: Renderer, assume_yes: bool) -> Self {
        Self {
            state: AppState::new(),
            effects,
            renderer,
            assume_yes,
        }
    }

    fn handle(&mut self, inbound: Inbound) -> ControlFlow<()> {
        match inbound {
            Inbound::Line(line) => return self.handle_line(&line),
            Inbound::Engine(msg) => self.dispatch(msg),
            Inbound::InputClosed => {
                vanity_info!("Input closed");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_line(&mut self, line: &str) -> ControlFlow<()> {
        // A pending prompt takes the next line as its answer.
        if self.state.pending_confirmation().is_some() {
            self.dispatch(Msg::ConfirmationResolved {
                accepted: commands::parse_answer(line),
            });
            return ControlFlow::Continue(());
        }

        let command = match commands::parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                self.alert(&err.to_string());
                return ControlFlow::Continue(());
            }
        };

        match command {
            Command::Quit => return ControlFlow::Break(()),
            Command::Help => println!("{}", commands::HELP),
            Command::Status => println!("{}", render::summary(&self.state.view())),
            Command::Start if !self.state.start_enabled() => {
                self.alert("Start is available after a successful `test`.");
            }
            command => {
                if let Some(msg) = command.into_msg() {
                    self.dispatch(msg);
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;

            let mut auto_accepted = false;
            for notice in self.effects.enqueue(effects) {
                match notice {
                    Notice::Alert(message) => self.alert(&message),
                    Notice::Confirm(prompt) => {
                        if self.assume_yes {
                            vanity_info!("Auto-accepting prompt: {}", prompt.replace('\n', " "));
                            auto_accepted = true;
                            queue.push_back(Msg::ConfirmationResolved { accepted: true });
                        }
                    }
                }
            }

            if self.state.consume_dirty() {
                self.render();
            }
            if auto_accepted {
                println!("y");
            }
        }
    }

    fn render(&mut self) {
        let view = self.state.view();
        let mut out = io::stdout().lock();
        if let Err(err) = self.renderer.render(&view, &mut out) {
            vanity_warn!("Failed to write to terminal: {}", err);
        }
    }

    fn alert(&self, message: &str) {
        let mut err = io::stderr().lock();
        if let Err(write_err) = self
            .renderer
            .alert(message, &mut err)
            .and_then(|_| err.flush())
        {
            vanity_warn!("Failed to write alert: {}", write_err);
        }
    }
}
