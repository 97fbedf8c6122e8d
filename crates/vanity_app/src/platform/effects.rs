use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use vanity_core::{Effect, Msg};
use vanity_engine::{EngineEvent, EngineHandle};
use vanity_logging::{vanity_debug, vanity_info, vanity_warn};

use super::app::Inbound;
use super::persistence;

/// Effects the terminal has to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Alert(String),
    Confirm(String),
}

pub(crate) struct EffectRunner {
    engine: EngineHandle,
    profile_path: PathBuf,
}

impl EffectRunner {
    pub(crate) fn new(
        engine: EngineHandle,
        profile_path: PathBuf,
        inbox_tx: mpsc::Sender<Inbound>,
    ) -> Self {
        let runner = Self {
            engine,
            profile_path,
        };
        runner.spawn_event_loop(inbox_tx);
        runner
    }

    pub(crate) fn enqueue(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::Emit(event) => {
                    vanity_info!("Emit {}", event.name());
                    self.engine.emit(event);
                }
                Effect::OpenDownload { result_file } => {
                    vanity_info!("Download requested for {}", result_file);
                    self.engine.download(result_file);
                }
                Effect::SaveProfile(profile) => {
                    persistence::save_profile(&self.profile_path, &profile);
                }
                Effect::Alert(message) => notices.push(Notice::Alert(message)),
                Effect::Confirm { prompt } => notices.push(Notice::Confirm(prompt)),
            }
        }
        notices
    }

    fn spawn_event_loop(&self, inbox_tx: mpsc::Sender<Inbound>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            match engine.try_recv() {
                Some(event) => {
                    let Some(msg) = map_event(event) else {
                        continue;
                    };
                    if inbox_tx.send(Inbound::Engine(msg)).is_err() {
                        break;
                    }
                }
                None => thread::sleep(Duration::from_millis(20)),
            }
        });
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Server(event) => Some(Msg::Server(event)),
        EngineEvent::DownloadProgress { result_file, bytes } => {
            vanity_debug!("Downloading {}: {} bytes", result_file, bytes);
            None
        }
        EngineEvent::DownloadCompleted {
            result_file,
            result,
        } => Some(match result {
            Ok(path) => Msg::DownloadSaved {
                result_file,
                path: path.display().to_string(),
            },
            Err(err) => {
                vanity_warn!("Download of {} failed: {}", result_file, err);
                Msg::DownloadFailed {
                    result_file,
                    reason: err.to_string(),
                }
            }
        }),
        EngineEvent::TransportError(reason) => Some(Msg::TransportError(reason)),
    }
}
