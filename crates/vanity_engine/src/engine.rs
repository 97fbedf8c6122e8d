use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc as async_mpsc;
use url::Url;
use vanity_logging::{vanity_error, vanity_info, vanity_warn};
use vanity_protocol::ClientEvent;

use crate::download::{ChannelEventSink, DownloadSettings, Downloader, ReqwestDownloader};
use crate::transport::{run_session, TransportSettings};
use crate::EngineEvent;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_url: Url,
    pub output_dir: PathBuf,
    pub transport: TransportSettings,
    pub download: DownloadSettings,
}

impl EngineConfig {
    pub fn new(server_url: Url, output_dir: PathBuf) -> Self {
        Self {
            server_url,
            output_dir,
            transport: TransportSettings::default(),
            download: DownloadSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    Emit(ClientEvent),
    Download { result_file: String },
}

/// Owns the worker thread that talks to the backend.
///
/// The socket session starts immediately. Dropping every clone of the handle
/// closes the command channel, which ends the session and the worker thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let downloader: Arc<dyn Downloader> = Arc::new(ReqwestDownloader::new(
            config.download.clone(),
            config.server_url.clone(),
            config.output_dir.clone(),
        ));

        thread::spawn(move || {
            let (outbound_tx, outbound_rx) = async_mpsc::unbounded_channel();
            let session_events = event_tx.clone();
            let server_url = config.server_url.clone();
            let transport = config.transport.clone();
            runtime.spawn(async move {
                let sink = ChannelEventSink::new(session_events.clone());
                if let Err(err) = run_session(&server_url, &transport, outbound_rx, &sink).await {
                    vanity_error!("Session with {} failed: {}", server_url, err);
                    let _ = session_events.send(EngineEvent::TransportError(err.to_string()));
                }
            });

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Emit(event) => {
                        let name = event.name();
                        if outbound_tx.send(event).is_err() {
                            vanity_warn!("Dropping {}: not connected to server", name);
                            let _ = event_tx.send(EngineEvent::TransportError(format!(
                                "not connected to server; {name} was not sent"
                            )));
                        }
                    }
                    EngineCommand::Download { result_file } => {
                        let downloader = downloader.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_download(downloader.as_ref(), result_file, event_tx).await;
                        });
                    }
                }
            }
            vanity_info!("Engine command channel closed; shutting down");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn emit(&self, event: ClientEvent) {
        let _ = self.cmd_tx.send(EngineCommand::Emit(event));
    }

    pub fn download(&self, result_file: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            result_file: result_file.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        match self.event_rx.lock() {
            Ok(rx) => rx.recv_timeout(timeout),
            Err(_) => Err(mpsc::RecvTimeoutError::Disconnected),
        }
    }
}

async fn handle_download(
    downloader: &dyn Downloader,
    result_file: String,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelEventSink::new(event_tx.clone());
    let result = downloader.download(&result_file, &sink).await;
    if let Err(err) = &result {
        vanity_warn!("Download of {} failed: {}", result_file, err);
    }
    let _ = event_tx.send(EngineEvent::DownloadCompleted {
        result_file,
        result,
    });
}
