//! Vanity engine: backend transport, downloads and effect execution.
mod download;
mod engine;
mod persist;
mod socketio;
mod transport;
mod types;

pub use download::{ChannelEventSink, DownloadSettings, Downloader, EventSink, ReqwestDownloader};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use socketio::{decode_frame, encode_event, CodecError, Frame, OpenHandshake, CONNECT_PACKET, PONG_PACKET};
pub use transport::{run_session, socket_url, TransportError, TransportSettings};
pub use types::{DownloadError, EngineEvent, FailureKind};
