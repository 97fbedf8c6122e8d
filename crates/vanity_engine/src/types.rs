use std::fmt;
use std::path::PathBuf;

use vanity_protocol::ServerEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Inbound traffic, including the transport's own connect/disconnect.
    Server(ServerEvent),
    DownloadProgress {
        result_file: String,
        bytes: u64,
    },
    DownloadCompleted {
        result_file: String,
        result: Result<PathBuf, DownloadError>,
    },
    /// A frame could not be decoded or an outbound event could not be sent.
    TransportError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadError {
    pub kind: FailureKind,
    pub message: String,
}

impl DownloadError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidFileName,
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    Persist,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidFileName => write!(f, "invalid file name"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Persist => write!(f, "could not save file"),
        }
    }
}
