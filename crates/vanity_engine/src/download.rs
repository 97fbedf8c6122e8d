use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use url::Url;
use vanity_logging::vanity_info;

use crate::persist::AtomicFileWriter;
use crate::{DownloadError, EngineEvent, FailureKind};

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Fetches a result file and stores it locally, returning the saved path.
    async fn download(
        &self,
        result_file: &str,
        sink: &dyn EventSink,
    ) -> Result<PathBuf, DownloadError>;
}

/// Downloads `GET {base}/download/{result_file}` into the output directory.
pub struct ReqwestDownloader {
    settings: DownloadSettings,
    base_url: Url,
    writer: AtomicFileWriter,
}

impl ReqwestDownloader {
    pub fn new(settings: DownloadSettings, base_url: Url, output_dir: PathBuf) -> Self {
        Self {
            settings,
            base_url,
            writer: AtomicFileWriter::new(output_dir),
        }
    }

    pub fn download_url(&self, result_file: &str) -> Result<Url, DownloadError> {
        validate_file_name(result_file)?;
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DownloadError::new(FailureKind::InvalidUrl, "server url cannot be a base"))?
            .pop_if_empty()
            .push("download")
            .push(result_file);
        Ok(url)
    }

    fn build_client(&self) -> Result<reqwest::Client, DownloadError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| DownloadError::new(FailureKind::Network, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> DownloadError {
        DownloadError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Downloader for ReqwestDownloader {
    async fn download(
        &self,
        result_file: &str,
        sink: &dyn EventSink,
    ) -> Result<PathBuf, DownloadError> {
        let url = self.download_url(result_file)?;
        let client = self.build_client()?;

        let response = client.get(url.clone()).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
            sink.emit(EngineEvent::DownloadProgress {
                result_file: result_file.to_string(),
                bytes: bytes.len() as u64,
            });
        }

        let path = self
            .writer
            .write_bytes(result_file, &bytes)
            .map_err(|err| DownloadError::new(FailureKind::Persist, err.to_string()))?;
        vanity_info!(
            "Downloaded {} ({} bytes) from {} to {:?}",
            result_file,
            bytes.len(),
            url,
            path
        );
        Ok(path)
    }
}

/// Result names come from the backend; refuse anything that could escape the
/// output directory.
fn validate_file_name(name: &str) -> Result<(), DownloadError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(DownloadError::new(
            FailureKind::InvalidFileName,
            format!("refusing result file name {name:?}"),
        ));
    }
    Ok(())
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        return DownloadError::new(FailureKind::Timeout, err.to_string());
    }
    DownloadError::new(FailureKind::Network, err.to_string())
}
