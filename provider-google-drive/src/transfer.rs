//! Chunked transfer loops
//!
//! Downloads pull successive byte ranges until the written offset reaches the
//! size the service reports. Uploads push successive chunks of a resumable
//! session until the service reports the file as created, resuming from the
//! offset the service acknowledged after each chunk.

use bridge_traits::storage::{DriveService, NewFileMetadata, UploadStatus};
use bytes::Bytes;
use std::fmt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{DriveError, Result};

/// Direction of a transfer, used in progress reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Upload,
    Download,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDirection::Upload => write!(f, "Upload"),
            TransferDirection::Download => write!(f, "Download"),
        }
    }
}

/// Snapshot reported after every chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub direction: TransferDirection,
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Completed fraction in `0.0..=1.0`; an empty transfer counts as complete
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            (self.bytes_transferred as f64 / self.total_bytes as f64).min(1.0)
        }
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0) as u32
    }
}

/// Callback trait for progress reporting.
pub trait ProgressCallback: Send + Sync {
    /// Called after each chunk. Returns false to cancel the transfer.
    fn on_progress(&self, progress: &TransferProgress) -> bool;
}

/// Per-call transfer knobs
#[derive(Clone, Default)]
pub struct TransferOptions {
    pub progress: Option<Arc<dyn ProgressCallback>>,
    pub cancel: Option<CancellationToken>,
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("progress", &self.progress.as_ref().map(|_| "ProgressCallback { ... }"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl TransferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(DriveError::Cancelled),
            _ => Ok(()),
        }
    }

    fn report(&self, progress: TransferProgress) -> Result<()> {
        info!("{} {}%.", progress.direction, progress.percent());

        match &self.progress {
            Some(callback) if !callback.on_progress(&progress) => {
                debug!("Transfer cancelled by progress callback");
                Err(DriveError::Cancelled)
            }
            _ => Ok(()),
        }
    }
}

/// Payload of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Bytes already in memory
    Bytes(Bytes),
    /// A local file, read chunk by chunk
    Path(PathBuf),
}

impl From<Vec<u8>> for UploadSource {
    fn from(bytes: Vec<u8>) -> Self {
        UploadSource::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for UploadSource {
    fn from(bytes: Bytes) -> Self {
        UploadSource::Bytes(bytes)
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        UploadSource::Path(path)
    }
}

/// Random-access reader over an [`UploadSource`]
enum ChunkReader {
    Memory(Bytes),
    File { file: File, path: PathBuf, len: u64 },
}

impl ChunkReader {
    async fn open(source: UploadSource) -> Result<Self> {
        match source {
            UploadSource::Bytes(bytes) => Ok(ChunkReader::Memory(bytes)),
            UploadSource::Path(path) => {
                let file = File::open(&path)
                    .await
                    .map_err(|e| DriveError::local_io(&path, e))?;
                let len = file
                    .metadata()
                    .await
                    .map_err(|e| DriveError::local_io(&path, e))?
                    .len();
                Ok(ChunkReader::File { file, path, len })
            }
        }
    }

    fn len(&self) -> u64 {
        match self {
            ChunkReader::Memory(bytes) => bytes.len() as u64,
            ChunkReader::File { len, .. } => *len,
        }
    }

    async fn read_at(&mut self, offset: u64, len: usize) -> Result<Bytes> {
        match self {
            ChunkReader::Memory(bytes) => {
                let start = offset as usize;
                Ok(bytes.slice(start..start + len))
            }
            ChunkReader::File { file, path, .. } => {
                let mut buf = vec![0u8; len];
                file.seek(SeekFrom::Start(offset))
                    .await
                    .map_err(|e| DriveError::local_io(path.as_path(), e))?;
                file.read_exact(&mut buf)
                    .await
                    .map_err(|e| DriveError::local_io(path.as_path(), e))?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

/// Stream a remote file into `destination`, returning the bytes written
///
/// The destination is created or truncated. The handle is closed on every
/// exit path; a failed transfer may leave a partial file behind.
pub async fn download_to_path(
    service: &dyn DriveService,
    file_id: &str,
    destination: &Path,
    chunk_size: usize,
    options: &TransferOptions,
) -> Result<u64> {
    options.ensure_not_cancelled()?;

    let mut file = File::create(destination)
        .await
        .map_err(|e| DriveError::local_io(destination, e))?;

    let chunk_size = chunk_size.max(1) as u64;
    let mut offset = 0u64;

    loop {
        options.ensure_not_cancelled()?;

        let chunk = service.download_chunk(file_id, offset, chunk_size).await?;
        let total = chunk.total_size;

        if chunk.data.is_empty() && offset < total {
            return Err(DriveError::TransferStalled { offset, total });
        }

        file.write_all(&chunk.data)
            .await
            .map_err(|e| DriveError::local_io(destination, e))?;
        offset += chunk.data.len() as u64;

        options.report(TransferProgress {
            direction: TransferDirection::Download,
            bytes_transferred: offset,
            total_bytes: total,
        })?;

        if offset >= total {
            break;
        }
    }

    file.flush()
        .await
        .map_err(|e| DriveError::local_io(destination, e))?;

    Ok(offset)
}

/// Upload `source` through a resumable session, returning the new file id
pub async fn upload_resumable(
    service: &dyn DriveService,
    source: UploadSource,
    metadata: &NewFileMetadata,
    chunk_size: usize,
    options: &TransferOptions,
) -> Result<String> {
    options.ensure_not_cancelled()?;

    let mut reader = ChunkReader::open(source).await?;
    let total = reader.len();
    let session = service.start_upload(metadata, total).await?;

    let chunk_size = chunk_size.max(1) as u64;
    let mut offset = 0u64;

    loop {
        options.ensure_not_cancelled()?;

        let len = chunk_size.min(total - offset) as usize;
        let chunk = reader.read_at(offset, len).await?;

        match service.upload_chunk(&session, offset, chunk).await? {
            UploadStatus::Complete { file_id } => {
                options.report(TransferProgress {
                    direction: TransferDirection::Upload,
                    bytes_transferred: total,
                    total_bytes: total,
                })?;
                return Ok(file_id);
            }
            UploadStatus::Incomplete { next_offset } => {
                // Resuming from a point the service does not have, or from
                // where we already were, would never finish.
                if next_offset <= offset || next_offset > total {
                    return Err(DriveError::TransferStalled { offset, total });
                }
                offset = next_offset;

                options.report(TransferProgress {
                    direction: TransferDirection::Upload,
                    bytes_transferred: offset,
                    total_bytes: total,
                })?;
            }
        }
    }
}
