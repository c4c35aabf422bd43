//! Remote file locator
//!
//! Folder get-or-create, latest-file lookup, and the upload/download
//! operations built on them.
//!
//! Every operation returns a typed [`Result`]. Upload operations additionally
//! log their failure at `error` level before returning it; callers that only
//! need "id or nothing" can use `.ok()`.

use bridge_traits::storage::{DriveService, FileQuery, NewFileMetadata, QueryOrder, RemoteFile};
use bridge_traits::time::{Clock, SystemClock};
use bridge_traits::FOLDER_MIME_TYPE;
use core_runtime::config::{DriveConfig, DEFAULT_CHUNK_SIZE};
use core_runtime::logging::strip_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::connector::GoogleDriveConnector;
use crate::error::{DriveError, Result};
use crate::naming::timestamped_name;
use crate::tabular::Table;
use crate::transfer::{download_to_path, upload_resumable, TransferOptions, UploadSource};

/// Folder lookups ask for at most this many candidates
pub const FOLDER_LOOKUP_PAGE_SIZE: u32 = 10;

pub const CSV_MIME_TYPE: &str = "text/csv";
pub const ZIP_MIME_TYPE: &str = "application/zip";

/// Locates folders and files by name and moves their content
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::{RemoteFileLocator, TransferOptions};
///
/// let locator = RemoteFileLocator::from_config(&config);
/// let options = TransferOptions::new();
///
/// let id = locator.upload_zip("/tmp/export.zip".as_ref(), "export", "Backups", &options).await?;
/// let path = locator
///     .download_latest(Some("export"), "Backups", "/tmp/restore.zip".as_ref(), &options)
///     .await?;
/// ```
pub struct RemoteFileLocator {
    service: Arc<dyn DriveService>,
    clock: Arc<dyn Clock>,
    chunk_size: usize,
}

impl RemoteFileLocator {
    /// Locator over any `DriveService`, using the system clock and 1 MiB chunks
    pub fn new(service: Arc<dyn DriveService>) -> Self {
        Self {
            service,
            clock: Arc::new(SystemClock),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Locator backed by a [`GoogleDriveConnector`] built from `config`
    pub fn from_config(config: &DriveConfig) -> Self {
        Self {
            service: Arc::new(GoogleDriveConnector::from_config(config)),
            clock: Arc::clone(&config.clock),
            chunk_size: config.chunk_size,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Bytes per transfer request; zero is treated as one
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Return the id of the folder named `name`, creating it if absent.
    ///
    /// Trashed folders are never matched. Folder names are not unique at the
    /// service: when several live folders share the name, the earliest created
    /// wins and a warning is logged. Which duplicate callers should get is not
    /// settled; this tie-break only makes the choice repeatable.
    #[instrument(skip(self))]
    pub async fn resolve_folder(&self, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            return Err(DriveError::InvalidInput(
                "Folder name cannot be empty".to_string(),
            ));
        }

        let query = FileQuery::new()
            .mime_type(FOLDER_MIME_TYPE)
            .name_equals(name)
            .not_trashed()
            .order_by(QueryOrder::CreatedTimeAsc)
            .page_size(FOLDER_LOOKUP_PAGE_SIZE);

        let folders = self.service.list_files(&query).await?;

        if let Some(folder) = folders.first() {
            if folders.len() > 1 {
                warn!(
                    matches = folders.len(),
                    folder_id = %folder.id,
                    "Several folders share this name; using the earliest created"
                );
            }
            info!(folder_id = %folder.id, "Found folder");
            return Ok(folder.id.clone());
        }

        let folder_id = self.service.create_folder(name).await?;
        info!(folder_id = %folder_id, "Created folder");
        Ok(folder_id)
    }

    /// Most recently modified file in `folder_name` whose name contains `suffix`.
    ///
    /// An absent or empty suffix matches any name. The folder is created if it
    /// does not exist yet.
    #[instrument(skip(self))]
    pub async fn find_latest(
        &self,
        suffix: Option<&str>,
        folder_name: &str,
    ) -> Result<Option<RemoteFile>> {
        let folder_id = self.resolve_folder(folder_name).await?;

        let query = FileQuery::new()
            .in_parent(folder_id)
            .name_contains(suffix.unwrap_or_default())
            .not_trashed()
            .order_by(QueryOrder::ModifiedTimeDesc)
            .page_size(1);

        let latest = self.service.list_files(&query).await?.into_iter().next();

        match &latest {
            Some(file) => info!(
                file_id = %file.id,
                name = %file.name,
                modified = ?file.modified_at,
                "Latest file found"
            ),
            None => info!("No matching files in folder"),
        }

        Ok(latest)
    }

    /// Id of the latest matching file, see [`find_latest`](Self::find_latest)
    pub async fn find_latest_file(
        &self,
        suffix: Option<&str>,
        folder_name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .find_latest(suffix, folder_name)
            .await?
            .map(|file| file.id))
    }

    /// Stream `file_id` into `destination`, returning the bytes written
    #[instrument(skip(self, destination, options), fields(destination = %strip_path(&destination.to_string_lossy())))]
    pub async fn download_to(
        &self,
        file_id: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<u64> {
        let written = download_to_path(
            self.service.as_ref(),
            file_id,
            destination,
            self.chunk_size,
            options,
        )
        .await?;

        info!(bytes = written, "Download complete");
        Ok(written)
    }

    /// Upload `source` into `folder_id` as `<name>_<timestamp>` and return the new id
    #[instrument(skip(self, source, options))]
    pub async fn upload_from(
        &self,
        source: UploadSource,
        name: &str,
        folder_id: &str,
        mime_type: &str,
        options: &TransferOptions,
    ) -> Result<String> {
        self.upload_named(source, name, None, folder_id, mime_type, options)
            .await
            .map_err(log_upload_failure)
    }

    async fn upload_named(
        &self,
        source: UploadSource,
        name: &str,
        extension: Option<&str>,
        folder_id: &str,
        mime_type: &str,
        options: &TransferOptions,
    ) -> Result<String> {
        let metadata = NewFileMetadata {
            name: timestamped_name(name, self.clock.now(), extension),
            mime_type: mime_type.to_string(),
            parents: vec![folder_id.to_string()],
        };

        let file_id = upload_resumable(
            self.service.as_ref(),
            source,
            &metadata,
            self.chunk_size,
            options,
        )
        .await?;

        info!(file_id = %file_id, name = %metadata.name, "Upload complete");
        Ok(file_id)
    }

    /// Download the latest matching file to `destination`.
    ///
    /// Returns `Ok(None)` without touching `destination` when nothing matches.
    #[instrument(skip(self, destination, options))]
    pub async fn download_latest(
        &self,
        suffix: Option<&str>,
        folder_name: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<Option<PathBuf>> {
        let Some(file_id) = self.find_latest_file(suffix, folder_name).await? else {
            info!("Nothing to download");
            return Ok(None);
        };

        self.download_to(&file_id, destination, options).await?;
        info!(destination = %strip_path(&destination.to_string_lossy()), "File saved");
        Ok(Some(destination.to_path_buf()))
    }

    /// Download the latest matching file to `destination` and parse it as CSV
    #[instrument(skip(self, destination, options))]
    pub async fn download_latest_table(
        &self,
        suffix: Option<&str>,
        folder_name: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<Option<Table>> {
        let Some(path) = self
            .download_latest(suffix, folder_name, destination, options)
            .await?
        else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| DriveError::local_io(&path, e))?;

        let table = Table::from_csv_bytes(&bytes)?;
        info!(rows = table.len(), "Parsed downloaded table");
        Ok(Some(table))
    }

    /// Upload `table` as CSV into the folder named `folder_name`
    #[instrument(skip(self, table, options), fields(rows = table.len()))]
    pub async fn upload_table(
        &self,
        table: &Table,
        name: &str,
        folder_name: &str,
        options: &TransferOptions,
    ) -> Result<String> {
        let result = async {
            let folder_id = self.resolve_folder(folder_name).await?;
            let csv = table.to_csv_bytes()?;
            self.upload_named(
                UploadSource::from(csv),
                name,
                None,
                &folder_id,
                CSV_MIME_TYPE,
                options,
            )
            .await
        }
        .await;

        result.map_err(log_upload_failure)
    }

    /// Upload the archive at `zip_path` into the folder named `folder_name`
    /// as `<name>_<timestamp>.zip`.
    ///
    /// Fails with a local I/O error before any remote call when the path does
    /// not exist.
    #[instrument(skip(self, zip_path, options), fields(zip = %strip_path(&zip_path.to_string_lossy())))]
    pub async fn upload_zip(
        &self,
        zip_path: &Path,
        name: &str,
        folder_name: &str,
        options: &TransferOptions,
    ) -> Result<String> {
        let result = async {
            let metadata = tokio::fs::metadata(zip_path)
                .await
                .map_err(|e| DriveError::local_io(zip_path, e))?;
            if !metadata.is_file() {
                return Err(DriveError::InvalidInput(format!(
                    "{} is not a regular file",
                    zip_path.display()
                )));
            }

            let folder_id = self.resolve_folder(folder_name).await?;
            self.upload_named(
                UploadSource::Path(zip_path.to_path_buf()),
                name,
                Some("zip"),
                &folder_id,
                ZIP_MIME_TYPE,
                options,
            )
            .await
        }
        .await;

        result.map_err(log_upload_failure)
    }
}

fn log_upload_failure(err: DriveError) -> DriveError {
    error!(error = %err, kind = ?err.kind(), "Upload failed");
    err
}
