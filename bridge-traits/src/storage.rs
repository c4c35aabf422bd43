//! Remote Storage Abstractions
//!
//! Defines the contract between the file locator and a remote file-storage
//! service: single-page listing driven by a structured [`FileQuery`], folder
//! creation, resumable chunked uploads and ranged media downloads.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MIME type the remote service uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file or folder stored at the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub parent_ids: Vec<String>,
    pub trashed: bool,
}

impl RemoteFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

/// A single filter condition of a [`FileQuery`]
///
/// Values are kept as plain strings; escaping is the job of whichever
/// service renders the clause into its own query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryClause {
    MimeTypeEquals(String),
    NameEquals(String),
    NameContains(String),
    InParent(String),
    NotTrashed,
}

impl QueryClause {
    /// Evaluate the clause against a file held in memory
    pub fn matches(&self, file: &RemoteFile) -> bool {
        match self {
            QueryClause::MimeTypeEquals(mime) => file.mime_type.as_deref() == Some(mime.as_str()),
            QueryClause::NameEquals(name) => file.name == *name,
            QueryClause::NameContains(fragment) => file.name.contains(fragment.as_str()),
            QueryClause::InParent(parent) => file.parent_ids.iter().any(|p| p == parent),
            QueryClause::NotTrashed => !file.trashed,
        }
    }
}

/// Result ordering requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
    /// Most recently modified first
    ModifiedTimeDesc,
    /// Earliest created first
    CreatedTimeAsc,
}

/// Structured listing query, combined with logical AND
///
/// # Example
///
/// ```
/// use bridge_traits::storage::{FileQuery, QueryOrder};
///
/// let query = FileQuery::new()
///     .in_parent("folder-1")
///     .name_contains("2025")
///     .order_by(QueryOrder::ModifiedTimeDesc);
///
/// assert_eq!(query.clauses().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    clauses: Vec<QueryClause>,
    order: Option<QueryOrder>,
    page_size: Option<u32>,
}

impl FileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.clauses
            .push(QueryClause::MimeTypeEquals(mime_type.into()));
        self
    }

    pub fn name_equals(mut self, name: impl Into<String>) -> Self {
        self.clauses.push(QueryClause::NameEquals(name.into()));
        self
    }

    /// Restrict to names containing `fragment`.
    ///
    /// An empty fragment means "any name" and adds no clause.
    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.clauses.push(QueryClause::NameContains(fragment));
        }
        self
    }

    pub fn in_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.clauses.push(QueryClause::InParent(parent_id.into()));
        self
    }

    pub fn not_trashed(mut self) -> Self {
        self.clauses.push(QueryClause::NotTrashed);
        self
    }

    pub fn order_by(mut self, order: QueryOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn clauses(&self) -> &[QueryClause] {
        &self.clauses
    }

    pub fn order(&self) -> Option<QueryOrder> {
        self.order
    }

    pub fn limit(&self) -> Option<u32> {
        self.page_size
    }

    /// Whether every clause holds for `file`
    pub fn matches(&self, file: &RemoteFile) -> bool {
        self.clauses.iter().all(|clause| clause.matches(file))
    }
}

/// Metadata of a file about to be created by an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFileMetadata {
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
}

/// An open resumable upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    /// Service-issued location that receives the chunks
    pub uri: String,
    /// Total payload size announced when the session was opened
    pub total_size: u64,
}

/// Service answer to one uploaded chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// More bytes expected; the service has persisted everything before `next_offset`
    Incomplete { next_offset: u64 },
    /// Upload finished and the file exists
    Complete { file_id: String },
}

/// One ranged piece of a file's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    pub data: Bytes,
    /// Size of the whole file, as reported by the service
    pub total_size: u64,
}

/// Remote file-storage service used by the locator
///
/// Every call is a single request; implementations do not retry.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::{DriveService, FileQuery};
///
/// async fn first_match(service: &dyn DriveService, name: &str) -> Result<Option<String>> {
///     let files = service.list_files(&FileQuery::new().name_equals(name)).await?;
///     Ok(files.into_iter().next().map(|f| f.id))
/// }
/// ```
#[async_trait]
pub trait DriveService: Send + Sync {
    /// List the first page of files matching `query`
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<RemoteFile>>;

    /// Create a top-level folder and return its id
    async fn create_folder(&self, name: &str) -> Result<String>;

    /// Open a resumable upload session for a new file of `total_size` bytes
    async fn start_upload(
        &self,
        metadata: &NewFileMetadata,
        total_size: u64,
    ) -> Result<UploadSession>;

    /// Send the bytes starting at `offset`
    ///
    /// An empty `chunk` with `offset == total_size` finalizes the upload.
    async fn upload_chunk(
        &self,
        session: &UploadSession,
        offset: u64,
        chunk: Bytes,
    ) -> Result<UploadStatus>;

    /// Fetch up to `max_len` bytes of a file's content starting at `offset`
    async fn download_chunk(&self, file_id: &str, offset: u64, max_len: u64)
        -> Result<MediaChunk>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, parent: &str) -> RemoteFile {
        RemoteFile {
            id: format!("id-{}", name),
            name: name.to_string(),
            mime_type: Some("text/csv".to_string()),
            size: Some(10),
            created_at: None,
            modified_at: None,
            parent_ids: vec![parent.to_string()],
            trashed: false,
        }
    }

    #[test]
    fn test_empty_fragment_adds_no_clause() {
        let query = FileQuery::new().in_parent("f1").name_contains("");
        assert_eq!(query.clauses(), &[QueryClause::InParent("f1".to_string())]);
    }

    #[test]
    fn test_query_matches_all_clauses() {
        let query = FileQuery::new()
            .in_parent("f1")
            .name_contains("2025")
            .not_trashed();

        assert!(query.matches(&file("a_2025.csv", "f1")));
        assert!(!query.matches(&file("a_2024.csv", "f1")));
        assert!(!query.matches(&file("a_2025.csv", "f2")));

        let mut trashed = file("a_2025.csv", "f1");
        trashed.trashed = true;
        assert!(!query.matches(&trashed));
    }

    #[test]
    fn test_folder_detection() {
        let mut folder = file("Reports", "root");
        assert!(!folder.is_folder());
        folder.mime_type = Some(FOLDER_MIME_TYPE.to_string());
        assert!(folder.is_folder());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let metadata = NewFileMetadata {
            name: "report_2025-01-01_00-00-00".to_string(),
            mime_type: "text/csv".to_string(),
            parents: vec!["f1".to_string()],
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["mimeType"], "text/csv");
        assert_eq!(json["parents"][0], "f1");
    }
}
