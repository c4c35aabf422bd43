//! Google Drive API response types
//!
//! Data structures for (de)serializing Google Drive API v3 payloads.

use bridge_traits::storage::RemoteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Google Drive API file resource
///
/// Only the fields requested through `fields=` are present, so everything but
/// the id is optional.
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// File size in bytes, encoded as a string (omitted for folders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Creation time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,

    /// Modification time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,

    #[serde(default)]
    pub parents: Vec<String>,

    #[serde(default)]
    pub trashed: bool,
}

fn parse_timestamp(rfc3339: Option<&str>) -> Option<DateTime<Utc>> {
    rfc3339
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

impl From<DriveFile> for RemoteFile {
    fn from(file: DriveFile) -> Self {
        RemoteFile {
            created_at: parse_timestamp(file.created_time.as_deref()),
            modified_at: parse_timestamp(file.modified_time.as_deref()),
            size: file.size.and_then(|s| s.parse().ok()),
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            parent_ids: file.parents,
            trashed: file.trashed,
        }
    }
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for the next page; never followed
    pub next_page_token: Option<String>,
}

/// Body of a files.create request for a folder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMetadata<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
}

/// Response of files.create and of a completed upload with `fields=id`
#[derive(Debug, Deserialize)]
pub struct CreatedFile {
    pub id: String,
}
