//! Google Drive API connector implementation
//!
//! Implements the `DriveService` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::storage::{
    DriveService, FileQuery, MediaChunk, NewFileMetadata, RemoteFile, UploadSession, UploadStatus,
    FOLDER_MIME_TYPE,
};
use bytes::Bytes;
use core_runtime::config::{DriveConfig, DEFAULT_API_BASE_URL, DEFAULT_UPLOAD_BASE_URL};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::DriveError;
use crate::query::{render_filter, render_order};
use crate::types::{CreatedFile, FilesListResponse, FolderMetadata};

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,mimeType,size,createdTime,modifiedTime,parents,trashed";

/// `308 Resume Incomplete` of the resumable upload protocol
const STATUS_RESUME_INCOMPLETE: u16 = 308;

/// `416 Range Not Satisfiable`, returned for ranged reads of empty files
const STATUS_RANGE_NOT_SATISFIABLE: u16 = 416;

/// Google Drive API connector
///
/// Implements `DriveService` for Google Drive API v3. Every method issues a
/// single request; failures are reported, never retried.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::storage::{DriveService, FileQuery};
///
/// let connector = GoogleDriveConnector::new(http_client, access_token);
/// let files = connector.list_files(&FileQuery::new().name_equals("Reports")).await?;
/// ```
pub struct GoogleDriveConnector {
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,

    api_base_url: String,

    upload_base_url: String,

    request_timeout: Duration,
}

impl GoogleDriveConnector {
    /// Create a connector for the public Drive endpoints
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with a Drive scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Create a connector from a validated configuration
    pub fn from_config(config: &DriveConfig) -> Self {
        Self {
            http_client: Arc::clone(&config.http_client),
            access_token: config.access_token.clone(),
            api_base_url: config.api_base_url.clone(),
            upload_base_url: config.upload_base_url.clone(),
            request_timeout: config.request_timeout,
        }
    }

    fn request(&self, method: HttpMethod, url: impl Into<String>) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer_token(&self.access_token)
            .timeout(self.request_timeout)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http_client.execute(request).await?;
        debug!(status = response.status, "Drive API responded");
        Ok(response)
    }

    fn api_error(response: &HttpResponse) -> DriveError {
        let message = String::from_utf8_lossy(&response.body).to_string();
        warn!(status = response.status, "Drive API request failed");
        DriveError::ApiError {
            status_code: response.status,
            message,
        }
    }

    fn parse_created(response: &HttpResponse, what: &str) -> Result<String> {
        let created: CreatedFile = serde_json::from_slice(&response.body).map_err(|e| {
            DriveError::ParseError(format!("Failed to parse {} response: {}", what, e))
        })?;
        Ok(created.id)
    }

    fn build_list_url(&self, query: &FileQuery) -> String {
        let mut url = format!(
            "{}/files?spaces=drive&fields={}",
            self.api_base_url,
            urlencoding::encode(&format!("files({})", FILE_FIELDS))
        );

        if let Some(filter) = render_filter(query) {
            url.push_str(&format!("&q={}", urlencoding::encode(&filter)));
        }
        if let Some(order) = query.order() {
            url.push_str(&format!("&orderBy={}", urlencoding::encode(render_order(order))));
        }
        if let Some(page_size) = query.limit() {
            url.push_str(&format!("&pageSize={}", page_size));
        }

        url
    }
}

/// Total size from a `Content-Range` value such as `bytes 0-99/1234` or `bytes */0`
fn parse_content_range_total(value: &str) -> Option<u64> {
    let total = value.trim().rsplit('/').next()?;
    total.parse().ok()
}

/// Offset following the persisted bytes, from a `Range` value such as `bytes=0-524287`
fn parse_range_next_offset(value: &str) -> Option<u64> {
    let end = value.trim().strip_prefix("bytes=")?.split('-').nth(1)?;
    end.parse::<u64>().ok().map(|last| last + 1)
}

fn content_range(offset: u64, len: u64, total: u64) -> String {
    if len == 0 {
        format!("bytes */{}", total)
    } else {
        format!("bytes {}-{}/{}", offset, offset + len - 1, total)
    }
}

#[async_trait]
impl DriveService for GoogleDriveConnector {
    #[instrument(skip(self, query))]
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<RemoteFile>> {
        let url = self.build_list_url(query);
        let response = self
            .send(
                self.request(HttpMethod::Get, url)
                    .header("Accept", "application/json"),
            )
            .await?;

        if response.status != 200 {
            return Err(Self::api_error(&response).into());
        }

        let list_response: FilesListResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                DriveError::ParseError(format!("Failed to parse files list response: {}", e))
            })?;

        if list_response.next_page_token.is_some() {
            debug!("More results available; only the first page is used");
        }

        let files: Vec<RemoteFile> = list_response.files.into_iter().map(Into::into).collect();
        debug!(count = files.len(), "Listed files");
        Ok(files)
    }

    #[instrument(skip(self))]
    async fn create_folder(&self, name: &str) -> Result<String> {
        let url = format!("{}/files?fields=id", self.api_base_url);
        let body = FolderMetadata {
            name,
            mime_type: FOLDER_MIME_TYPE,
        };

        let response = self
            .send(self.request(HttpMethod::Post, url).json(&body)?)
            .await?;

        if !response.is_success() {
            return Err(Self::api_error(&response).into());
        }

        let id = Self::parse_created(&response, "folder create")?;
        info!(folder_id = %id, "Created Drive folder");
        Ok(id)
    }

    #[instrument(skip(self, metadata), fields(name = %metadata.name))]
    async fn start_upload(
        &self,
        metadata: &NewFileMetadata,
        total_size: u64,
    ) -> Result<UploadSession> {
        let url = format!(
            "{}/files?uploadType=resumable&fields=id",
            self.upload_base_url
        );

        let request = self
            .request(HttpMethod::Post, url)
            .header("X-Upload-Content-Type", metadata.mime_type.clone())
            .header("X-Upload-Content-Length", total_size.to_string())
            .json(metadata)?;

        let response = self.send(request).await?;

        if !response.is_success() {
            return Err(Self::api_error(&response).into());
        }

        let uri = response.header("Location").ok_or_else(|| {
            DriveError::ParseError("Resumable upload response has no Location header".to_string())
        })?;

        debug!(total_size, "Opened resumable upload session");
        Ok(UploadSession {
            uri: uri.to_string(),
            total_size,
        })
    }

    #[instrument(skip(self, session, chunk), fields(len = chunk.len()))]
    async fn upload_chunk(
        &self,
        session: &UploadSession,
        offset: u64,
        chunk: Bytes,
    ) -> Result<UploadStatus> {
        let range = content_range(offset, chunk.len() as u64, session.total_size);
        let request = self
            .request(HttpMethod::Put, session.uri.clone())
            .header("Content-Range", range)
            .body(chunk);

        let response = self.send(request).await?;

        match response.status {
            200 | 201 => {
                let file_id = Self::parse_created(&response, "upload")?;
                Ok(UploadStatus::Complete { file_id })
            }
            STATUS_RESUME_INCOMPLETE => {
                let next_offset = response
                    .header("Range")
                    .and_then(parse_range_next_offset)
                    .unwrap_or(0);
                Ok(UploadStatus::Incomplete { next_offset })
            }
            _ => Err(Self::api_error(&response).into()),
        }
    }

    #[instrument(skip(self))]
    async fn download_chunk(&self, file_id: &str, offset: u64, max_len: u64) -> Result<MediaChunk> {
        let url = format!(
            "{}/files/{}?alt=media",
            self.api_base_url,
            urlencoding::encode(file_id)
        );
        let last = offset + max_len.max(1) - 1;
        let request = self
            .request(HttpMethod::Get, url)
            .header("Range", format!("bytes={}-{}", offset, last));

        let response = self.send(request).await?;

        match response.status {
            206 => {
                let total_size = response
                    .header("Content-Range")
                    .and_then(parse_content_range_total)
                    .ok_or_else(|| {
                        DriveError::ParseError(
                            "Partial content response has no usable Content-Range".to_string(),
                        )
                    })?;
                Ok(MediaChunk {
                    data: response.body,
                    total_size,
                })
            }
            200 => {
                // Range ignored: the body is the whole file.
                let total_size = response.body.len() as u64;
                let start = offset.min(total_size) as usize;
                Ok(MediaChunk {
                    data: response.body.slice(start..),
                    total_size,
                })
            }
            STATUS_RANGE_NOT_SATISFIABLE => {
                let total_size = response
                    .header("Content-Range")
                    .and_then(parse_content_range_total)
                    .unwrap_or(0);
                Ok(MediaChunk {
                    data: Bytes::new(),
                    total_size,
                })
            }
            _ => Err(Self::api_error(&response).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::storage::QueryOrder;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &'static [u8]) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            body: Bytes::from_static(body),
        }
    }

    fn connector(mock_http: MockHttpClient) -> GoogleDriveConnector {
        GoogleDriveConnector::new(Arc::new(mock_http), "test_token".to_string())
    }

    #[test]
    fn test_parse_ranges() {
        assert_eq!(parse_content_range_total("bytes 0-99/1234"), Some(1234));
        assert_eq!(parse_content_range_total("bytes */0"), Some(0));
        assert_eq!(parse_content_range_total("bytes 0-99/*"), None);

        assert_eq!(parse_range_next_offset("bytes=0-524287"), Some(524288));
        assert_eq!(parse_range_next_offset("0-10"), None);

        assert_eq!(content_range(0, 4, 10), "bytes 0-3/10");
        assert_eq!(content_range(8, 2, 10), "bytes 8-9/10");
        assert_eq!(content_range(0, 0, 0), "bytes */0");
    }

    #[tokio::test]
    async fn test_list_files_success() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Get);
            assert_eq!(
                req.headers.get("Authorization"),
                Some(&"Bearer test_token".to_string())
            );
            assert!(req.url.contains("orderBy=modifiedTime%20desc"));
            assert!(req.url.contains("pageSize=1"));
            assert!(req
                .url
                .contains(&*urlencoding::encode("'F1' in parents and name contains 'a\\'b'")));

            Ok(response(
                200,
                &[],
                br#"{
                    "files": [
                        {
                            "id": "file1",
                            "name": "a'b_2025.csv",
                            "mimeType": "text/csv",
                            "modifiedTime": "2025-01-01T00:00:00.000Z",
                            "parents": ["F1"]
                        }
                    ]
                }"#,
            ))
        });

        let query = FileQuery::new()
            .in_parent("F1")
            .name_contains("a'b")
            .order_by(QueryOrder::ModifiedTimeDesc)
            .page_size(1);
        let files = connector(mock_http).list_files(&query).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, "file1");
        assert_eq!(files[0].parent_ids, vec!["F1".to_string()]);
    }

    #[tokio::test]
    async fn test_list_files_api_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(403, &[], b"insufficientPermissions")));

        let result = connector(mock_http).list_files(&FileQuery::new()).await;

        assert!(matches!(
            result,
            Err(bridge_traits::BridgeError::Remote { status_code: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_create_folder_posts_metadata() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Post);
            assert!(req.url.ends_with("/files?fields=id"));
            let body: serde_json::Value = serde_json::from_slice(&req.body.unwrap()).unwrap();
            assert_eq!(body["name"], "Reports");
            assert_eq!(body["mimeType"], FOLDER_MIME_TYPE);

            Ok(response(200, &[], br#"{"id": "F1"}"#))
        });

        let id = connector(mock_http).create_folder("Reports").await.unwrap();
        assert_eq!(id, "F1");
    }

    #[tokio::test]
    async fn test_start_upload_returns_session() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("/upload/drive/v3/files?uploadType=resumable"));
            assert_eq!(req.headers.get("X-Upload-Content-Length"), Some(&"10".to_string()));
            assert_eq!(
                req.headers.get("X-Upload-Content-Type"),
                Some(&"text/csv".to_string())
            );
            let body: serde_json::Value = serde_json::from_slice(&req.body.unwrap()).unwrap();
            assert_eq!(body["parents"][0], "F1");

            Ok(response(
                200,
                &[("location", "https://upload.example/session-1")],
                b"",
            ))
        });

        let metadata = NewFileMetadata {
            name: "report_2025-01-01_00-00-00".to_string(),
            mime_type: "text/csv".to_string(),
            parents: vec!["F1".to_string()],
        };
        let session = connector(mock_http)
            .start_upload(&metadata, 10)
            .await
            .unwrap();

        assert_eq!(session.uri, "https://upload.example/session-1");
        assert_eq!(session.total_size, 10);
    }

    #[tokio::test]
    async fn test_start_upload_without_location_fails() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, &[], b"")));

        let metadata = NewFileMetadata {
            name: "n".to_string(),
            mime_type: "application/zip".to_string(),
            parents: vec![],
        };
        let result = connector(mock_http).start_upload(&metadata, 1).await;

        assert!(matches!(
            result,
            Err(bridge_traits::BridgeError::OperationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_chunk_incomplete_then_complete() {
        let mut mock_http = MockHttpClient::new();
        let mut seq = mockall::Sequence::new();

        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| {
                assert_eq!(req.method, HttpMethod::Put);
                assert_eq!(
                    req.headers.get("Content-Range"),
                    Some(&"bytes 0-3/6".to_string())
                );
                Ok(response(308, &[("Range", "bytes=0-3")], b""))
            });
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| {
                assert_eq!(
                    req.headers.get("Content-Range"),
                    Some(&"bytes 4-5/6".to_string())
                );
                Ok(response(200, &[], br#"{"id": "file-9"}"#))
            });

        let connector = connector(mock_http);
        let session = UploadSession {
            uri: "https://upload.example/session-1".to_string(),
            total_size: 6,
        };

        let first = connector
            .upload_chunk(&session, 0, Bytes::from_static(b"abcd"))
            .await
            .unwrap();
        assert_eq!(first, UploadStatus::Incomplete { next_offset: 4 });

        let second = connector
            .upload_chunk(&session, 4, Bytes::from_static(b"ef"))
            .await
            .unwrap();
        assert_eq!(
            second,
            UploadStatus::Complete {
                file_id: "file-9".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_upload_chunk_without_range_restarts() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(308, &[], b"")));

        let session = UploadSession {
            uri: "https://upload.example/s".to_string(),
            total_size: 6,
        };
        let status = connector(mock_http)
            .upload_chunk(&session, 0, Bytes::from_static(b"abcd"))
            .await
            .unwrap();

        assert_eq!(status, UploadStatus::Incomplete { next_offset: 0 });
    }

    #[tokio::test]
    async fn test_download_chunk_partial_content() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/files/file1?alt=media"));
            assert_eq!(req.headers.get("Range"), Some(&"bytes=4-7".to_string()));
            Ok(response(
                206,
                &[("Content-Range", "bytes 4-7/10")],
                b"4567",
            ))
        });

        let chunk = connector(mock_http)
            .download_chunk("file1", 4, 4)
            .await
            .unwrap();

        assert_eq!(&chunk.data[..], b"4567");
        assert_eq!(chunk.total_size, 10);
    }

    #[tokio::test]
    async fn test_download_chunk_whole_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, &[], b"hello")));

        let chunk = connector(mock_http)
            .download_chunk("file1", 0, 1024)
            .await
            .unwrap();

        assert_eq!(&chunk.data[..], b"hello");
        assert_eq!(chunk.total_size, 5);
    }

    #[tokio::test]
    async fn test_download_chunk_empty_file() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(416, &[("Content-Range", "bytes */0")], b"")));

        let chunk = connector(mock_http)
            .download_chunk("empty", 0, 1024)
            .await
            .unwrap();

        assert!(chunk.data.is_empty());
        assert_eq!(chunk.total_size, 0);
    }

    #[tokio::test]
    async fn test_download_chunk_not_found() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(404, &[], b"File not found")));

        let result = connector(mock_http).download_chunk("missing", 0, 16).await;

        assert!(matches!(
            result,
            Err(bridge_traits::BridgeError::Remote { status_code: 404, .. })
        ));
    }
}
