//! # Host Bridge Traits
//!
//! Platform and service abstraction traits used by the Drive file locator.
//!
//! ## Overview
//!
//! This crate defines the contract between the locator and the outside world.
//! Each trait represents a capability the locator needs but that is implemented
//! elsewhere: HTTP transport per platform, the remote storage service per
//! provider, and time per environment (real clock or a test clock).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP
//! - [`DriveService`](storage::DriveService) - Listing, folder creation and chunked transfers
//! - [`Clock`](time::Clock) - Time source for deterministic naming
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep remote status codes in
//! [`BridgeError::Remote`](error::BridgeError::Remote).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc`.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{
    DriveService, FileQuery, MediaChunk, NewFileMetadata, QueryClause, QueryOrder, RemoteFile,
    UploadSession, UploadStatus, FOLDER_MIME_TYPE,
};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
