//! # Google Drive Provider
//!
//! Implements [`DriveService`](bridge_traits::storage::DriveService) for the
//! Google Drive API v3 and builds the file locator on top of it.
//!
//! ## Overview
//!
//! This module provides:
//! - Folder get-or-create by exact name
//! - Latest-file lookup by name fragment, newest modification first
//! - Chunked downloads using byte-range requests
//! - Chunked resumable uploads with timestamped file names
//! - CSV table and zip archive convenience wrappers
//!
//! Authentication is out of scope: the caller supplies a ready bearer token
//! through [`DriveConfig`](core_runtime::config::DriveConfig).
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::DriveConfig;
//! use provider_google_drive::{RemoteFileLocator, TransferOptions};
//!
//! let config = DriveConfig::builder().access_token(token).build()?;
//! let locator = RemoteFileLocator::from_config(&config);
//!
//! if let Some(id) = locator.find_latest_file(Some("_2025"), "Reports").await? {
//!     locator.download_to(&id, "report.csv".as_ref(), &TransferOptions::new()).await?;
//! }
//! ```

pub mod connector;
pub mod error;
pub mod locator;
pub mod naming;
pub mod query;
pub mod tabular;
pub mod transfer;
pub mod types;

pub use connector::GoogleDriveConnector;
pub use error::{DriveError, ErrorKind, Result};
pub use locator::{RemoteFileLocator, CSV_MIME_TYPE, FOLDER_LOOKUP_PAGE_SIZE, ZIP_MIME_TYPE};
pub use naming::{timestamped_name, TIMESTAMP_FORMAT};
pub use tabular::Table;
pub use transfer::{
    ProgressCallback, TransferDirection, TransferOptions, TransferProgress, UploadSource,
};
