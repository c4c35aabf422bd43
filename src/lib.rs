//! Workspace placeholder crate.
//!
//! Re-exports the Drive file locator and its configuration so host
//! applications can depend on `drive-tools` alone. The `desktop-shims`
//! feature (on by default) wires the reqwest-backed HTTP client into
//! [`DriveConfig::builder`].

pub use bridge_traits::{Clock, DriveService, HttpClient, SystemClock};
pub use core_runtime::config::{DriveConfig, DriveConfigBuilder};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
pub use provider_google_drive::{
    DriveError, ErrorKind, GoogleDriveConnector, ProgressCallback, RemoteFileLocator, Table,
    TransferOptions, TransferProgress, UploadSource,
};
