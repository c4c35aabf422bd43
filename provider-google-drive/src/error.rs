//! Error types for the Google Drive provider

use bridge_traits::error::BridgeError;
use std::path::PathBuf;
use thiserror::Error;

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum DriveError {
    /// API request returned a non-success status
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The service stopped making progress during a chunked transfer
    #[error("Transfer stalled at byte {offset} of {total}")]
    TransferStalled { offset: u64, total: u64 },

    /// Local file could not be opened, read or written
    #[error("Local I/O error on {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// CSV payload could not be parsed or produced
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),

    /// Transfer cancelled by token or progress callback
    #[error("Transfer cancelled")]
    Cancelled,

    /// Bridge error raised by the service client
    #[error(transparent)]
    BridgeError(BridgeError),
}

/// Coarse failure category, stable across variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote service or network failure during list/create/transfer
    Transport,
    /// Local destination or source file failure
    LocalIo,
    /// Rejected before any remote call
    InvalidInput,
    /// Delimited-text parsing or serialization failure
    Table,
    Cancelled,
}

impl DriveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriveError::ApiError { .. }
            | DriveError::ParseError(_)
            | DriveError::TransferStalled { .. }
            | DriveError::BridgeError(_) => ErrorKind::Transport,
            DriveError::LocalIo { .. } => ErrorKind::LocalIo,
            DriveError::InvalidInput(_) => ErrorKind::InvalidInput,
            DriveError::Table(_) => ErrorKind::Table,
            DriveError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriveError::LocalIo {
            path: path.into(),
            source,
        }
    }
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, DriveError>;

impl From<BridgeError> for DriveError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Remote {
                status_code,
                message,
            } => DriveError::ApiError {
                status_code,
                message,
            },
            other => DriveError::BridgeError(other),
        }
    }
}

impl From<DriveError> for BridgeError {
    fn from(error: DriveError) -> Self {
        match error {
            DriveError::ApiError {
                status_code,
                message,
            } => BridgeError::Remote {
                status_code,
                message,
            },
            DriveError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            DriveError::LocalIo { source, .. } => BridgeError::Io(source),
            DriveError::BridgeError(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
