//! # Drive Configuration Module
//!
//! Provides configuration management for the Drive file locator.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `DriveConfig`
//! instance that holds the injected dependencies and transfer settings. It
//! enforces fail-fast validation so a misconfigured locator never reaches the
//! network.
//!
//! ## Required Dependencies
//!
//! - Access token - OAuth 2.0 bearer token obtained by the caller
//! - `HttpClient` - HTTP transport (desktop default: reqwest, with `desktop-shims`)
//!
//! ## Optional Settings
//!
//! - API and upload base URLs (default: Google Drive v3)
//! - Chunk size for transfers (default: 1 MiB, multiple of 256 KiB)
//! - Per-request timeout (default: 60 s)
//! - `Clock` used to timestamp uploaded names (default: `SystemClock`)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::DriveConfig;
//! use std::sync::Arc;
//!
//! let config = DriveConfig::builder()
//!     .access_token(token)
//!     .http_client(Arc::new(MyHttpClient))
//!     .chunk_size(4 * 1024 * 1024)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::DriveConfig;
//!
//! // Missing access token
//! let config = DriveConfig::builder()
//!     .build()
//!     .expect("Should fail - missing access token");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Google Drive v3 metadata endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive v3 media upload endpoint
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Resumable upload chunks must be a multiple of this many bytes
pub const CHUNK_ALIGNMENT: usize = 256 * 1024;

/// Default transfer chunk size (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 4 * CHUNK_ALIGNMENT;

/// Largest accepted transfer chunk size (64 MiB)
pub const MAX_CHUNK_SIZE: usize = 256 * CHUNK_ALIGNMENT;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the Drive connector and locator.
///
/// Use [`DriveConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct DriveConfig {
    /// OAuth 2.0 access token sent as a bearer token
    pub access_token: String,

    /// HTTP client used for every API request
    pub http_client: Arc<dyn HttpClient>,

    /// Base URL for metadata requests
    pub api_base_url: String,

    /// Base URL for media uploads
    pub upload_base_url: String,

    /// Bytes moved per transfer request
    pub chunk_size: usize,

    /// Timeout applied to each request
    pub request_timeout: Duration,

    /// Time source for timestamped file names
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveConfig")
            .field("access_token", &"[REDACTED]")
            .field("http_client", &"HttpClient { ... }")
            .field("api_base_url", &self.api_base_url)
            .field("upload_base_url", &self.upload_base_url)
            .field("chunk_size", &self.chunk_size)
            .field("request_timeout", &self.request_timeout)
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

impl DriveConfig {
    /// Creates a new builder for constructing a `DriveConfig`.
    pub fn builder() -> DriveConfigBuilder {
        DriveConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Access token is not blank
    /// - Base URLs are absolute http(s) URLs
    /// - Chunk size is a positive multiple of 256 KiB, at most 64 MiB
    /// - Request timeout is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(Error::Config("Access token cannot be empty".to_string()));
        }

        validate_base_url("API base URL", &self.api_base_url)?;
        validate_base_url("Upload base URL", &self.upload_base_url)?;

        if self.chunk_size == 0 || self.chunk_size % CHUNK_ALIGNMENT != 0 {
            return Err(Error::Config(format!(
                "Chunk size must be a positive multiple of {} bytes, got {}",
                CHUNK_ALIGNMENT, self.chunk_size
            )));
        }

        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "Chunk size exceeds maximum of {} bytes",
                MAX_CHUNK_SIZE
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_base_url(label: &str, url: &str) -> Result<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(Error::Config(format!(
            "{} must be an absolute http(s) URL, got '{}'",
            label, url
        )));
    }
    if url.ends_with('/') {
        return Err(Error::Config(format!(
            "{} must not end with '/', got '{}'",
            label, url
        )));
    }
    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for Drive API requests. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Tests: inject a mock HttpClient."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`DriveConfig`] instances.
#[derive(Default)]
pub struct DriveConfigBuilder {
    access_token: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    api_base_url: Option<String>,
    upload_base_url: Option<String>,
    chunk_size: Option<usize>,
    request_timeout: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl DriveConfigBuilder {
    /// Sets the OAuth 2.0 access token (required).
    ///
    /// The token needs a Drive scope that allows creating files,
    /// e.g. `https://www.googleapis.com/auth/drive.file`.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Overrides the metadata endpoint, e.g. to point at a local emulator.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Overrides the media upload endpoint.
    pub fn upload_base_url(mut self, url: impl Into<String>) -> Self {
        self.upload_base_url = Some(url.into());
        self
    }

    /// Sets the transfer chunk size in bytes.
    ///
    /// Default: 1 MiB
    ///
    /// ```
    /// use core_runtime::config::DriveConfig;
    ///
    /// let builder = DriveConfig::builder().chunk_size(8 * 256 * 1024);
    /// ```
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the clock used for timestamped names.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - `Error::Config` when the access token is missing or a setting is invalid
    /// - `Error::CapabilityMissing` when no HTTP client is available
    pub fn build(self) -> Result<DriveConfig> {
        let access_token = self.access_token.ok_or_else(|| {
            Error::Config(
                "Access token is required. Use .access_token() to set it.".to_string(),
            )
        })?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let config = DriveConfig {
            access_token,
            http_client,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            upload_base_url: self
                .upload_base_url
                .unwrap_or_else(|| DEFAULT_UPLOAD_BASE_URL.to_string()),
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            request_timeout,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;

        Ok(config)
    }
}
