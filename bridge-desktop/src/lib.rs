//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls, connection pooling and
//!   redirects disabled so resumable-upload `308` answers reach the caller.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let config = DriveConfig::builder()
//!     .http_client(http_client)
//!     .access_token(token)
//!     .build()?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
