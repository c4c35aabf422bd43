//! # Core Runtime Module
//!
//! Provides the ambient runtime infrastructure for the Drive file locator:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! Connectors and the locator take a validated [`DriveConfig`](config::DriveConfig)
//! and log through `tracing`; hosts call [`init_logging`](logging::init_logging)
//! once at startup.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{DriveConfig, DriveConfigBuilder};
pub use error::{Error, Result};
