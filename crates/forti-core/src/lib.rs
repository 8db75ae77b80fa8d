//! forti-core — shared types for the FortiGate probe exporter.
//!
//! Holds the per-target firmware metadata every probe reads, and the TOML
//! configuration that names the devices to scrape.

pub mod config;
pub mod error;
pub mod version;

pub use config::{ExporterConfig, ServerConfig, TargetConfig};
pub use error::{CoreError, CoreResult};
pub use version::{FirmwareVersion, TargetMetadata};
