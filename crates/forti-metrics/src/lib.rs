//! forti-metrics — scrape collection and exposition for the FortiGate exporter.
//!
//! Runs the selected probes of one target concurrently, folds their outcomes
//! into a [`ScrapeReport`] and renders samples in the Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! scrape(fetcher, meta, probes)
//!   ├── spawn_blocking(Probe::invoke) ← one task per probe
//!   └── ScrapeReport
//!         └── samples() → probe samples + exporter_probe_{success,duration}
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for the /probe endpoint
//! ```

pub mod collector;
pub mod prometheus;

pub use collector::{discovery_failure, scrape, ProbeReport, ScrapeReport};
pub use prometheus::{render_prometheus, CONTENT_TYPE};
