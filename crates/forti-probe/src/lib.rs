//! forti-probe — probe execution for the FortiGate exporter.
//!
//! A probe turns a handful of FortiOS monitoring API responses into metric
//! samples for one scrape. Probes are synchronous, stateless functions; the
//! transport behind [`Fetcher`] owns timeouts and authentication.
//!
//! # Architecture
//!
//! ```text
//! Probe::invoke(fetcher, meta)
//!   ├── resolver::resolve()     capability + firmware → endpoint | Unsupported
//!   ├── fetch::get::<T>()       Fetcher::get_json() → typed response
//!   ├── correlate::merge()      join two facets of the same entities by key
//!   ├── categorical::*.map()    status strings → gauge values
//!   └── Emitter::emit()         static MetricIdentity + labels → MetricSample
//!
//! metadata::discover()          system/status → TargetMetadata
//! ```

pub mod categorical;
pub mod correlate;
pub mod emit;
pub mod error;
pub mod fetch;
pub mod metadata;
pub mod probes;
pub mod resolver;

pub use emit::{Emitter, MetricIdentity, MetricKind, MetricSample};
pub use error::{FetchError, FetchResult, ProbeError, ProbeResult};
pub use fetch::{Fetcher, StaticFetcher};
pub use probes::{Probe, ProbeOutcome};
pub use resolver::{Capability, Endpoint, Resolution};
