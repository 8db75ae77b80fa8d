//! forti-api — HTTP surface of the FortiGate exporter.
//!
//! Each configured target is scraped on demand, following the Prometheus
//! multi-target exporter pattern.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/probe?target=<name>` | Scrape one target, Prometheus exposition |
//! | GET | `/healthz` | Liveness |

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use forti_core::FirmwareVersion;
use forti_probe::{Fetcher, Probe};

/// A scrape target as the router sees it.
#[derive(Clone)]
pub struct Target {
    pub name: String,
    pub fetcher: Arc<dyn Fetcher>,
    /// Configured firmware version; `None` triggers discovery per scrape.
    pub version: Option<FirmwareVersion>,
    pub probes: Vec<&'static Probe>,
}

/// Shared state for the handlers: targets by name.
#[derive(Clone, Default)]
pub struct ExporterState {
    targets: Arc<HashMap<String, Target>>,
}

impl ExporterState {
    pub fn new(targets: impl IntoIterator<Item = Target>) -> Self {
        let targets = targets.into_iter().map(|t| (t.name.clone(), t)).collect();
        Self {
            targets: Arc::new(targets),
        }
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn target_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Build the exporter router.
pub fn build_router(state: ExporterState) -> Router {
    Router::new()
        .route("/probe", get(handlers::probe))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
