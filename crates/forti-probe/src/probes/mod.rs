//! The probe catalogue.
//!
//! A probe is a plain function: resolve endpoints for the target's firmware,
//! fetch, correlate, map categorical fields and emit samples. Any error
//! aborts the invocation; [`Probe::invoke`] turns that into a failed
//! [`ProbeOutcome`] with no samples.

use std::time::Instant;

use forti_core::TargetMetadata;
use tracing::{debug, error};

use crate::emit::MetricSample;
use crate::error::{ProbeError, ProbeResult};
use crate::fetch::Fetcher;

mod central_management;
mod dns_latency;
mod interface_transceivers;
mod ntp_status;
mod performance_status;
mod sandbox;
mod sensor_info;
mod switch_health;
mod switch_port_stats;

pub type ProbeFn = fn(&dyn Fetcher, &TargetMetadata) -> ProbeResult<Vec<MetricSample>>;

/// A named collection unit.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub name: &'static str,
    pub run: ProbeFn,
}

/// Result of one probe invocation. `ok == false` always carries no samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub samples: Vec<MetricSample>,
    pub ok: bool,
}

impl ProbeOutcome {
    pub fn failed() -> Self {
        Self {
            samples: Vec::new(),
            ok: false,
        }
    }
}

impl Probe {
    /// Run the probe to completion. Errors are logged here and never escape.
    pub fn invoke(&self, fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeOutcome {
        let started = Instant::now();
        match (self.run)(fetcher, meta) {
            Ok(samples) => {
                debug!(
                    probe = self.name,
                    samples = samples.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "probe succeeded"
                );
                ProbeOutcome { samples, ok: true }
            }
            Err(e) => {
                error!(probe = self.name, error = %e, "probe failed");
                ProbeOutcome::failed()
            }
        }
    }
}

static CATALOGUE: &[Probe] = &[
    Probe {
        name: "Network/DNSLatency",
        run: dns_latency::probe,
    },
    Probe {
        name: "Switch/Health",
        run: switch_health::probe,
    },
    Probe {
        name: "Switch/PortStats",
        run: switch_port_stats::probe,
    },
    Probe {
        name: "System/CentralManagement/Status",
        run: central_management::probe,
    },
    Probe {
        name: "System/Interface/Transceivers",
        run: interface_transceivers::probe,
    },
    Probe {
        name: "System/NTPStatus",
        run: ntp_status::probe,
    },
    Probe {
        name: "System/PerformanceStatus",
        run: performance_status::probe,
    },
    Probe {
        name: "System/SandboxConnection",
        run: sandbox::connection_probe,
    },
    Probe {
        name: "System/SandboxStats",
        run: sandbox::stats_probe,
    },
    Probe {
        name: "System/SandboxStatus",
        run: sandbox::status_probe,
    },
    Probe {
        name: "System/SensorInfo",
        run: sensor_info::probe,
    },
];

/// Every known probe, sorted by name.
pub fn catalogue() -> &'static [Probe] {
    CATALOGUE
}

pub fn find(name: &str) -> Option<&'static Probe> {
    CATALOGUE.iter().find(|p| p.name == name)
}

/// Resolve a target's probe selection.
///
/// `include` of `None` selects the whole catalogue. Unknown names in either
/// list are rejected. Result order follows the catalogue.
pub fn select(include: Option<&[String]>, exclude: &[String]) -> ProbeResult<Vec<&'static Probe>> {
    for name in include.unwrap_or_default().iter().chain(exclude) {
        if find(name).is_none() {
            return Err(ProbeError::UnknownProbe(name.clone()));
        }
    }

    Ok(CATALOGUE
        .iter()
        .filter(|p| include.is_none_or(|names| names.iter().any(|n| n == p.name)))
        .filter(|p| !exclude.iter().any(|n| n == p.name))
        .collect())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;

    #[test]
    fn catalogue_is_sorted_and_unique() {
        let names: Vec<&str> = catalogue().iter().map(|p| p.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn select_all_by_default() {
        let selected = select(None, &[]).unwrap();
        assert_eq!(selected.len(), catalogue().len());
    }

    #[test]
    fn select_include_and_exclude() {
        let include = vec!["System/SensorInfo".to_string(), "Switch/Health".to_string()];
        let selected = select(Some(&include), &["Switch/Health".to_string()]).unwrap();
        let names: Vec<&str> = selected.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["System/SensorInfo"]);

        let excluded = select(None, &["Switch/PortStats".to_string()]).unwrap();
        assert_eq!(excluded.len(), catalogue().len() - 1);
    }

    #[test]
    fn select_rejects_unknown_names() {
        let err = select(Some(&["System/Nope".to_string()]), &[]).unwrap_err();
        assert!(matches!(err, ProbeError::UnknownProbe(name) if name == "System/Nope"));
        assert!(select(None, &["Bogus".to_string()]).is_err());
    }

    #[test]
    fn fetch_failure_yields_failed_outcome() {
        let fetcher = StaticFetcher::new();
        let probe = find("System/SandboxStatus").unwrap();
        let outcome = probe.invoke(&fetcher, &TargetMetadata::new(7, 4));
        assert_eq!(outcome, ProbeOutcome::failed());
    }
}
