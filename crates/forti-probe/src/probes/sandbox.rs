//! FortiSandbox integration: signature database, scan statistics and
//! connection state.

use forti_core::TargetMetadata;
use serde::Deserialize;
use tracing::debug;

use crate::categorical::SANDBOX_CONNECTION;
use crate::emit::{Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

static SIGNATURE_COUNT: MetricIdentity = MetricIdentity::gauge(
    "fortigate_sandbox_status_signature_count",
    "Sandbox signature counts",
    &["server", "region", "version", "type"],
);

static DETECTED: MetricIdentity =
    MetricIdentity::counter("fortigate_sandbox_stats_detected", "Number of detected files", &[]);
static CLEAN: MetricIdentity =
    MetricIdentity::counter("fortigate_sandbox_stats_clean", "Number of clean files", &[]);
static RISK_LOW: MetricIdentity = MetricIdentity::counter(
    "fortigate_sandbox_stats_risk_low",
    "Number of low risk files detected",
    &[],
);
static RISK_MEDIUM: MetricIdentity = MetricIdentity::counter(
    "fortigate_sandbox_stats_risk_medium",
    "Number of medium risk files detected",
    &[],
);
static RISK_HIGH: MetricIdentity = MetricIdentity::counter(
    "fortigate_sandbox_stats_risk_high",
    "Number of high risk files detected",
    &[],
);
static SUBMITTED: MetricIdentity =
    MetricIdentity::counter("fortigate_sandbox_stats_submitted", "Number of submitted files", &[]);

static CONNECTION: MetricIdentity = MetricIdentity::gauge(
    "fortigate_sandbox_connection_status",
    "Sandbox connection status, (unknown=-2, disabled=-1, unreachable=0, reachable=1)",
    &["type"],
);

#[derive(Debug, Deserialize)]
struct Results<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SandboxStatus {
    server: String,
    #[serde(rename = "type")]
    kind: String,
    cloud_region: String,
    malware_package_version: String,
    signatures_count: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SandboxStats {
    detected: f64,
    clean: f64,
    risk_low: f64,
    risk_med: f64,
    risk_high: f64,
    submitted: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SandboxConnection {
    status: String,
    #[serde(rename = "type")]
    kind: String,
}

pub(super) fn status_probe(
    fetcher: &dyn Fetcher,
    meta: &TargetMetadata,
) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::SandboxStatus, meta) else {
        return Ok(Vec::new());
    };
    let response: Results<SandboxStatus> = fetch::get(fetcher, endpoint.path, endpoint.query)?;

    let mut out = Emitter::new();
    for s in &response.results {
        out.emit(
            &SIGNATURE_COUNT,
            s.signatures_count,
            &[&s.server, &s.cloud_region, &s.malware_package_version, &s.kind],
        )?;
    }
    Ok(out.finish())
}

pub(super) fn stats_probe(
    fetcher: &dyn Fetcher,
    meta: &TargetMetadata,
) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::SandboxStats, meta) else {
        return Ok(Vec::new());
    };
    let response: Results<SandboxStats> = fetch::get(fetcher, endpoint.path, endpoint.query)?;

    // The families are unlabelled, so only one record can be exposed.
    if response.results.len() > 1 {
        debug!(records = response.results.len(), "reporting the first sandbox stats record");
    }
    let mut out = Emitter::new();
    if let Some(s) = response.results.first() {
        out.emit(&DETECTED, s.detected, &[])?;
        out.emit(&CLEAN, s.clean, &[])?;
        out.emit(&RISK_LOW, s.risk_low, &[])?;
        out.emit(&RISK_MEDIUM, s.risk_med, &[])?;
        out.emit(&RISK_HIGH, s.risk_high, &[])?;
        out.emit(&SUBMITTED, s.submitted, &[])?;
    }
    Ok(out.finish())
}

pub(super) fn connection_probe(
    fetcher: &dyn Fetcher,
    meta: &TargetMetadata,
) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::SandboxConnection, meta) else {
        return Ok(Vec::new());
    };
    let response: Results<SandboxConnection> =
        fetch::get(fetcher, endpoint.path, endpoint.query)?;

    let mut out = Emitter::new();
    for c in &response.results {
        out.emit(&CONNECTION, SANDBOX_CONNECTION.map(&c.status), &[&c.kind])?;
    }
    Ok(out.finish())
}
