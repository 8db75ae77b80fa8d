//! Latency of the DNS servers FortiGate resolves against.

use forti_core::TargetMetadata;
use serde::Deserialize;

use crate::emit::{Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

static LATENCY: MetricIdentity =
    MetricIdentity::gauge("fortigate_network_dns_latency", "Network dns latency", &["service", "ip"]);
static LATEST_UPDATE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_network_dns_latest_update",
    "Network dns last update",
    &["service", "ip"],
);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DnsLatency {
    results: Vec<DnsServer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DnsServer {
    service: String,
    ip: String,
    latency: f64,
    last_update: f64,
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::DnsLatency, meta) else {
        return Ok(Vec::new());
    };
    let latency: DnsLatency = fetch::get(fetcher, endpoint.path, endpoint.query)?;

    let mut out = Emitter::new();
    for server in &latency.results {
        let labels = [server.service.as_str(), &server.ip];
        out.emit(&LATENCY, server.latency, &labels)?;
        out.emit(&LATEST_UPDATE, server.last_update, &labels)?;
    }
    Ok(out.finish())
}
