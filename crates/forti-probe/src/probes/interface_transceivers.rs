//! Optical transceivers plugged into FortiGate interfaces, exposed as an
//! info gauge.

use forti_core::TargetMetadata;
use serde::Deserialize;

use crate::emit::{Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

// Family name keeps the historical spelling so existing dashboards match.
static TRANSCEIVER: MetricIdentity = MetricIdentity::gauge(
    "fortigate_inteface_transceivers",
    "Interface transceivers information",
    &["interface", "type", "vendor", "vendorpartnumber", "vendorserialnumber"],
);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Transceivers {
    results: Vec<Transceiver>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Transceiver {
    interface: String,
    #[serde(rename = "type")]
    kind: String,
    vendor: String,
    vendor_part_number: String,
    vendor_serial_number: String,
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::InterfaceTransceivers, meta) else {
        return Ok(Vec::new());
    };
    let transceivers: Transceivers = fetch::get(fetcher, endpoint.path, endpoint.query)?;

    let mut out = Emitter::new();
    for t in &transceivers.results {
        out.emit(
            &TRANSCEIVER,
            1.0,
            &[
                &t.interface,
                &t.kind,
                &t.vendor,
                &t.vendor_part_number,
                &t.vendor_serial_number,
            ],
        )?;
    }
    Ok(out.finish())
}
