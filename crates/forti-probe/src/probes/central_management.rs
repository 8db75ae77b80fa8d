//! Connection to the central management server (FortiManager or
//! FortiGate Cloud).

use forti_core::TargetMetadata;
use serde::Deserialize;

use crate::categorical::{MANAGEMENT_MODE, MANAGEMENT_STATUS, REGISTRATION_STATUS};
use crate::emit::{label_number, Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

const LABELS: &[&str] = &["server", "mgmt_ip", "mgmt_port", "sn", "pendfortman"];

static MODE: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_central_management_mode",
    "Operating mode of the central management. (Normal = 1, Backup = 2)",
    LABELS,
);
static STATUS: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_central_management_status",
    "Status of the connection from FortiGate to the central management server. (unknown = -1, down = 0, up = 1, handshake = 2)",
    LABELS,
);
static REGISTRATION: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_central_management_registration_status",
    "Status of the registration from FortiGate to the central management server. (unknown = -1, in_progress = 1, registered = 0, unregistered = 2)",
    LABELS,
);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CentralManagement {
    results: ManagementStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManagementStatus {
    mode: String,
    server: String,
    status: String,
    registration_status: String,
    mgmt_ip: String,
    mgmt_port: f64,
    sn: String,
    pending_fortimanager: String,
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::CentralManagement, meta) else {
        return Ok(Vec::new());
    };
    let response: CentralManagement = fetch::get(fetcher, endpoint.path, endpoint.query)?;
    let status = &response.results;

    let port = label_number(status.mgmt_port);
    let labels = [
        status.server.as_str(),
        &status.mgmt_ip,
        &port,
        &status.sn,
        &status.pending_fortimanager,
    ];

    let mut out = Emitter::new();
    out.emit(&MODE, MANAGEMENT_MODE.map(&status.mode), &labels)?;
    out.emit(&STATUS, MANAGEMENT_STATUS.map(&status.status), &labels)?;
    out.emit(
        &REGISTRATION,
        REGISTRATION_STATUS.map(&status.registration_status),
        &labels,
    )?;
    Ok(out.finish())
}
