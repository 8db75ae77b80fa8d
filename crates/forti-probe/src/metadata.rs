//! Firmware discovery for targets without a configured version.

use forti_core::{FirmwareVersion, TargetMetadata};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SystemStatus {
    version: String,
    serial: String,
}

/// Read the running firmware version from `system/status`.
pub fn discover(fetcher: &dyn Fetcher) -> ProbeResult<TargetMetadata> {
    let capability = Capability::SystemStatus;
    let Resolution::Supported(endpoint) = resolve(capability, &FirmwareVersion::ANY.into()) else {
        return Err(ProbeError::Unsupported {
            capability: capability.as_str(),
        });
    };
    let status: SystemStatus = fetch::get(fetcher, endpoint.path, endpoint.query)?;
    let version = FirmwareVersion::parse(&status.version)?;
    debug!(%version, serial = %status.serial, "discovered firmware version");
    Ok(version.into())
}
