//! Endpoint resolution. Maps a capability and firmware version to the API
//! path that serves it.
//!
//! Each capability owns a static table of version ranges ordered newest to
//! oldest. The first range whose lower bound is at or below the target's
//! version wins; when none matches the capability is [`Resolution::Unsupported`].

use std::fmt;

use forti_core::{FirmwareVersion, TargetMetadata};
use tracing::debug;

/// A monitoring capability exposed by some range of firmware versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SwitchHealth,
    SwitchStatus,
    SwitchPortStats,
    NtpStatus,
    SensorInfo,
    /// Alarm and threshold fields of the sensor-info resource.
    SensorThresholds,
    PerformanceStatus,
    DnsLatency,
    CentralManagement,
    SandboxStatus,
    SandboxStats,
    SandboxConnection,
    InterfaceTransceivers,
    SystemStatus,
}

impl Capability {
    pub const ALL: [Capability; 14] = [
        Capability::SwitchHealth,
        Capability::SwitchStatus,
        Capability::SwitchPortStats,
        Capability::NtpStatus,
        Capability::SensorInfo,
        Capability::SensorThresholds,
        Capability::PerformanceStatus,
        Capability::DnsLatency,
        Capability::CentralManagement,
        Capability::SandboxStatus,
        Capability::SandboxStats,
        Capability::SandboxConnection,
        Capability::InterfaceTransceivers,
        Capability::SystemStatus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::SwitchHealth => "switch-health",
            Capability::SwitchStatus => "switch-status",
            Capability::SwitchPortStats => "switch-port-stats",
            Capability::NtpStatus => "ntp-status",
            Capability::SensorInfo => "sensor-info",
            Capability::SensorThresholds => "sensor-thresholds",
            Capability::PerformanceStatus => "performance-status",
            Capability::DnsLatency => "dns-latency",
            Capability::CentralManagement => "central-management",
            Capability::SandboxStatus => "sandbox-status",
            Capability::SandboxStats => "sandbox-stats",
            Capability::SandboxConnection => "sandbox-connection",
            Capability::InterfaceTransceivers => "interface-transceivers",
            Capability::SystemStatus => "system-status",
        }
    }

    /// Version ranges for this capability, newest first.
    pub fn ranges(self) -> &'static [VersionRange] {
        match self {
            Capability::SwitchHealth => SWITCH_HEALTH,
            Capability::SwitchStatus => SWITCH_STATUS,
            Capability::SwitchPortStats => SWITCH_PORT_STATS,
            Capability::NtpStatus => NTP_STATUS,
            Capability::SensorInfo => SENSOR_INFO,
            Capability::SensorThresholds => SENSOR_THRESHOLDS,
            Capability::PerformanceStatus => PERFORMANCE_STATUS,
            Capability::DnsLatency => DNS_LATENCY,
            Capability::CentralManagement => CENTRAL_MANAGEMENT,
            Capability::SandboxStatus => SANDBOX_STATUS,
            Capability::SandboxStats => SANDBOX_STATS,
            Capability::SandboxConnection => SANDBOX_CONNECTION,
            Capability::InterfaceTransceivers => INTERFACE_TRANSCEIVERS,
            Capability::SystemStatus => SYSTEM_STATUS,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API path plus its fixed query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub query: &'static str,
}

/// Endpoint served from `since` onwards, until a newer range takes over.
#[derive(Debug, Clone, Copy)]
pub struct VersionRange {
    pub since: FirmwareVersion,
    pub endpoint: Endpoint,
}

/// Outcome of endpoint resolution. `Unsupported` is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Supported(Endpoint),
    Unsupported,
}

impl Resolution {
    pub fn endpoint(self) -> Option<Endpoint> {
        match self {
            Resolution::Supported(endpoint) => Some(endpoint),
            Resolution::Unsupported => None,
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, Resolution::Supported(_))
    }
}

/// Resolve `capability` for the target described by `meta`.
pub fn resolve(capability: Capability, meta: &TargetMetadata) -> Resolution {
    let version = meta.version();
    let resolution = capability
        .ranges()
        .iter()
        .find(|r| version.at_least(r.since))
        .map_or(Resolution::Unsupported, |r| Resolution::Supported(r.endpoint));
    debug!(%capability, %version, ?resolution, "resolved endpoint");
    resolution
}

const fn range(major: u32, minor: u32, path: &'static str, query: &'static str) -> VersionRange {
    VersionRange {
        since: FirmwareVersion::new(major, minor),
        endpoint: Endpoint { path, query },
    }
}

const SWITCH_HEALTH: &[VersionRange] = &[
    range(7, 6, "api/v2/monitor/switch-controller/managed-switch/health-status", "vdom=root"),
    range(0, 0, "api/v2/monitor/switch-controller/managed-switch/health", "vdom=root"),
];

const SWITCH_STATUS: &[VersionRange] = &[
    range(7, 0, "api/v2/monitor/switch-controller/managed-switch/status", ""),
    range(0, 0, "api/v2/monitor/switch-controller/managed-switch", "port_stats=true"),
];

// Older firmware embeds port counters in the switch status response.
const SWITCH_PORT_STATS: &[VersionRange] = &[range(
    7,
    0,
    "api/v2/monitor/switch-controller/managed-switch/port-stats",
    "",
)];

const NTP_STATUS: &[VersionRange] = &[range(7, 4, "api/v2/monitor/system/ntp/status", "vdom=*")];

const SENSOR_INFO: &[VersionRange] =
    &[range(0, 0, "api/v2/monitor/system/sensor-info", "vdom=root")];

const SENSOR_THRESHOLDS: &[VersionRange] =
    &[range(7, 0, "api/v2/monitor/system/sensor-info", "vdom=root")];

const PERFORMANCE_STATUS: &[VersionRange] =
    &[range(0, 0, "api/v2/monitor/system/performance/status", "vdom=*")];

const DNS_LATENCY: &[VersionRange] = &[range(0, 0, "api/v2/monitor/network/dns/latency", "")];

const CENTRAL_MANAGEMENT: &[VersionRange] = &[range(
    0,
    0,
    "api/v2/monitor/system/central-management/status",
    "skip_detect=true",
)];

const SANDBOX_STATUS: &[VersionRange] = &[range(0, 0, "api/v2/monitor/system/sandbox/status", "")];

const SANDBOX_STATS: &[VersionRange] = &[range(0, 0, "api/v2/monitor/system/sandbox/stats", "")];

const SANDBOX_CONNECTION: &[VersionRange] =
    &[range(0, 0, "api/v2/monitor/system/sandbox/connection", "")];

const INTERFACE_TRANSCEIVERS: &[VersionRange] = &[range(
    0,
    0,
    "api/v2/monitor/system/interface/transceivers",
    "scope=global",
)];

const SYSTEM_STATUS: &[VersionRange] = &[range(0, 0, "api/v2/monitor/system/status", "")];
