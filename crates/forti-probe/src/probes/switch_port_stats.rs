//! Managed FortiSwitch connection status, port state and port traffic
//! counters.
//!
//! From 7.0 the switch list and the per-port counters live behind two
//! endpoints and are joined by switch serial. Older firmware returns the
//! counters inline with `port_stats=true`.

use std::collections::BTreeMap;

use forti_core::TargetMetadata;
use serde::Deserialize;
use tracing::debug;

use crate::categorical::{AUTHORIZATION_STATE, DUPLEX, LINK_STATUS, SWITCH_CONNECTION};
use crate::correlate::{merge, Keyed};
use crate::emit::{label_number, Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

const PORT_LABELS: &[&str] = &["vdom", "name", "serial_number", "interface", "vlan", "duplex"];
const COUNTER_LABELS: &[&str] = &["vdom", "name", "serial_number", "interface"];

static SWITCH_STATUS: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_status",
    "Whether the switch is connected or not",
    &["vdom", "name", "serial_number", "fgt_peer_intf_name", "connection_from", "state"],
);
static PORT_STATUS: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_port_status",
    "Whether the switch port is up or not",
    PORT_LABELS,
);
static PORT_SPEED: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_port_speed_bps",
    "Speed negotiated on the interface in bits/s",
    PORT_LABELS,
);
static PORT_DUPLEX: MetricIdentity = MetricIdentity::gauge(
    "fortiswitch_port_duplex_status",
    "Duplex status of the FortiSwitch port",
    PORT_LABELS,
);

macro_rules! counter {
    ($ident:ident, $name:literal, $help:literal) => {
        static $ident: MetricIdentity = MetricIdentity::counter($name, $help, COUNTER_LABELS);
    };
}

counter!(TX_PACKETS, "fortiswitch_port_transmit_packets_total", "Number of packets transmitted on the interface");
counter!(TX_BYTES, "fortiswitch_port_transmit_bytes_total", "Number of bytes transmitted on the interface");
counter!(TX_UCAST, "fortiswitch_port_transmit_unicast_packets_total", "Number of unicast packets transmitted on the interface");
counter!(TX_BCAST, "fortiswitch_port_transmit_broadcast_packets_total", "Number of broadcast packets transmitted on the interface");
counter!(TX_MCAST, "fortiswitch_port_transmit_multicast_packets_total", "Number of multicast packets transmitted on the interface");
counter!(TX_ERRORS, "fortiswitch_port_transmit_errors_total", "Number of transmission errors detected on the interface");
counter!(TX_DROPS, "fortiswitch_port_transmit_drops_total", "Number of dropped packets detected during transmission on the interface");
counter!(TX_OVERSIZE, "fortiswitch_port_transmit_oversized_packets_total", "Number of oversized packets transmitted on the interface");
counter!(RX_PACKETS, "fortiswitch_port_receive_packets_total", "Number of packets received on the interface");
counter!(RX_BYTES, "fortiswitch_port_receive_bytes_total", "Number of bytes received on the interface");
counter!(RX_UCAST, "fortiswitch_port_receive_unicast_packets_total", "Number of unicast packets received on the interface");
counter!(RX_BCAST, "fortiswitch_port_receive_broadcast_packets_total", "Number of broadcast packets received on the interface");
counter!(RX_MCAST, "fortiswitch_port_receive_multicast_packets_total", "Number of multicast packets received on the interface");
counter!(RX_ERRORS, "fortiswitch_port_receive_errors_total", "Number of reception errors detected on the interface");
counter!(RX_DROPS, "fortiswitch_port_receive_drops_total", "Number of dropped packets detected during reception on the interface");
counter!(RX_OVERSIZE, "fortiswitch_port_receive_oversized_packets_total", "Number of oversized packets received on the interface");

/// Emission order of the per-port counters.
static COUNTERS: &[(&MetricIdentity, fn(&PortCounters) -> f64)] = &[
    (&TX_PACKETS, |c| c.tx_packets),
    (&TX_BYTES, |c| c.tx_bytes),
    (&TX_UCAST, |c| c.tx_ucast),
    (&TX_BCAST, |c| c.tx_bcast),
    (&TX_MCAST, |c| c.tx_mcast),
    (&TX_ERRORS, |c| c.tx_errors),
    (&TX_DROPS, |c| c.tx_drops),
    (&TX_OVERSIZE, |c| c.tx_oversize),
    (&RX_PACKETS, |c| c.rx_packets),
    (&RX_BYTES, |c| c.rx_bytes),
    (&RX_UCAST, |c| c.rx_ucast),
    (&RX_BCAST, |c| c.rx_bcast),
    (&RX_MCAST, |c| c.rx_mcast),
    (&RX_ERRORS, |c| c.rx_errors),
    (&RX_DROPS, |c| c.rx_drops),
    (&RX_OVERSIZE, |c| c.rx_oversize),
];

#[derive(Debug, Deserialize)]
struct Results<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SwitchStatus {
    name: String,
    serial: String,
    fgt_peer_intf_name: String,
    status: String,
    state: String,
    connecting_from: String,
    vdom: String,
    ports: Vec<PortInfo>,
    /// Inline counters, only populated by pre-7.0 firmware.
    port_stats: BTreeMap<String, PortCounters>,
}

impl Keyed for SwitchStatus {
    fn correlation_key(&self) -> &str {
        &self.serial
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.name, self.serial)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PortInfo {
    interface: String,
    status: String,
    duplex: String,
    /// Megabits per second.
    speed: f64,
    vlan: String,
}

/// Counters of one switch as returned by the `port-stats` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SwitchPortCounters {
    serial: String,
    ports: BTreeMap<String, PortCounters>,
}

impl Keyed for SwitchPortCounters {
    fn correlation_key(&self) -> &str {
        &self.serial
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct PortCounters {
    tx_packets: f64,
    tx_bytes: f64,
    tx_errors: f64,
    tx_mcast: f64,
    tx_ucast: f64,
    tx_bcast: f64,
    tx_drops: f64,
    tx_oversize: f64,
    rx_packets: f64,
    rx_bytes: f64,
    rx_errors: f64,
    rx_mcast: f64,
    rx_ucast: f64,
    rx_bcast: f64,
    rx_drops: f64,
    rx_oversize: f64,
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(status_endpoint) = resolve(Capability::SwitchStatus, meta) else {
        return Ok(Vec::new());
    };
    let status: Results<SwitchStatus> =
        fetch::get(fetcher, status_endpoint.path, status_endpoint.query)?;

    let switches = match resolve(Capability::SwitchPortStats, meta) {
        Resolution::Supported(endpoint) => {
            let counters: Results<SwitchPortCounters> =
                fetch::get(fetcher, endpoint.path, endpoint.query)?;
            merge(status.results, counters.results, "port-stats")
                .into_iter()
                .map(|merged| SwitchStatus {
                    port_stats: merged.secondary.ports,
                    ..merged.primary
                })
                .collect()
        }
        Resolution::Unsupported => {
            debug!("port counters served inline with switch status");
            status.results
        }
    };

    let mut out = Emitter::new();
    for switch in &switches {
        emit_switch(&mut out, switch)?;
    }
    Ok(out.finish())
}

fn emit_switch(out: &mut Emitter, sw: &SwitchStatus) -> ProbeResult<()> {
    let state = label_number(AUTHORIZATION_STATE.map(&sw.state));
    out.emit(
        &SWITCH_STATUS,
        SWITCH_CONNECTION.map(&sw.status),
        &[&sw.vdom, &sw.name, &sw.serial, &sw.fgt_peer_intf_name, &sw.connecting_from, &state],
    )?;

    for port in &sw.ports {
        let labels = [
            sw.vdom.as_str(),
            &sw.name,
            &sw.serial,
            &port.interface,
            &port.vlan,
            &port.duplex,
        ];
        out.emit(&PORT_STATUS, LINK_STATUS.map(&port.status), &labels)?;
        out.emit(&PORT_SPEED, port.speed * 1_000_000.0, &labels)?;
        out.emit(&PORT_DUPLEX, DUPLEX.map(&port.duplex), &labels)?;
    }

    for (port, counters) in &sw.port_stats {
        let labels = [sw.vdom.as_str(), &sw.name, &sw.serial, port];
        for (family, value) in COUNTERS {
            out.emit(family, value(counters), &labels)?;
        }
    }
    Ok(())
}
