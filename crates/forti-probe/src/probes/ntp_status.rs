//! NTP peer status per VDOM. Only served by 7.4 and newer.

use forti_core::TargetMetadata;
use serde::Deserialize;
use tracing::warn;

use crate::emit::{label_bool, label_number, Emitter, MetricIdentity, MetricSample};
use crate::error::ProbeResult;
use crate::fetch::{self, Fetcher};
use crate::resolver::{resolve, Capability, Resolution};

const LABELS: &[&str] = &["ip", "server", "reachable", "selected", "version", "vdom"];

static EXPIRES: MetricIdentity =
    MetricIdentity::gauge("fortigate_system_ntp_expires", "NTP expire time, in seconds", LABELS);
static STRATUM: MetricIdentity =
    MetricIdentity::gauge("fortigate_system_ntp_stratum", "NTP stratum value", LABELS);
static REFTIME: MetricIdentity =
    MetricIdentity::counter("fortigate_system_ntp_reftime", "NTP reftime in epoch seconds", LABELS);
static OFFSET: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_ntp_offset",
    "NTP combined offset, in milliseconds",
    LABELS,
);
static DELAY: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_ntp_delay",
    "NTP round trip delay, in milliseconds",
    LABELS,
);
static DISPERSION: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_ntp_dispersion",
    "NTP dispersion to primary clock, in milliseconds",
    LABELS,
);
static DISPERSION_PEER: MetricIdentity = MetricIdentity::gauge(
    "fortigate_system_ntp_dispersion_peer",
    "NTP peer dispersion, in milliseconds",
    LABELS,
);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VdomNtpStatus {
    results: Vec<NtpPeer>,
    vdom: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NtpPeer {
    ip: String,
    server: String,
    reachable: bool,
    selected: bool,
    version: f64,
    expires: f64,
    stratum: f64,
    reftime: f64,
    offset: f64,
    delay: f64,
    dispersion: f64,
    peer_dispersion: f64,
}

pub(super) fn probe(fetcher: &dyn Fetcher, meta: &TargetMetadata) -> ProbeResult<Vec<MetricSample>> {
    let Resolution::Supported(endpoint) = resolve(Capability::NtpStatus, meta) else {
        warn!(version = %meta.version(), "NTP status not available on this firmware");
        return Ok(Vec::new());
    };
    let vdoms: Vec<VdomNtpStatus> = fetch::get(fetcher, endpoint.path, endpoint.query)?;

    let mut out = Emitter::new();
    for vdom in &vdoms {
        for peer in &vdom.results {
            let reachable = label_bool(peer.reachable);
            let selected = label_bool(peer.selected);
            let version = label_number(peer.version);
            let labels = [
                peer.ip.as_str(),
                &peer.server,
                &reachable,
                &selected,
                &version,
                &vdom.vdom,
            ];
            out.emit(&EXPIRES, peer.expires, &labels)?;
            out.emit(&STRATUM, peer.stratum, &labels)?;
            out.emit(&REFTIME, peer.reftime, &labels)?;
            out.emit(&OFFSET, peer.offset, &labels)?;
            out.emit(&DELAY, peer.delay, &labels)?;
            out.emit(&DISPERSION, peer.dispersion, &labels)?;
            out.emit(&DISPERSION_PEER, peer.peer_dispersion, &labels)?;
        }
    }
    Ok(out.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use crate::probes::test_support::lines;
    use serde_json::json;

    const PATH: &str = "api/v2/monitor/system/ntp/status";

    fn body() -> serde_json::Value {
        json!([
            {
                "vdom": "root",
                "results": [
                    {
                        "ip": "192.0.2.10",
                        "server": "ntp1.fortiguard.com",
                        "reachable": true,
                        "selected": false,
                        "version": 4,
                        "expires": 1024,
                        "stratum": 2,
                        "reftime": 1718000000,
                        "offset": 0.25,
                        "delay": 11.5,
                        "dispersion": 1.75,
                        "peer_dispersion": 3
                    }
                ]
            },
            {"vdom": "dmz", "results": []}
        ])
    }

    #[test]
    fn unsupported_before_7_4_is_empty_success() {
        let fetcher = StaticFetcher::new().with(PATH, body());
        let samples = probe(&fetcher, &TargetMetadata::new(7, 2)).unwrap();
        assert!(samples.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn selected_label_reports_selected() {
        let fetcher = StaticFetcher::new().with(PATH, body());
        let samples = probe(&fetcher, &TargetMetadata::new(7, 4)).unwrap();

        assert_eq!(samples.len(), 7);
        assert_eq!(
            lines(&samples, "fortigate_system_ntp_stratum"),
            vec![
                r#"fortigate_system_ntp_stratum{ip="192.0.2.10",server="ntp1.fortiguard.com",reachable="true",selected="false",version="4",vdom="root"} 2"#
            ]
        );
        assert_eq!(
            fetcher.calls(),
            vec![(PATH.to_string(), "vdom=*".to_string())]
        );
    }

    #[test]
    fn null_members_decode_as_empty() {
        let fetcher = StaticFetcher::new().with(
            PATH,
            json!([
                {"vdom": "root", "results": [{"ip": "192.0.2.10", "server": null, "reachable": null, "stratum": 2}]},
                {"vdom": "dmz", "results": null}
            ]),
        );
        let samples = probe(&fetcher, &TargetMetadata::new(7, 4)).unwrap();
        assert_eq!(
            lines(&samples, "fortigate_system_ntp_stratum"),
            vec![
                r#"fortigate_system_ntp_stratum{ip="192.0.2.10",server="",reachable="false",selected="false",version="0",vdom="root"} 2"#
            ]
        );
    }

    #[test]
    fn reftime_is_a_counter() {
        let fetcher = StaticFetcher::new().with(PATH, body());
        let samples = probe(&fetcher, &TargetMetadata::new(8, 0)).unwrap();
        let reftime = samples
            .iter()
            .find(|s| s.name() == "fortigate_system_ntp_reftime")
            .unwrap();
        assert_eq!(reftime.kind(), crate::emit::MetricKind::Counter);
        assert_eq!(reftime.value(), 1718000000.0);
    }
}
