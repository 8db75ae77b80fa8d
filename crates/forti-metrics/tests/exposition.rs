//! End-to-end: scrape a canned target and render the exposition.

use std::sync::Arc;

use forti_core::TargetMetadata;
use forti_metrics::{render_prometheus, scrape};
use forti_probe::probes::{find, select};
use forti_probe::{Fetcher, StaticFetcher};
use serde_json::json;

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(
        StaticFetcher::new()
            .with(
                "api/v2/monitor/system/sandbox/stats",
                json!({"results": [{
                    "detected": 3, "clean": 120, "risk_low": 1,
                    "risk_med": 0, "risk_high": 2, "submitted": 123
                }]}),
            )
            .with(
                "api/v2/monitor/network/dns/latency",
                json!({"results": [{"service": "dns", "ip": "96.45.45.45", "latency": 12, "last_update": 1718000100}]}),
            ),
    )
}

/// Drop duration lines; their values depend on wall time.
fn stable_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| !l.starts_with("fortigate_exporter_probe_duration_seconds{"))
        .collect()
}

#[tokio::test]
async fn scrape_renders_grouped_exposition() {
    let probes = [
        find("System/SandboxStats").unwrap(),
        find("Network/DNSLatency").unwrap(),
    ];
    let report = scrape(fetcher(), TargetMetadata::new(7, 4), &probes).await;
    let text = render_prometheus(&report.samples().unwrap());

    let expected = "\
# HELP fortigate_sandbox_stats_detected Number of detected files
# TYPE fortigate_sandbox_stats_detected counter
fortigate_sandbox_stats_detected 3
# HELP fortigate_sandbox_stats_clean Number of clean files
# TYPE fortigate_sandbox_stats_clean counter
fortigate_sandbox_stats_clean 120
# HELP fortigate_sandbox_stats_risk_low Number of low risk files detected
# TYPE fortigate_sandbox_stats_risk_low counter
fortigate_sandbox_stats_risk_low 1
# HELP fortigate_sandbox_stats_risk_medium Number of medium risk files detected
# TYPE fortigate_sandbox_stats_risk_medium counter
fortigate_sandbox_stats_risk_medium 0
# HELP fortigate_sandbox_stats_risk_high Number of high risk files detected
# TYPE fortigate_sandbox_stats_risk_high counter
fortigate_sandbox_stats_risk_high 2
# HELP fortigate_sandbox_stats_submitted Number of submitted files
# TYPE fortigate_sandbox_stats_submitted counter
fortigate_sandbox_stats_submitted 123
# HELP fortigate_network_dns_latency Network dns latency
# TYPE fortigate_network_dns_latency gauge
fortigate_network_dns_latency{service=\"dns\",ip=\"96.45.45.45\"} 12
# HELP fortigate_network_dns_latest_update Network dns last update
# TYPE fortigate_network_dns_latest_update gauge
fortigate_network_dns_latest_update{service=\"dns\",ip=\"96.45.45.45\"} 1718000100
# HELP fortigate_exporter_probe_success Whether the probe completed successfully (1) or not (0)
# TYPE fortigate_exporter_probe_success gauge
fortigate_exporter_probe_success{probe=\"System/SandboxStats\"} 1
fortigate_exporter_probe_success{probe=\"Network/DNSLatency\"} 1
# HELP fortigate_exporter_probe_duration_seconds Time spent running the probe, in seconds
# TYPE fortigate_exporter_probe_duration_seconds gauge";

    assert_eq!(stable_lines(&text), expected.lines().collect::<Vec<_>>());
}

#[tokio::test]
async fn full_catalogue_scrape_reports_every_probe() {
    let probes = select(None, &[]).unwrap();
    let report = scrape(fetcher(), TargetMetadata::new(7, 4), &probes).await;
    let text = render_prometheus(&report.samples().unwrap());

    // Only the two canned endpoints succeed.
    assert_eq!(report.probes.len(), probes.len());
    assert_eq!(
        text.matches("fortigate_exporter_probe_success{").count(),
        probes.len()
    );
    assert!(text.contains(r#"fortigate_exporter_probe_success{probe="System/SandboxStats"} 1"#));
    assert!(text.contains(r#"fortigate_exporter_probe_success{probe="Switch/Health"} 0"#));
    // NTP is gated off below 7.4 only; at 7.4 it is attempted and fails here.
    assert!(text.contains(r#"fortigate_exporter_probe_success{probe="System/NTPStatus"} 0"#));
}

#[tokio::test]
async fn repeated_scrapes_render_identically() {
    let probes = select(Some(&["System/SandboxStats".to_string()]), &[]).unwrap();
    let fetcher = fetcher();
    let first = scrape(Arc::clone(&fetcher), TargetMetadata::new(7, 0), &probes).await;
    let second = scrape(fetcher, TargetMetadata::new(7, 0), &probes).await;
    assert_eq!(
        stable_lines(&render_prometheus(&first.samples().unwrap())),
        stable_lines(&render_prometheus(&second.samples().unwrap()))
    );
}
