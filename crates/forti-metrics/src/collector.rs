//! Scrape collector: runs one target's probes on the blocking pool.
//!
//! Probes are independent, so every probe gets its own `spawn_blocking`
//! task. A failed or panicked probe only marks itself unsuccessful.

use std::sync::Arc;
use std::time::{Duration, Instant};

use forti_core::TargetMetadata;
use forti_probe::{Emitter, Fetcher, MetricIdentity, MetricSample, Probe, ProbeOutcome, ProbeResult};
use tracing::{debug, error};

/// Probe name reported when metadata discovery fails.
pub const DISCOVERY_PROBE: &str = "System/Status";

static PROBE_SUCCESS: MetricIdentity = MetricIdentity::gauge(
    "fortigate_exporter_probe_success",
    "Whether the probe completed successfully (1) or not (0)",
    &["probe"],
);
static PROBE_DURATION: MetricIdentity = MetricIdentity::gauge(
    "fortigate_exporter_probe_duration_seconds",
    "Time spent running the probe, in seconds",
    &["probe"],
);

/// Outcome of one probe within a scrape.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub name: &'static str,
    pub outcome: ProbeOutcome,
    pub duration: Duration,
}

/// Outcomes of every probe in a scrape, in the order they were requested.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub probes: Vec<ProbeReport>,
}

impl ScrapeReport {
    pub fn all_ok(&self) -> bool {
        self.probes.iter().all(|p| p.outcome.ok)
    }

    pub fn failed(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.probes.iter().filter(|p| !p.outcome.ok).map(|p| p.name)
    }

    /// Probe samples followed by per-probe success and duration gauges.
    pub fn samples(&self) -> ProbeResult<Vec<MetricSample>> {
        let mut out: Vec<MetricSample> = self
            .probes
            .iter()
            .flat_map(|p| p.outcome.samples.iter().cloned())
            .collect();

        let mut meta = Emitter::new();
        for p in &self.probes {
            meta.emit(&PROBE_SUCCESS, if p.outcome.ok { 1.0 } else { 0.0 }, &[p.name])?;
        }
        for p in &self.probes {
            meta.emit(&PROBE_DURATION, p.duration.as_secs_f64(), &[p.name])?;
        }
        out.extend(meta.finish());
        Ok(out)
    }
}

/// The only samples reported for a target whose firmware could not be
/// discovered.
pub fn discovery_failure() -> ProbeResult<Vec<MetricSample>> {
    Ok(vec![MetricSample::new(&PROBE_SUCCESS, 0.0, &[DISCOVERY_PROBE])?])
}

/// Run `probes` against one target and collect their outcomes.
pub async fn scrape(
    fetcher: Arc<dyn Fetcher>,
    meta: TargetMetadata,
    probes: &[&'static Probe],
) -> ScrapeReport {
    let started = Instant::now();
    let tasks: Vec<_> = probes
        .iter()
        .map(|&probe| {
            let fetcher = Arc::clone(&fetcher);
            let task = tokio::task::spawn_blocking(move || {
                let begun = Instant::now();
                let outcome = probe.invoke(&*fetcher, &meta);
                (outcome, begun.elapsed())
            });
            (probe, task)
        })
        .collect();

    let mut reports = Vec::with_capacity(tasks.len());
    for (probe, task) in tasks {
        let (outcome, duration) = match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(probe = probe.name, error = %e, "probe task did not complete");
                (ProbeOutcome::failed(), Duration::ZERO)
            }
        };
        reports.push(ProbeReport {
            name: probe.name,
            outcome,
            duration,
        });
    }

    let report = ScrapeReport { probes: reports };
    debug!(
        probes = report.probes.len(),
        failed = report.failed().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scrape finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use forti_probe::probes::find;
    use forti_probe::StaticFetcher;
    use serde_json::json;

    static PANICS: Probe = Probe {
        name: "Test/Panics",
        run: |_, _| panic!("probe blew up"),
    };

    fn sandbox_fetcher() -> Arc<dyn Fetcher> {
        Arc::new(StaticFetcher::new().with(
            "api/v2/monitor/system/sandbox/connection",
            json!({"results": [{"status": "reachable", "type": "cloud"}]}),
        ))
    }

    fn probe(name: &str) -> &'static Probe {
        find(name).unwrap()
    }

    #[tokio::test]
    async fn failing_probe_is_isolated() {
        let probes = [probe("System/SandboxConnection"), probe("System/SandboxStats")];
        let report = scrape(sandbox_fetcher(), TargetMetadata::new(7, 4), &probes).await;

        assert_eq!(report.probes.len(), 2);
        assert!(report.probes[0].outcome.ok);
        assert_eq!(report.probes[0].outcome.samples.len(), 1);
        assert!(!report.probes[1].outcome.ok);
        assert!(!report.all_ok());
        assert_eq!(report.failed().collect::<Vec<_>>(), vec!["System/SandboxStats"]);
    }

    #[tokio::test]
    async fn panicking_probe_is_reported_as_failed() {
        let probes = [&PANICS, probe("System/SandboxConnection")];
        let report = scrape(sandbox_fetcher(), TargetMetadata::new(7, 4), &probes).await;

        assert!(!report.probes[0].outcome.ok);
        assert_eq!(report.probes[0].duration, Duration::ZERO);
        assert!(report.probes[1].outcome.ok);
    }

    #[tokio::test]
    async fn samples_end_with_exporter_gauges() {
        let probes = [probe("System/SandboxConnection"), probe("System/SandboxStats")];
        let report = scrape(sandbox_fetcher(), TargetMetadata::new(7, 4), &probes).await;
        let samples = report.samples().unwrap();

        assert_eq!(samples.len(), 1 + 2 + 2);
        assert_eq!(samples[0].name(), "fortigate_sandbox_connection_status");
        assert_eq!(
            samples[1].to_string(),
            r#"fortigate_exporter_probe_success{probe="System/SandboxConnection"} 1"#
        );
        assert_eq!(
            samples[2].to_string(),
            r#"fortigate_exporter_probe_success{probe="System/SandboxStats"} 0"#
        );
        assert!(samples[3..]
            .iter()
            .all(|s| s.name() == "fortigate_exporter_probe_duration_seconds" && s.value() >= 0.0));
    }

    #[tokio::test]
    async fn empty_selection_yields_empty_report() {
        let report = scrape(sandbox_fetcher(), TargetMetadata::new(7, 4), &[]).await;
        assert!(report.all_ok());
        assert!(report.samples().unwrap().is_empty());
    }

    #[test]
    fn discovery_failure_is_a_single_sample() {
        let samples = discovery_failure().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(
            samples[0].to_string(),
            r#"fortigate_exporter_probe_success{probe="System/Status"} 0"#
        );
    }
}
